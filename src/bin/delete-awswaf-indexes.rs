use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use waf_sink::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use waf_sink::prune::IndexPruner;
use waf_sink::search::{SearchClient, SigV4Signer};

/// 删除 OpenSearch 中所有 awswaf- 索引
#[derive(Parser)]
#[command(name = "delete-awswaf-indexes", about = "Delete AWS WAF Indexes")]
struct Args {
    /// Open Search Endpoint
    #[arg(long = "os_endpoint")]
    os_endpoint: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    waf_sink::init_tracing();
    let args = Args::parse();

    match run(&args.os_endpoint).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// 返回是否所有删除都没有传输层失败
async fn run(os_endpoint: &str) -> anyhow::Result<bool> {
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let signer = SigV4Signer::from_sdk_config(&sdk_config)?;
    let client = SearchClient::new(
        os_endpoint,
        Arc::new(signer),
        std::time::Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
    )?;

    let report = IndexPruner::new(&client)
        .run()
        .await
        .context("Failed to list indices")?;
    info!("\n{}", report);
    Ok(report.is_success())
}
