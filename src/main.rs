use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use waf_sink::event::{EventBridgeBus, S3Notification};
use waf_sink::pipeline::LogIngestPipeline;
use waf_sink::search::{SearchClient, SigV4Signer};
use waf_sink::server::IngestServer;
use waf_sink::storage::S3ObjectStore;
use waf_sink::Config;

#[derive(Parser)]
#[command(name = "waf-sink", version, about = "Ship gzipped AWS WAF logs from S3 into OpenSearch")]
struct Cli {
    /// TOML 配置文件；缺省时读取 OS_ENDPOINT / REGION / NUMBER_ROWS_IN_BATCH
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 处理一条 S3 事件通知（文件或 stdin）
    Ingest {
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// 以 HTTP 服务方式接收通知
    Serve {
        #[arg(long, default_value_t = 6060)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    waf_sink::init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path),
        None => Config::from_env(),
    }
    .context("Failed to load configuration")?;

    let pipeline = Arc::new(build_pipeline(&config).await?);

    match cli.command {
        Command::Ingest { event } => {
            let raw = read_event(event.as_ref())?;
            let notification = S3Notification::from_json(&raw)?;
            let report = pipeline
                .handle(&notification)
                .await
                .context("Failed to process the log file")?;
            info!("\n{}", report);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve { port } => {
            let server = IngestServer::new(pipeline);
            tokio::select! {
                res = server.run(port) => res?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down..."),
            }
        }
    }

    Ok(())
}

async fn build_pipeline(config: &Config) -> anyhow::Result<LogIngestPipeline> {
    let sdk_config = config.load_sdk_config().await;
    let signer = SigV4Signer::from_sdk_config(&sdk_config)?;
    info!(
        "waf-sink: endpoint={} region={} rows_per_batch={}",
        config.os_endpoint,
        signer.region(),
        config.rows_per_batch
    );

    let search = SearchClient::new(&config.os_endpoint, Arc::new(signer), config.request_timeout())?;
    Ok(LogIngestPipeline::new(
        config,
        search,
        Arc::new(S3ObjectStore::new(&sdk_config)),
        Arc::new(EventBridgeBus::new(&sdk_config)),
    ))
}

fn read_event(path: Option<&PathBuf>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(p) => std::fs::read(p).with_context(|| format!("Failed to read {}", p.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read notification from stdin")?;
            Ok(buf)
        }
    }
}
