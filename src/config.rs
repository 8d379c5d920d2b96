use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_OS_ENDPOINT: &str = "OS_ENDPOINT";
pub const ENV_REGION: &str = "REGION";
pub const ENV_ROWS_PER_BATCH: &str = "NUMBER_ROWS_IN_BATCH";
pub const ENV_SCAN_SIZE: &str = "WAF_SINK_SCAN_SIZE";

/// collapse 查询默认返回条数（OpenSearch 默认 max_result_window）
pub const DEFAULT_SCAN_SIZE: usize = 10_000;
pub const DEFAULT_ROWS_PER_BATCH: usize = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 运行配置：进程启动时加载一次，显式注入各组件（无全局状态）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OpenSearch 域名（不带 scheme 时默认 https://）
    pub os_endpoint: String,
    /// SigV4 签名区域；为空时回退到 AWS SDK 解析出的区域
    #[serde(default)]
    pub region: Option<String>,
    /// 每个 bulk 请求的行数
    #[serde(default = "default_rows_per_batch")]
    pub rows_per_batch: usize,
    #[serde(default = "default_scan_size")]
    pub scan_size: usize,
    /// bulk 请求体是否 gzip（Content-Encoding 与实际请求体保持一致）
    #[serde(default = "default_compress_bulk")]
    pub compress_bulk: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_rows_per_batch() -> usize {
    DEFAULT_ROWS_PER_BATCH
}

fn default_scan_size() -> usize {
    DEFAULT_SCAN_SIZE
}

fn default_compress_bulk() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    pub fn new(os_endpoint: impl Into<String>) -> Self {
        Self {
            os_endpoint: os_endpoint.into(),
            region: None,
            rows_per_batch: DEFAULT_ROWS_PER_BATCH,
            scan_size: DEFAULT_SCAN_SIZE,
            compress_bulk: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_rows_per_batch(mut self, rows: usize) -> Self {
        self.rows_per_batch = rows;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_compress_bulk(mut self, compress: bool) -> Self {
        self.compress_bulk = compress;
        self
    }

    /// Lambda 风格：`OS_ENDPOINT` / `REGION` / `NUMBER_ROWS_IN_BATCH`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let os_endpoint = lookup(ENV_OS_ENDPOINT)
            .ok_or_else(|| Error::Config(format!("{ENV_OS_ENDPOINT} is not set")))?;
        let rows_raw = lookup(ENV_ROWS_PER_BATCH)
            .ok_or_else(|| Error::Config(format!("{ENV_ROWS_PER_BATCH} is not set")))?;
        let rows_per_batch = parse_usize(ENV_ROWS_PER_BATCH, &rows_raw)?;

        let mut config = Self::new(os_endpoint).with_rows_per_batch(rows_per_batch);
        config.region = lookup(ENV_REGION).filter(|r| !r.trim().is_empty());
        if let Some(raw) = lookup(ENV_SCAN_SIZE) {
            config.scan_size = parse_usize(ENV_SCAN_SIZE, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(raw).map_err(|e| Error::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.os_endpoint.trim().is_empty() {
            return Err(Error::Config("os_endpoint must not be empty".into()));
        }
        if self.rows_per_batch == 0 {
            return Err(Error::Config("rows_per_batch must be greater than 0".into()));
        }
        if self.scan_size == 0 {
            return Err(Error::Config("scan_size must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 加载 AWS 共享配置（凭证链 + 区域）；显式配置的 region 优先。
    pub async fn load_sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        loader.load().await
    }
}

fn parse_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| Error::Config(format!("{name}={raw:?} is not a valid number: {e}")))
}
