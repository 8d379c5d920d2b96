use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::Method;
use serde::Deserialize;
use tracing::{info, warn};

use super::catalog::IndexName;
use super::SearchClient;
use crate::error::{Error, Result};

/// 每条文档前的 bulk 动作行（索引由 URL 指定）
pub const INDEX_ACTION: &str = r#"{"index": {}}"#;

/// NDJSON bulk 缓冲：一行动作 + 一行文档。
#[derive(Debug, Default)]
pub struct BulkBuffer {
    body: String,
    rows: usize,
}

impl BulkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条原始记录（去掉首尾空白，不重新序列化）
    pub fn push(&mut self, record_line: &str) {
        self.body.push_str(INDEX_ACTION);
        self.body.push('\n');
        self.body.push_str(record_line.trim());
        self.body.push('\n');
        self.rows += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// 当前缓冲中的文档数
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn clear(&mut self) {
        self.body.clear();
        self.rows = 0;
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// 一次 bulk 写入的结果。状态码只记录，不作为失败依据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub status: u16,
    /// 响应体里的 `errors` 标记（部分文档被拒）
    pub errors: bool,
    pub items: usize,
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(Error::Compress)?;
    encoder.finish().map_err(Error::Compress)
}

impl SearchClient {
    /// 一次调用恰好一次网络写入；目标索引不存在时由服务端隐式创建。
    pub async fn bulk_write(
        &self,
        index: &IndexName,
        buffer: &BulkBuffer,
        compress: bool,
    ) -> Result<BulkOutcome> {
        let path = format!("/{}/_bulk", index.as_str());
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        let body = if compress {
            headers.push(("content-encoding".to_string(), "gzip".to_string()));
            gzip(buffer.as_str().as_bytes())?
        } else {
            buffer.as_str().as_bytes().to_vec()
        };

        let response = self.send(Method::POST, &path, headers, body).await?;
        info!("Response status code: {}", response.status);

        let parsed = serde_json::from_slice::<BulkResponse>(&response.body).ok();
        let outcome = BulkOutcome {
            status: response.status,
            errors: parsed.as_ref().map(|r| r.errors).unwrap_or(false),
            items: parsed.as_ref().map(|r| r.items.len()).unwrap_or(0),
        };
        if !response.is_success() {
            warn!(
                "bulk write to {} returned {}: {}",
                index,
                response.status,
                response.text()
            );
        } else if outcome.errors {
            warn!("bulk write to {} reported item errors", index);
        }
        Ok(outcome)
    }
}
