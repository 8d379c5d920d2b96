//! OpenSearch 访问层：索引目录、webaclId 扫描、bulk 写入、删除。
//!
//! 所有请求都经过 [`RequestSigner`]；没有重试，错误直接向上返回。

pub mod bulk;
pub mod catalog;
pub mod scanner;
pub mod signer;

#[cfg(test)]
pub(crate) mod mock_cluster;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::error::{Error, Result};

pub use bulk::{BulkBuffer, BulkOutcome};
pub use catalog::{IndexDescriptor, IndexName, StatusFilter, INDEX_PREFIX};
pub use scanner::{AclIdSet, ACL_ID_FIELD};
pub use signer::{RequestSigner, SigV4Signer, Unsigned};

/// 已签名的 OpenSearch HTTP 客户端。
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    signer: Arc<dyn RequestSigner>,
}

/// 一次请求的原始响应（状态码 + 响应体）
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl SearchClient {
    /// `endpoint` 可以是裸域名（补 `https://`），也可以是带 scheme 的完整 URL。
    pub fn new(endpoint: &str, signer: Arc<dyn RequestSigner>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(Error::Config("search endpoint must not be empty".into()));
        }
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            signer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim())
    }

    /// 签名并发送；只有传输层失败才返回 Err，状态码交给调用方判断。
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Result<RawResponse> {
        let url = self.url(path);
        let signed = self
            .signer
            .sign(method.as_str(), &url, &headers, &body)
            .await?;

        let mut request = self.http.request(method, &url);
        for (name, value) in headers.iter().chain(signed.iter()) {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(body).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }

    /// 读取类请求（目录/查询）：非 2xx 视为错误，避免把错误体当成数据解码。
    pub(crate) async fn send_expecting_success(
        &self,
        method: Method,
        path: &str,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Result<RawResponse> {
        let method_name = method.to_string();
        let response = self.send(method, path, headers, body).await?;
        if !response.is_success() {
            return Err(Error::Response {
                method: method_name,
                url: self.url(path),
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }
}

pub(crate) fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}
