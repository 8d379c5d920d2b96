use std::time::SystemTime;

use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    sign as sigv4_sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;

use crate::error::{Error, Result};

/// OpenSearch Service 的 SigV4 服务名
pub const SIGNING_SERVICE: &str = "es";

/// 请求签名抽象：输入待发送请求，返回需要追加的头部。
///
/// 生产环境用 [`SigV4Signer`]；测试（wiremock）用 [`Unsigned`]。
#[async_trait]
pub trait RequestSigner: Send + Sync {
    async fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>>;
}

/// 不签名，直接放行。
pub struct Unsigned;

#[async_trait]
impl RequestSigner for Unsigned {
    async fn sign(
        &self,
        _method: &str,
        _url: &str,
        _headers: &[(String, String)],
        _body: &[u8],
    ) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}

/// 区域 + 服务范围的 SigV4 签名器，凭证每次请求从凭证链解析（支持自动刷新）。
pub struct SigV4Signer {
    credentials: SharedCredentialsProvider,
    region: String,
}

impl SigV4Signer {
    pub fn new(credentials: SharedCredentialsProvider, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
        }
    }

    /// 从 SdkConfig 构建：需要凭证提供者与区域都已解析。
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Result<Self> {
        let credentials = sdk_config
            .credentials_provider()
            .ok_or_else(|| Error::Config("no AWS credentials provider available".into()))?;
        let region = sdk_config
            .region()
            .ok_or_else(|| Error::Config("AWS region is not configured".into()))?;
        Ok(Self::new(credentials, region.as_ref()))
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl RequestSigner for SigV4Signer {
    async fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| Error::Signing(format!("resolve credentials: {e}")))?;
        let identity = Identity::from(credentials);

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SIGNING_SERVICE)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| Error::Signing(e.to_string()))?
            .into();

        let signable = SignableRequest::new(
            method,
            url,
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            SignableBody::Bytes(body),
        )
        .map_err(|e| Error::Signing(e.to_string()))?;

        let (instructions, _signature) = sigv4_sign(signable, &params)
            .map_err(|e| Error::Signing(e.to_string()))?
            .into_parts();
        let (signed_headers, _query) = instructions.into_parts();

        Ok(signed_headers
            .into_iter()
            .map(|h| (h.name().to_string(), h.value().to_string()))
            .collect())
    }
}
