use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use tracing::debug;

use super::ObjectStore;
use crate::error::{Error, Result};

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let fail = |message: String| Error::ObjectStore {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| fail(DisplayErrorContext(&e).to_string()))?;
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| fail(format!("read body: {e}")))?
            .into_bytes();

        debug!("fetched s3://{}/{} ({} bytes)", bucket, key, data.len());
        Ok(data)
    }
}
