//! 日志对象的只读来源。

pub mod s3;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use s3::S3ObjectStore;

/// 对象存储抽象：按 bucket + key 取回完整（压缩的）内容。
///
/// 生产环境为 aws-sdk-s3；测试用内存实现。
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes>;
}
