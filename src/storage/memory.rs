//! 内存对象存储，仅用于测试。

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::ObjectStore;
use crate::error::{Error, Result};

#[derive(Default)]
pub(crate) struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
    gets: AtomicUsize,
}

impl MemoryObjectStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_object(self, bucket: &str, key: &str, data: impl Into<Bytes>) -> Self {
        self.objects
            .write()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.into());
        self
    }

    pub(crate) fn get_count(&self) -> usize {
        self.gets.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.objects
            .read()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Error::ObjectStore {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "NoSuchKey".into(),
            })
    }
}

/// 把若干行压成一个 .log.gz 对象（每行以换行结尾）
pub(crate) fn gzip_lines(lines: &[&str]) -> Bytes {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for line in lines {
        encoder.write_all(line.as_bytes()).unwrap();
        encoder.write_all(b"\n").unwrap();
    }
    Bytes::from(encoder.finish().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_object_is_store_error() {
        let store = MemoryObjectStore::new();
        let err = store.get_object("bucket", "nope.log.gz").await.unwrap_err();
        assert!(matches!(err, Error::ObjectStore { .. }));
        assert!(err.to_string().contains("s3://bucket/nope.log.gz"));
    }

    #[tokio::test]
    async fn stored_object_round_trips() {
        let store = MemoryObjectStore::new().with_object("b", "k", gzip_lines(&["{}"]));
        let data = store.get_object("b", "k").await.unwrap();
        assert_eq!(&data[..2], &[0x1f, 0x8b]);
        assert_eq!(store.get_count(), 1);
    }
}
