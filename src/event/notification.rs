use serde::Deserialize;

use crate::error::{Error, Result};

/// S3 事件通知（只解析用到的字段）
#[derive(Debug, Clone, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL 编码的 key（空格编码为 `+`）
    pub key: String,
}

/// 解码后的对象定位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl S3Notification {
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(|e| Error::decode("S3 notification", e))
    }

    /// 只处理第一条记录
    pub fn first_object(&self) -> Result<ObjectRef> {
        let record = self
            .records
            .first()
            .ok_or_else(|| Error::Notification("notification has no Records".into()))?;
        Ok(ObjectRef {
            bucket: record.s3.bucket.name.clone(),
            key: decode_object_key(&record.s3.object.key)?,
        })
    }
}

/// 等价于 unquote_plus：先把 `+` 还原为空格，再做百分号解码
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| Error::Notification(format!("object key {raw:?} is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "Records": [
        {
          "eventVersion": "2.1",
          "eventSource": "aws:s3",
          "eventName": "ObjectCreated:Put",
          "s3": {
            "bucket": { "name": "aws-waf-logs-sink", "arn": "arn:aws:s3:::aws-waf-logs-sink" },
            "object": {
              "key": "AWSLogs/123456789012/WAFLogs/eu-west-1/my+acl/2024/01/01/00/05/waf%3Dlog.log.gz",
              "size": 1024
            }
          }
        }
      ]
    }"#;

    #[test]
    fn first_object_decodes_key() {
        let n = S3Notification::from_json(SAMPLE.as_bytes()).unwrap();
        let obj = n.first_object().unwrap();
        assert_eq!(obj.bucket, "aws-waf-logs-sink");
        assert_eq!(
            obj.key,
            "AWSLogs/123456789012/WAFLogs/eu-west-1/my acl/2024/01/01/00/05/waf=log.log.gz"
        );
    }

    #[test]
    fn encoded_plus_stays_plus() {
        assert_eq!(decode_object_key("a%2Bb+c").unwrap(), "a+b c");
    }

    #[test]
    fn empty_records_rejected() {
        let n = S3Notification::from_json(br#"{"Records": []}"#).unwrap();
        assert!(matches!(n.first_object(), Err(Error::Notification(_))));
    }

    #[test]
    fn invalid_utf8_key_rejected() {
        assert!(decode_object_key("%FF%FE").is_err());
    }

    #[test]
    fn malformed_notification_is_decode_error() {
        let err = S3Notification::from_json(br#"{"Records": [{"s3": {}}]}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
