use thiserror::Error;

/// 处理单个日志对象时可能出现的所有错误。
///
/// 任何一个错误都会中止当前文件的处理；没有重试，也没有断点续传。
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}: {body}")]
    Response {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("failed to fetch s3://{bucket}/{key}: {message}")]
    ObjectStore {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to decompress log object: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("failed to compress bulk payload: {0}")]
    Compress(#[source] std::io::Error),

    #[error("invalid log record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("log record on line {line} is not valid UTF-8: {source}")]
    InvalidEncoding {
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("event bus publish failed: {0}")]
    EventBus(String),

    #[error("invalid trigger notification: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            context: context.into(),
            source,
        }
    }
}
