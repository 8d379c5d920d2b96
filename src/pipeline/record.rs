use serde::Deserialize;

use crate::error::{Error, Result};

/// 一行 WAF 日志。只读取 `webaclId`，其余字段不做类型检查，按原样写入索引。
#[derive(Debug, Clone, Deserialize)]
pub struct WafLogRecord {
    #[serde(rename = "webaclId")]
    pub webacl_id: String,
}

impl WafLogRecord {
    /// `line_no` 从 1 开始，只用于报错定位
    pub fn parse(line_no: usize, line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|source| Error::InvalidRecord {
            line: line_no,
            source,
        })
    }
}
