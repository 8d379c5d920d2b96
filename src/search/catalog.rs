use std::fmt;

use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use super::SearchClient;
use crate::error::{Error, Result};

/// WAF 日志索引的保留前缀：`awswaf-<YYYY-MM-DD>`
pub const INDEX_PREFIX: &str = "awswaf-";

const CAT_INDICES_PATH: &str = "/_cat/indices?format=json";

/// `_cat/indices?format=json` 的单条记录（只取用到的字段）
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescriptor {
    pub index: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl IndexDescriptor {
    pub fn name(&self) -> &str {
        self.index.trim()
    }

    pub fn is_open(&self) -> bool {
        self.status.as_deref() == Some("open")
    }

    pub fn is_waf_index(&self) -> bool {
        self.name().starts_with(INDEX_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// 只要 open 状态（扫描用）
    Open,
    /// 不看状态（清理用）
    Any,
}

/// 按前缀与状态过滤，保持目录返回的顺序。
pub fn select_indices(descriptors: &[IndexDescriptor], filter: StatusFilter) -> Vec<String> {
    descriptors
        .iter()
        .filter(|d| d.is_waf_index())
        .filter(|d| filter == StatusFilter::Any || d.is_open())
        .map(|d| d.name().to_string())
        .collect()
}

/// 按天划分的目标索引名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexName(String);

impl IndexName {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(format!("{}{}", INDEX_PREFIX, date.format("%Y-%m-%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SearchClient {
    pub async fn cat_indices(&self) -> Result<Vec<IndexDescriptor>> {
        let response = self
            .send_expecting_success(Method::GET, CAT_INDICES_PATH, Vec::new(), Vec::new())
            .await?;
        serde_json::from_slice(&response.body).map_err(|e| Error::decode("index catalog", e))
    }

    /// 列出 `awswaf-` 前缀的索引名
    pub async fn list_waf_indices(&self, filter: StatusFilter) -> Result<Vec<String>> {
        let descriptors = self.cat_indices().await?;
        let selected = select_indices(&descriptors, filter);
        debug!(
            "index catalog: {} total, {} selected ({:?})",
            descriptors.len(),
            selected.len(),
            filter
        );
        Ok(selected)
    }
}
