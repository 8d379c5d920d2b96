use std::collections::{BTreeSet, HashMap};

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::catalog::StatusFilter;
use super::{json_headers, SearchClient};
use crate::error::{Error, Result};

/// 分组键：webaclId 的 keyword 子字段
pub const ACL_ID_FIELD: &str = "webaclId.keyword";

/// 已入库的 webaclId 集合（每次调用重新扫描，不落盘）
pub type AclIdSet = BTreeSet<String>;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// `_source: false` 时只剩 collapse 字段
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub fields: HashMap<String, Vec<String>>,
}

/// match_all + collapse(webaclId.keyword)，不取 _source
pub fn collapse_query(size: usize) -> serde_json::Value {
    json!({
        "size": size,
        "query": { "match_all": {} },
        "collapse": { "field": ACL_ID_FIELD },
        "_source": false
    })
}

impl SearchClient {
    /// 单个索引中出现过的 webaclId（已去重）
    pub async fn acl_ids_in(&self, index: &str, size: usize) -> Result<Vec<String>> {
        let path = format!("/{}/_search", index.trim());
        let body = serde_json::to_vec(&collapse_query(size))
            .map_err(|e| Error::decode("collapse query", e))?;
        let response = self
            .send_expecting_success(Method::POST, &path, json_headers(), body)
            .await?;
        let parsed: SearchResponse = serde_json::from_slice(&response.body)
            .map_err(|e| Error::decode(format!("search response of {index}"), e))?;

        Ok(parsed
            .hits
            .hits
            .into_iter()
            .flat_map(|mut hit| hit.fields.remove(ACL_ID_FIELD).unwrap_or_default())
            .collect())
    }

    /// 扫描所有 open 的 `awswaf-` 索引，合并 webaclId
    pub async fn existing_acl_ids(&self, size: usize) -> Result<AclIdSet> {
        let indices = self.list_waf_indices(StatusFilter::Open).await?;
        let mut ids = AclIdSet::new();
        for index in &indices {
            let found = self.acl_ids_in(index, size).await?;
            debug!("{}: {} acl ids", index, found.len());
            ids.extend(found);
        }
        info!(
            "Scanned {} open indices, {} distinct web acl ids",
            indices.len(),
            ids.len()
        );
        Ok(ids)
    }
}
