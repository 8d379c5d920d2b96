//! 清理工具：删除所有 `awswaf-` 前缀的索引（不区分状态）。

use reqwest::Method;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::search::{RawResponse, SearchClient, StatusFilter};
use crate::stats::{DeleteOutcome, PruneReport};

impl SearchClient {
    /// `DELETE /<index>`；非 2xx 不算传输失败，交给调用方处理
    pub async fn delete_index(&self, index: &str) -> Result<RawResponse> {
        let path = format!("/{}", index.trim());
        self.send(Method::DELETE, &path, Vec::new(), Vec::new()).await
    }
}

/// 顺序删除，每个索引独立容错：单个失败不影响后续删除。
pub struct IndexPruner<'a> {
    client: &'a SearchClient,
}

impl<'a> IndexPruner<'a> {
    pub fn new(client: &'a SearchClient) -> Self {
        Self { client }
    }

    /// 列表失败直接返回错误；删除结果逐个收集
    pub async fn run(&self) -> Result<PruneReport> {
        let indices = self.client.list_waf_indices(StatusFilter::Any).await?;
        info!("Found {} awswaf indices to delete", indices.len());

        let mut report = PruneReport::default();
        for index in indices {
            report.outcomes.push(self.delete_one(index).await);
        }
        Ok(report)
    }

    async fn delete_one(&self, index: String) -> DeleteOutcome {
        info!("Deleting index: {}", self.client.url(&format!("/{index}")));
        match self.client.delete_index(&index).await {
            Ok(response) if response.is_success() => {
                info!("{}", response.text());
                DeleteOutcome::Deleted { index }
            }
            Ok(response) => {
                let body = response.text();
                warn!("delete {} returned {}: {}", index, response.status, body);
                DeleteOutcome::Rejected {
                    index,
                    status: response.status,
                    body,
                }
            }
            Err(e) => {
                error!("delete {} failed: {}", index, e);
                DeleteOutcome::Failed {
                    index,
                    error: e.to_string(),
                }
            }
        }
    }
}
