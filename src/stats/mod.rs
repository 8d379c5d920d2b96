use std::fmt;

use serde::Serialize;

/// 单个日志对象的处理汇总
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub bucket: String,
    pub key: String,
    /// 目标索引 `awswaf-<date>`
    pub index: String,
    /// 扫描阶段得到的已知 webaclId 数
    pub known_acl_ids: usize,
    /// 处理的记录行数
    pub lines: usize,
    /// bulk 请求次数
    pub flushes: usize,
    /// 非 2xx 或 `errors: true` 的 bulk 次数（只统计，不算失败）
    pub rejected_flushes: usize,
    /// 是否发出过“新 ACL”事件
    pub notified: bool,
}

/// 单个索引的删除结果
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted { index: String },
    /// 服务端返回非 2xx（例如 404）
    Rejected { index: String, status: u16, body: String },
    /// 传输层失败
    Failed { index: String, error: String },
}

impl DeleteOutcome {
    pub fn index(&self) -> &str {
        match self {
            DeleteOutcome::Deleted { index }
            | DeleteOutcome::Rejected { index, .. }
            | DeleteOutcome::Failed { index, .. } => index,
        }
    }
}

/// 清理汇总：逐个索引的结果
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub outcomes: Vec<DeleteOutcome>,
}

impl PruneReport {
    pub fn deleted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DeleteOutcome::Deleted { .. }))
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DeleteOutcome::Rejected { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DeleteOutcome::Failed { .. }))
            .count()
    }

    /// 没有任何传输层失败
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           waf-sink Ingest Report                 ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║ object: s3://{}/{}", self.bucket, self.key)?;
        writeln!(f, "║ index:  {}", self.index)?;
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(
            f,
            "║   known acls:   {:>10}                       ║",
            self.known_acl_ids
        )?;
        writeln!(
            f,
            "║   lines:        {:>10}                       ║",
            self.lines
        )?;
        writeln!(
            f,
            "║   flushes:      {:>10}                       ║",
            self.flushes
        )?;
        writeln!(
            f,
            "║   rejected:     {:>10}                       ║",
            self.rejected_flushes
        )?;
        writeln!(
            f,
            "║   new acl:      {:>10}                       ║",
            if self.notified { "yes" } else { "no" }
        )?;
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           waf-sink Prune Report                  ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        for outcome in &self.outcomes {
            match outcome {
                DeleteOutcome::Deleted { index } => writeln!(f, "║ deleted   {index}")?,
                DeleteOutcome::Rejected { index, status, .. } => {
                    writeln!(f, "║ rejected  {index} ({status})")?
                }
                DeleteOutcome::Failed { index, error } => {
                    writeln!(f, "║ failed    {index}: {error}")?
                }
            }
        }
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(
            f,
            "║   deleted: {:>4}   rejected: {:>4}   failed: {:>4}   ║",
            self.deleted(),
            self.rejected(),
            self.failed()
        )?;
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}
