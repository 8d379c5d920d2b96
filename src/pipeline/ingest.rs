use std::io::{BufRead, BufReader};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use flate2::read::MultiGzDecoder;
use tracing::{error, info};

use super::record::WafLogRecord;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{BusEvent, EventBus, ObjectRef, S3Notification};
use crate::search::{AclIdSet, BulkBuffer, IndexName, SearchClient};
use crate::stats::IngestReport;
use crate::storage::ObjectStore;

/// 决定目标索引日期的时钟
pub type Clock = fn() -> NaiveDate;

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// 单个日志对象的处理流程：
///
/// START → SCANNED（扫描已知 webaclId）→ STREAMING（解压逐行）→ FLUSH* → DONE，
/// 期间最多一次 NOTIFY。任何错误都中止当前文件，已 flush 的批次不回滚。
pub struct LogIngestPipeline {
    search: SearchClient,
    store: Arc<dyn ObjectStore>,
    bus: Arc<dyn EventBus>,
    rows_per_batch: usize,
    scan_size: usize,
    compress_bulk: bool,
    today: Clock,
}

impl LogIngestPipeline {
    pub fn new(
        config: &Config,
        search: SearchClient,
        store: Arc<dyn ObjectStore>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            search,
            store,
            bus,
            rows_per_batch: config.rows_per_batch.max(1),
            scan_size: config.scan_size,
            compress_bulk: config.compress_bulk,
            today: utc_today,
        }
    }

    pub fn with_clock(mut self, today: Clock) -> Self {
        self.today = today;
        self
    }

    pub fn rows_per_batch(&self) -> usize {
        self.rows_per_batch
    }

    /// 入口：处理通知中的第一个对象
    pub async fn handle(&self, notification: &S3Notification) -> Result<IngestReport> {
        let object = notification.first_object()?;
        self.process_object(&object).await
    }

    pub async fn process_object(&self, object: &ObjectRef) -> Result<IngestReport> {
        let result = self.run(object).await;
        if let Err(e) = &result {
            error!(
                "Exception occurred while processing s3://{}/{}: {}",
                object.bucket, object.key, e
            );
        }
        result
    }

    async fn run(&self, object: &ObjectRef) -> Result<IngestReport> {
        let known = self.search.existing_acl_ids(self.scan_size).await?;
        let index = IndexName::for_date((self.today)());

        let compressed = self.store.get_object(&object.bucket, &object.key).await?;
        info!(
            "Processing s3://{}/{} ({} bytes) into {}",
            object.bucket,
            object.key,
            compressed.len(),
            index
        );

        let mut report = IngestReport {
            bucket: object.bucket.clone(),
            key: object.key.clone(),
            index: index.to_string(),
            known_acl_ids: known.len(),
            ..IngestReport::default()
        };
        let mut buffer = BulkBuffer::new();
        let reader = BufReader::new(MultiGzDecoder::new(&compressed[..]));

        // 按字节切行：解压错误与行内编码错误分开报告
        for (line_no, raw) in reader.split(b'\n').enumerate() {
            let raw = raw.map_err(Error::Decompress)?;
            let line = std::str::from_utf8(&raw).map_err(|source| Error::InvalidEncoding {
                line: line_no + 1,
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            report.lines += 1;

            let record = WafLogRecord::parse(line_no + 1, line)?;
            if !report.notified && is_new_acl(&known, &record) {
                info!("New web acl id detected: {}", record.webacl_id);
                self.bus.publish(&BusEvent::new_web_acl()?).await?;
                report.notified = true;
            }

            buffer.push(line);
            if report.lines % self.rows_per_batch == 0 {
                self.flush(&index, &mut buffer, &mut report).await?;
                info!("Processed {} lines", report.lines);
            }
        }

        if !buffer.is_empty() {
            self.flush(&index, &mut buffer, &mut report).await?;
        }

        info!("All records processed: {}", report.lines);
        Ok(report)
    }

    async fn flush(
        &self,
        index: &IndexName,
        buffer: &mut BulkBuffer,
        report: &mut IngestReport,
    ) -> Result<()> {
        let outcome = self
            .search
            .bulk_write(index, buffer, self.compress_bulk)
            .await?;
        report.flushes += 1;
        if !(200..300).contains(&outcome.status) || outcome.errors {
            report.rejected_flushes += 1;
        }
        buffer.clear();
        Ok(())
    }
}

/// 只和扫描阶段的集合比较；同一文件内新出现的 id 不互相比较
fn is_new_acl(known: &AclIdSet, record: &WafLogRecord) -> bool {
    !known.contains(&record.webacl_id)
}
