pub mod ingest;
pub mod record;

pub use ingest::{Clock, LogIngestPipeline};
pub use record::WafLogRecord;
