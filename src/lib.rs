#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod config;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod prune;
pub mod search;
pub mod server;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};

/// 两个二进制共用的日志初始化：默认 info，可用 RUST_LOG 覆盖
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
