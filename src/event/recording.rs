//! 记录型事件总线，仅用于测试。

use std::sync::Mutex;

use async_trait::async_trait;

use super::bus::{BusEvent, EventBus};
use crate::error::{Error, Result};

#[derive(Default)]
pub(crate) struct RecordingBus {
    published: Mutex<Vec<BusEvent>>,
    fail: bool,
}

impl RecordingBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 每次 publish 都失败
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn published(&self) -> Vec<BusEvent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        if self.fail {
            return Err(Error::EventBus("AccessDeniedException".into()));
        }
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }
}
