use async_trait::async_trait;
use aws_sdk_eventbridge::error::DisplayErrorContext;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{Error, Result};

pub const EVENT_SOURCE: &str = "sink.s3";
pub const EVENT_DETAIL_TYPE: &str = "S3 Sink";
pub const EVENT_BUS_NAME: &str = "default";

/// 下游规则匹配的 detail 结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAclDetail {
    #[serde(rename = "eventSource")]
    pub event_source: Vec<String>,
    #[serde(rename = "eventName")]
    pub event_name: Vec<String>,
}

impl Default for NewAclDetail {
    fn default() -> Self {
        Self {
            event_source: vec!["sink.lambda".to_string()],
            event_name: vec!["CreateWebACL".to_string()],
        }
    }
}

/// 一条待投递的总线事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    pub source: String,
    pub detail_type: String,
    pub detail: String,
    pub bus_name: String,
}

impl BusEvent {
    /// “发现新的 web ACL” 事件
    pub fn new_web_acl() -> Result<Self> {
        let detail = serde_json::to_string(&NewAclDetail::default())
            .map_err(|e| Error::decode("event detail", e))?;
        Ok(Self {
            source: EVENT_SOURCE.to_string(),
            detail_type: EVENT_DETAIL_TYPE.to_string(),
            detail,
            bus_name: EVENT_BUS_NAME.to_string(),
        })
    }
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: &BusEvent) -> Result<()>;
}

pub struct EventBridgeBus {
    client: aws_sdk_eventbridge::Client,
}

impl EventBridgeBus {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_eventbridge::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl EventBus for EventBridgeBus {
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        let entry = PutEventsRequestEntry::builder()
            .source(&event.source)
            .detail_type(&event.detail_type)
            .detail(&event.detail)
            .event_bus_name(&event.bus_name)
            .build();

        let output = self
            .client
            .put_events()
            .entries(entry)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!("PutEvents failed: {}", message);
                Error::EventBus(message)
            })?;

        if output.failed_entry_count() > 0 {
            let reason = output
                .entries()
                .iter()
                .filter_map(|e| e.error_message())
                .collect::<Vec<_>>()
                .join("; ");
            error!("PutEvents rejected entry: {}", reason);
            return Err(Error::EventBus(format!("entry rejected: {reason}")));
        }

        info!("Event sent to event bus successfully");
        Ok(())
    }
}
