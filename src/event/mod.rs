pub mod bus;
pub mod notification;

#[cfg(test)]
pub(crate) mod recording;

pub use bus::{BusEvent, EventBridgeBus, EventBus, NewAclDetail};
pub use notification::{decode_object_key, ObjectRef, S3Notification};
