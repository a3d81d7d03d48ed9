//! Publish/subscribe transport boundary.
//!
//! The engine only needs two capabilities from a session: "am I connected"
//! and "publish these bytes on a topic". Inbound traffic and connection state
//! changes flow the other way as [`TransportEvent`]s.
//!
//! - [`MqttTransport`]: a broker session built on `rumqttc`
//! - [`MemoryTransport`]: an in-process recorder for tests and embedding

pub mod memory;
pub mod mqtt;

pub use memory::{MemoryTransport, PublishedMessage};
pub use mqtt::MqttTransport;

use crate::Result;
use bytes::Bytes;

/// Outbound half of a publish/subscribe session.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Whether a live session currently exists.
    fn is_connected(&self) -> bool;

    /// Publish a payload. Only valid while connected.
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()>;
}

/// Inbound notifications from a transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A message arrived on a subscribed topic.
    Message { topic: String, payload: Bytes },
    /// The session was (re)established and subscriptions are in place.
    Connected,
    /// The session dropped.
    ConnectionLost { reason: String },
}
