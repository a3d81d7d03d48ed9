//! In-process transport that records every publish.

use super::Transport;
use crate::{DynSecError, Result};
use bytes::Bytes;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A message captured by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Bytes,
}

impl PublishedMessage {
    /// Parse the payload as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Transport with no network behind it.
///
/// Starts connected. Tests feed responses straight into the engine's
/// demultiplexer and inspect what was published here.
#[derive(Debug)]
pub struct MemoryTransport {
    connected: AtomicBool,
    fail_publishes: AtomicBool,
    published: Mutex<Vec<PublishedMessage>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            fail_publishes: AtomicBool::new(false),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        let transport = Self::new();
        transport.set_connected(false);
        transport
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make subsequent publishes fail with a transport error.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().expect("published lock poisoned").clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().expect("published lock poisoned").len()
    }

    /// The single command inside the most recent request envelope.
    pub fn last_command(&self) -> Option<Value> {
        let published = self.published.lock().expect("published lock poisoned");
        let message = published.last()?;
        let mut envelope = message.json().ok()?;
        envelope
            .get_mut("commands")
            .and_then(Value::as_array_mut)
            .and_then(|commands| commands.pop())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        if !self.is_connected() {
            return Err(DynSecError::NotConnected);
        }
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(DynSecError::Transport {
                message: "publish rejected".to_string(),
            });
        }
        self.published
            .lock()
            .expect("published lock poisoned")
            .push(PublishedMessage {
                topic: topic.to_string(),
                payload,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_publishes() {
        let transport = MemoryTransport::new();
        transport
            .publish("a/b", Bytes::from_static(br#"{"commands":[{"command":"x"}]}"#))
            .await
            .unwrap();

        assert_eq!(transport.publish_count(), 1);
        assert_eq!(transport.published()[0].topic, "a/b");
        assert_eq!(
            transport.last_command(),
            Some(serde_json::json!({"command": "x"}))
        );
    }

    #[tokio::test]
    async fn test_publish_while_disconnected_fails() {
        let transport = MemoryTransport::disconnected();
        let result = transport.publish("a/b", Bytes::new()).await;

        assert!(matches!(result, Err(DynSecError::NotConnected)));
        assert_eq!(transport.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_forced_publish_failure() {
        let transport = MemoryTransport::new();
        transport.fail_publishes(true);
        let result = transport.publish("a/b", Bytes::new()).await;

        assert!(matches!(result, Err(DynSecError::Transport { .. })));
    }
}
