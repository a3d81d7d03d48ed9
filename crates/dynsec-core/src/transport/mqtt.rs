//! MQTT broker session built on `rumqttc`.
//!
//! The session subscribes to the Dynamic Security response topic on every
//! (re)connection and forwards inbound publishes as [`TransportEvent`]s.
//! Connection loss is reported once per outage; the event loop keeps polling
//! after [`ProtocolConfig::RECONNECT_DELAY`], which makes `rumqttc` reconnect.
//!
//! # Thread Safety
//!
//! `AsyncClient` is a cheap handle onto the event loop's request channel and
//! can be used from any task. Connection state is a shared atomic flag.

use super::{Transport, TransportEvent};
use crate::config::{ConnectOptions, ProtocolConfig};
use crate::{DynSecError, Result};
use bytes::Bytes;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A connected MQTT session.
pub struct MqttTransport {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    stopping: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
    broker: String,
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("broker", &self.broker)
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .finish()
    }
}

impl MqttTransport {
    /// Connect to the broker and subscribe to the response topic.
    ///
    /// Returns once CONNACK has been received, or fails after
    /// [`ProtocolConfig::CONNECT_TIMEOUT`].
    pub async fn connect(options: &ConnectOptions) -> Result<(Arc<Self>, mpsc::Receiver<TransportEvent>)> {
        if options.host.trim().is_empty() {
            return Err(DynSecError::Config {
                message: "broker host must not be empty".to_string(),
            });
        }

        let broker = format!("{}:{}", options.host, options.port);
        let mut mqtt_options = MqttOptions::new(&options.client_id, &options.host, options.port);
        mqtt_options.set_keep_alive(options.keep_alive);
        mqtt_options.set_clean_session(true);
        mqtt_options.set_credentials(
            options.username.clone(),
            options.password.clone().unwrap_or_default(),
        );

        let (client, mut eventloop) =
            AsyncClient::new(mqtt_options, ProtocolConfig::EVENT_CHANNEL_CAPACITY);

        tokio::time::timeout(ProtocolConfig::CONNECT_TIMEOUT, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| DynSecError::Transport {
                message: format!("timed out connecting to {}", broker),
            })??;

        client
            .subscribe(ProtocolConfig::RESPONSE_TOPIC, QoS::AtLeastOnce)
            .await?;
        info!("Connected to MQTT broker {}", broker);

        let connected = Arc::new(AtomicBool::new(true));
        let stopping = Arc::new(AtomicBool::new(false));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::channel(ProtocolConfig::EVENT_CHANNEL_CAPACITY);

        let task_handle = tokio::spawn(event_loop(
            eventloop,
            client.clone(),
            connected.clone(),
            stopping.clone(),
            events_tx,
            shutdown_rx,
        ));

        let transport = Arc::new(Self {
            client,
            connected,
            stopping,
            shutdown_tx,
            task_handle: Mutex::new(Some(task_handle)),
            broker,
        });

        Ok((transport, events_rx))
    }

    /// Send DISCONNECT and wait for the event loop to finish.
    pub async fn disconnect(&self) -> Result<()> {
        if self.stopping.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.connected.store(false, Ordering::SeqCst);

        if let Err(e) = self.client.disconnect().await {
            debug!("DISCONNECT not queued: {}", e);
        }

        let handle = self.task_handle.lock().expect("task handle lock poisoned").take();
        if let Some(handle) = handle {
            let abort = handle.abort_handle();
            if tokio::time::timeout(ProtocolConfig::CONNECT_TIMEOUT, handle).await.is_err() {
                warn!("MQTT event loop did not stop in time; aborting");
                abort.abort();
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Disconnected from MQTT broker {}", self.broker);
        Ok(())
    }

    /// Stop the event loop without waiting.
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.client.try_disconnect();
        let _ = self.shutdown_tx.send(true);
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait::async_trait]
impl Transport for MqttTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        if !self.is_connected() {
            return Err(DynSecError::NotConnected);
        }
        self.client
            .publish_bytes(topic, QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                return Err(DynSecError::Transport {
                    message: format!("connection failed: {}", e),
                })
            }
        }
    }
}

async fn event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    stopping: Arc<AtomicBool>,
    events: mpsc::Sender<TransportEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("MQTT event loop shutting down");
                break;
            }
            event = eventloop.poll() => event,
        };

        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Reconnected to MQTT broker");
                // This task drains the request channel, so never block on it here.
                if let Err(e) = client.try_subscribe(ProtocolConfig::RESPONSE_TOPIC, QoS::AtLeastOnce) {
                    error!("Failed to resubscribe to response topic: {}", e);
                }
                connected.store(true, Ordering::SeqCst);
                if events.send(TransportEvent::Connected).await.is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = TransportEvent::Message {
                    topic: publish.topic,
                    payload: publish.payload,
                };
                if events.send(message).await.is_err() {
                    debug!("Event receiver dropped; stopping MQTT event loop");
                    break;
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                connected.store(false, Ordering::SeqCst);
                debug!("DISCONNECT sent");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if stopping.load(Ordering::SeqCst) {
                    break;
                }
                if connected.swap(false, Ordering::SeqCst) {
                    warn!("MQTT connection lost: {}", e);
                    let lost = TransportEvent::ConnectionLost {
                        reason: e.to_string(),
                    };
                    if events.send(lost).await.is_err() {
                        break;
                    }
                }
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(ProtocolConfig::RECONNECT_DELAY) => {}
                }
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_host_rejected() {
        let options = ConnectOptions::new("", 1883);
        let result = MqttTransport::connect(&options).await;
        assert!(matches!(result, Err(DynSecError::Config { .. })));
    }

    #[tokio::test]
    async fn test_connect_to_dead_broker_fails() {
        // Nothing listens on port 1.
        let options = ConnectOptions::new("127.0.0.1", 1);
        let result = MqttTransport::connect(&options).await;
        assert!(matches!(result, Err(DynSecError::Transport { .. })));
    }
}
