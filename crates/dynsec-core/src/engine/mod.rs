//! Command-correlation engine.
//!
//! Turns the fire-and-forget control topics into request/reply calls:
//!
//! ```text
//! dispatch ─► registry.insert ─► timer.arm ─► transport.publish
//!                                                   │
//! handle_message ◄──────────── response topic ◄─────┘
//!      │
//!      └─► registry.take ─► timer.disarm ─► ResponseHandle resolves
//! ```
//!
//! Every dispatched call is settled exactly once: by its response, by its
//! timer, or by [`CommandEngine::fail_all`] when the session goes away.
//!
//! # Thread Safety
//!
//! The registry is guarded by a mutex so that the response handler and the
//! timer task can race on the same call; whichever removes it first settles
//! it and the other becomes a no-op.

mod demux;
mod handle;
mod registry;
mod timeout;

pub use demux::DemuxReport;
pub use handle::ResponseHandle;
pub use registry::{CorrelationId, PendingCall, PendingRegistry};
pub use timeout::{TimeoutScheduler, TimerHandle};

use crate::config::{EngineConfig, ProtocolConfig};
use crate::protocol::{Command, Parameters, RequestEnvelope};
use crate::transport::{Transport, TransportEvent};
use crate::{DynSecError, Result};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Snapshot of engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub dispatched: u64,
    pub resolved: u64,
    pub remote_errors: u64,
    pub timeouts: u64,
    pub unmatched: u64,
    pub malformed: u64,
    pub abandoned: u64,
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    resolved: AtomicU64,
    remote_errors: AtomicU64,
    timeouts: AtomicU64,
    unmatched: AtomicU64,
    malformed: AtomicU64,
    abandoned: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> EngineStats {
        EngineStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Dispatches commands and correlates their responses.
pub struct CommandEngine {
    transport: Arc<dyn Transport>,
    registry: PendingRegistry,
    scheduler: TimeoutScheduler,
    config: EngineConfig,
    instance: String,
    next_seq: AtomicU64,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for CommandEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEngine")
            .field("instance", &self.instance)
            .field("config", &self.config)
            .field("pending", &self.registry.len())
            .finish()
    }
}

impl CommandEngine {
    pub fn new(transport: Arc<dyn Transport>, config: EngineConfig) -> Self {
        Self {
            transport,
            registry: PendingRegistry::new(),
            scheduler: TimeoutScheduler::new(),
            config,
            instance: uuid::Uuid::new_v4().simple().to_string(),
            next_seq: AtomicU64::new(1),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Send a command and return a handle for its result.
    ///
    /// Fails before publishing anything when the transport is not connected,
    /// when the in-flight policy forbids another call for `name`, or when the
    /// pending limit is reached. A publish failure unregisters the call and
    /// is returned here as well; every later failure arrives through the
    /// returned handle.
    pub async fn dispatch(&self, name: &str, parameters: Parameters) -> Result<ResponseHandle> {
        let command = Command::new(name, parameters)?;

        if !self.transport.is_connected() {
            return Err(DynSecError::NotConnected);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let id = CorrelationId::new(&self.instance, seq);
        let payload = RequestEnvelope::single(command.with_correlation(id.as_str())).to_bytes()?;

        let (tx, rx) = oneshot::channel();
        self.registry.insert(
            PendingCall::new(id.clone(), name.to_string(), tx),
            self.config.in_flight_policy,
            self.config.max_pending,
        )?;
        self.arm_timeout(&id, name);

        if let Err(e) = self
            .transport
            .publish(ProtocolConfig::MGMT_TOPIC, Bytes::from(payload))
            .await
        {
            if let Some(call) = self.registry.take(id.as_str()) {
                call.settle(Err(DynSecError::Disconnected));
            }
            warn!("Failed to publish {} ({}): {}", name, id, e);
            return Err(e);
        }

        Counters::bump(&self.counters.dispatched);
        debug!("Dispatched {} ({})", name, id);

        Ok(ResponseHandle::new(name.to_string(), id, rx))
    }

    /// Dispatch a command and wait for its result.
    pub async fn call(&self, name: &str, parameters: Parameters) -> Result<Value> {
        self.dispatch(name, parameters).await?.await
    }

    /// Reject every pending call with `Disconnected`.
    ///
    /// Returns the number of calls that were pending.
    pub fn fail_all(&self, reason: &str) -> usize {
        let drained = self.registry.drain();
        let count = drained.len();
        for call in drained {
            debug!("Abandoning {} ({}): {}", call.command, call.id, reason);
            call.settle(Err(DynSecError::Disconnected));
            Counters::bump(&self.counters.abandoned);
        }
        if count > 0 {
            warn!("Failed {} pending command(s): {}", count, reason);
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether any call for `command` is awaiting a response.
    pub fn is_pending(&self, command: &str) -> bool {
        self.registry.contains_command(command)
    }

    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    /// Feed transport events into the engine until the transport closes its
    /// event channel.
    pub fn spawn_event_pump(self: &Arc<Self>, mut events: mpsc::Receiver<TransportEvent>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::Message { topic, payload } => {
                        // Failures are already logged and counted by the demultiplexer.
                        let _ = engine.handle_message(&topic, &payload);
                    }
                    TransportEvent::Connected => {
                        debug!("Transport session re-established");
                    }
                    TransportEvent::ConnectionLost { reason } => {
                        engine.fail_all(&reason);
                    }
                }
            }
            debug!("Transport event channel closed");
        })
    }

    fn arm_timeout(&self, id: &CorrelationId, name: &str) {
        let registry = self.registry.clone();
        let counters = self.counters.clone();
        let timeout = self.config.command_timeout;
        let key = id.as_str().to_string();
        let command = name.to_string();

        let timer = self.scheduler.arm(id, timeout, move || {
            // A response may have won the race; then there is nothing to do.
            if let Some(call) = registry.take(&key) {
                warn!("Command {} ({}) timed out after {:?}", command, key, timeout);
                Counters::bump(&counters.timeouts);
                call.settle(Err(DynSecError::CommandTimeout { command, timeout }));
            }
        });
        self.registry.attach_timer(id, timer);
    }
}

/// Convert any serializable parameter struct into a parameter map.
pub fn to_parameters<T: Serialize + ?Sized>(params: &T) -> Result<Parameters> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Parameters::new()),
        other => Err(DynSecError::Validation {
            field: "parameters".to_string(),
            message: format!("expected an object, got {}", other),
        }),
    }
}
