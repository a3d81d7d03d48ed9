//! Pending command registry.
//!
//! The one piece of mutable shared state in the engine. Entries are inserted by
//! dispatch and removed exactly once by whichever of {response, timer expiry,
//! disconnect drain} reaches [`PendingRegistry::take`] first. The mutex makes
//! `take` the single-assignment step: the loser observes `None`.

use super::timeout::TimerHandle;
use crate::config::InFlightPolicy;
use crate::{DynSecError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::oneshot;

/// Identifier carried in `correlationData` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId {
    value: String,
    seq: u64,
}

impl CorrelationId {
    pub fn new(token: &str, seq: u64) -> Self {
        Self {
            value: format!("{}-{}", token, seq),
            seq,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Bookkeeping for a dispatched command awaiting its result.
#[derive(Debug)]
pub struct PendingCall {
    pub id: CorrelationId,
    pub command: String,
    pub dispatched_at: Instant,
    sender: oneshot::Sender<Result<Value>>,
    timer: Option<TimerHandle>,
}

impl PendingCall {
    pub fn new(id: CorrelationId, command: String, sender: oneshot::Sender<Result<Value>>) -> Self {
        Self {
            id,
            command,
            dispatched_at: Instant::now(),
            sender,
            timer: None,
        }
    }

    /// Disarm the timer (if any) and deliver the outcome.
    ///
    /// Returns `false` if the caller already dropped its handle.
    pub fn settle(mut self, outcome: Result<Value>) -> bool {
        if let Some(timer) = self.timer.take() {
            timer.disarm();
        }
        self.sender.send(outcome).is_ok()
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.disarm();
        }
    }
}

/// Correlation-id keyed map of pending calls.
#[derive(Debug, Clone, Default)]
pub struct PendingRegistry {
    calls: Arc<Mutex<HashMap<String, PendingCall>>>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a call, enforcing the in-flight policy and size limit
    /// atomically with the insert.
    pub fn insert(&self, call: PendingCall, policy: InFlightPolicy, max_pending: usize) -> Result<()> {
        let mut calls = self.calls.lock().expect("registry lock poisoned");

        if policy == InFlightPolicy::OnePerCommand
            && calls.values().any(|c| c.command == call.command)
        {
            return Err(DynSecError::CommandAlreadyInFlight {
                command: call.command,
            });
        }
        if calls.len() >= max_pending {
            return Err(DynSecError::TooManyPending { limit: max_pending });
        }

        calls.insert(call.id.as_str().to_string(), call);
        Ok(())
    }

    /// Attach an armed timer to a registered call.
    ///
    /// If the call has already been settled the timer is disarmed instead.
    pub fn attach_timer(&self, id: &CorrelationId, timer: TimerHandle) {
        let mut calls = self.calls.lock().expect("registry lock poisoned");
        match calls.get_mut(id.as_str()) {
            Some(call) => {
                if let Some(previous) = call.timer.replace(timer) {
                    previous.disarm();
                }
            }
            None => timer.disarm(),
        }
    }

    /// Remove and return the call for a correlation id.
    pub fn take(&self, id: &str) -> Option<PendingCall> {
        self.calls.lock().expect("registry lock poisoned").remove(id)
    }

    /// Remove and return the oldest pending call for a command name.
    pub fn take_oldest_for(&self, command: &str) -> Option<PendingCall> {
        let mut calls = self.calls.lock().expect("registry lock poisoned");
        let key = calls
            .values()
            .filter(|c| c.command == command)
            .min_by_key(|c| c.id.seq())
            .map(|c| c.id.as_str().to_string())?;
        calls.remove(&key)
    }

    /// Remove every pending call, disarming their timers.
    pub fn drain(&self) -> Vec<PendingCall> {
        let mut calls = self.calls.lock().expect("registry lock poisoned");
        let mut drained: Vec<PendingCall> = calls.drain().map(|(_, c)| c).collect();
        for call in drained.iter_mut() {
            call.disarm();
        }
        drained.sort_by_key(|c| c.id.seq());
        drained
    }

    pub fn contains(&self, id: &str) -> bool {
        self.calls
            .lock()
            .expect("registry lock poisoned")
            .contains_key(id)
    }

    pub fn contains_command(&self, command: &str) -> bool {
        self.calls
            .lock()
            .expect("registry lock poisoned")
            .values()
            .any(|c| c.command == command)
    }

    pub fn len(&self) -> usize {
        self.calls.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
