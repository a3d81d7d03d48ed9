//! Response demultiplexer.

use super::{CommandEngine, Counters, PendingCall};
use crate::config::ProtocolConfig;
use crate::protocol::{decode_entry, salvage_correlation, ResponseEnvelope};
use crate::{DynSecError, Result};
use tracing::{debug, warn};

/// What happened to each entry of an inbound batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxReport {
    /// Calls resolved with data.
    pub resolved: usize,
    /// Calls rejected with a remote error or a malformed entry.
    pub rejected: usize,
    /// Responses with no pending call.
    pub unmatched: usize,
    /// Entries that did not decode.
    pub malformed: usize,
}

impl DemuxReport {
    pub fn settled(&self) -> usize {
        self.resolved + self.rejected
    }
}

impl CommandEngine {
    /// Route an inbound message to the pending calls it answers.
    ///
    /// Fails with `MalformedResponse` only when the payload is not a response
    /// envelope at all; individual bad entries are skipped so the rest of the
    /// batch is still delivered. Messages on other topics are ignored.
    pub fn handle_message(&self, topic: &str, payload: &[u8]) -> Result<DemuxReport> {
        let mut report = DemuxReport::default();

        if topic != ProtocolConfig::RESPONSE_TOPIC {
            debug!("Ignoring message on unrelated topic {}", topic);
            return Ok(report);
        }

        let envelope = ResponseEnvelope::from_bytes(payload).inspect_err(|e| {
            Counters::bump(&self.counters.malformed);
            warn!("Dropping inbound message: {}", e);
        })?;

        for entry in &envelope.responses {
            let response = match decode_entry(entry) {
                Ok(response) => response,
                Err(e) => {
                    report.malformed += 1;
                    Counters::bump(&self.counters.malformed);
                    warn!("Skipping response entry: {}", e);

                    if let Some(call) = salvage_correlation(entry).and_then(|id| self.registry.take(id)) {
                        report.rejected += 1;
                        call.settle(Err(e));
                    }
                    continue;
                }
            };

            let call = match response.correlation_data.as_deref() {
                Some(id) => self.registry.take(id),
                None => self.registry.take_oldest_for(&response.command),
            };

            let Some(call) = call else {
                report.unmatched += 1;
                Counters::bump(&self.counters.unmatched);
                warn!(
                    "Response for unsent or already-settled command {} ({})",
                    response.command,
                    response.correlation_data.as_deref().unwrap_or("no correlation")
                );
                continue;
            };

            if call.command != response.command {
                warn!(
                    "Response names {} but correlation {} belongs to {}",
                    response.command, call.id, call.command
                );
            }

            self.settle_call(call, response.into_outcome(), &mut report);
        }

        Ok(report)
    }

    fn settle_call(&self, call: PendingCall, outcome: Result<serde_json::Value>, report: &mut DemuxReport) {
        let elapsed = call.dispatched_at.elapsed();
        match &outcome {
            Ok(_) => {
                report.resolved += 1;
                Counters::bump(&self.counters.resolved);
                debug!("Resolved {} ({}) in {:?}", call.command, call.id, elapsed);
            }
            Err(DynSecError::Remote { message, .. }) => {
                report.rejected += 1;
                Counters::bump(&self.counters.remote_errors);
                debug!("Rejected {} ({}): {}", call.command, call.id, message);
            }
            Err(e) => {
                report.rejected += 1;
                debug!("Rejected {} ({}): {}", call.command, call.id, e);
            }
        }

        if !call.settle(outcome) {
            debug!("Caller no longer waiting for result");
        }
    }
}
