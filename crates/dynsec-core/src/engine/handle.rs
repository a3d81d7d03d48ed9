//! Caller-side result handle for a dispatched command.

use super::registry::CorrelationId;
use crate::{DynSecError, Result};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Resolves exactly once with the command's data or error.
///
/// Dropping the handle does not cancel the command; its registry entry is
/// still cleared by the response or the timeout.
#[derive(Debug)]
pub struct ResponseHandle {
    command: String,
    id: CorrelationId,
    rx: oneshot::Receiver<Result<Value>>,
}

impl ResponseHandle {
    pub(crate) fn new(command: String, id: CorrelationId, rx: oneshot::Receiver<Result<Value>>) -> Self {
        Self { command, id, rx }
    }

    /// Name of the command this handle waits on.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Correlation id sent with the command.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.id
    }
}

impl Future for ResponseHandle {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Sender dropped without settling: the engine went away.
            Poll::Ready(Err(_)) => Poll::Ready(Err(DynSecError::Disconnected)),
            Poll::Pending => Poll::Pending,
        }
    }
}
