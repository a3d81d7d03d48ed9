//! Error types for the Dynamic Security client.
//!
//! Synchronous precondition failures (`NotConnected`, `CommandAlreadyInFlight`,
//! `TooManyPending`, `Validation`) are returned directly from dispatch. Everything
//! that happens after a command has been published reaches the caller through
//! its [`ResponseHandle`](crate::engine::ResponseHandle).

use std::time::Duration;
use thiserror::Error;

/// Main error type for the Dynamic Security client.
#[derive(Debug, Error)]
pub enum DynSecError {
    // Dispatch preconditions
    #[error("Can't send command: not connected")]
    NotConnected,

    #[error("Command already in flight: {command}")]
    CommandAlreadyInFlight { command: String },

    #[error("Too many pending commands (limit {limit})")]
    TooManyPending { limit: usize },

    // Post-dispatch outcomes
    #[error("Command {command} timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Command {command} failed: {message}")]
    Remote { command: String, message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Connection lost while command was pending")]
    Disconnected,

    // Transport errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Dynamic Security operations.
pub type Result<T> = std::result::Result<T, DynSecError>;

impl From<serde_json::Error> for DynSecError {
    fn from(err: serde_json::Error) -> Self {
        DynSecError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rumqttc::ClientError> for DynSecError {
    fn from(err: rumqttc::ClientError) -> Self {
        DynSecError::Transport {
            message: err.to_string(),
        }
    }
}

impl DynSecError {
    /// Create a validation error for an empty required field.
    pub fn empty_field(field: &str) -> Self {
        DynSecError::Validation {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        }
    }

    /// Error reported by the broker for a specific command, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            DynSecError::Remote { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Check if re-issuing the same command could succeed.
    ///
    /// The engine never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DynSecError::CommandTimeout { .. }
                | DynSecError::Disconnected
                | DynSecError::Transport { .. }
                | DynSecError::TooManyPending { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DynSecError::Remote {
            command: "createClient".into(),
            message: "already exists".into(),
        };
        assert_eq!(err.to_string(), "Command createClient failed: already exists");
        assert_eq!(err.remote_message(), Some("already exists"));
    }

    #[test]
    fn test_timeout_display_includes_command() {
        let err = DynSecError::CommandTimeout {
            command: "listClients".into(),
            timeout: Duration::from_secs(3),
        };
        assert!(err.to_string().contains("listClients"));
        assert!(err.to_string().contains("3s"));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(DynSecError::Disconnected.is_retryable());
        assert!(DynSecError::CommandTimeout {
            command: "getClient".into(),
            timeout: Duration::from_secs(3),
        }
        .is_retryable());
        assert!(!DynSecError::Remote {
            command: "getClient".into(),
            message: "Client not found".into(),
        }
        .is_retryable());
        assert!(!DynSecError::NotConnected.is_retryable());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DynSecError = parse_err.into();
        assert!(matches!(err, DynSecError::Json { .. }));
    }
}
