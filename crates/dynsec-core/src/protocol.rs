//! Wire envelopes for the Dynamic Security control topics.
//!
//! Outbound payloads are published on the management topic:
//!
//! ```text
//! {"commands":[{"command":"<name>","correlationData":"<id>", ...parameters}]}
//! ```
//!
//! Inbound payloads arrive on the response topic and may batch several results:
//!
//! ```text
//! {"responses":[{"command":"<name>","correlationData":"<id>","data":...,"error":"..."}]}
//! ```

use crate::{DynSecError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter map of a command. Keys are flattened next to `command`.
pub type Parameters = Map<String, Value>;

const COMMAND_KEY: &str = "command";
const CORRELATION_KEY: &str = "correlationData";

/// A single named command with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
    #[serde(rename = "correlationData", skip_serializing_if = "Option::is_none")]
    pub correlation_data: Option<String>,
    #[serde(flatten)]
    pub parameters: Parameters,
}

impl Command {
    /// Build a command. The name must be non-empty.
    ///
    /// Reserved keys (`command`, `correlationData`) are dropped from the
    /// parameters; the name always wins.
    pub fn new(name: impl Into<String>, mut parameters: Parameters) -> Result<Self> {
        let command = name.into();
        if command.trim().is_empty() {
            return Err(DynSecError::empty_field("command"));
        }
        parameters.remove(COMMAND_KEY);
        parameters.remove(CORRELATION_KEY);
        Ok(Self {
            command,
            correlation_data: None,
            parameters,
        })
    }

    pub fn with_correlation(mut self, correlation: impl Into<String>) -> Self {
        self.correlation_data = Some(correlation.into());
        self
    }
}

/// Outbound container. The engine always sends exactly one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub commands: Vec<Command>,
}

impl RequestEnvelope {
    pub fn single(command: Command) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Result of one command as reported by the broker.
///
/// When `error` is present it takes precedence over `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command: String,
    #[serde(
        rename = "correlationData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    /// Collapse into the caller-facing outcome. Absent data is `Value::Null`.
    pub fn into_outcome(self) -> Result<Value> {
        match self.error {
            Some(message) => Err(DynSecError::Remote {
                command: self.command,
                message,
            }),
            None => Ok(self.data.unwrap_or(Value::Null)),
        }
    }
}

/// Inbound container. Entries stay undecoded so that one bad entry does not
/// spoil the rest of the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub responses: Vec<Value>,
}

impl ResponseEnvelope {
    /// Parse an inbound payload. Fails unless `responses` is a sequence.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| DynSecError::MalformedResponse {
            message: format!("invalid response envelope: {}", e),
        })
    }
}

/// Decode a single batch entry.
pub fn decode_entry(entry: &Value) -> Result<CommandResponse> {
    CommandResponse::deserialize(entry).map_err(|e| DynSecError::MalformedResponse {
        message: format!("invalid command response: {}", e),
    })
}

/// Best-effort correlation id of an entry that failed to decode.
pub fn salvage_correlation(entry: &Value) -> Option<&str> {
    entry.get(CORRELATION_KEY).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_command_flattens_parameters() {
        let cmd = Command::new(
            "createClient",
            params(json!({"username": "a", "password": "b"})),
        )
        .unwrap()
        .with_correlation("abc-1");
        let bytes = RequestEnvelope::single(cmd).to_bytes().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value,
            json!({"commands": [{
                "command": "createClient",
                "correlationData": "abc-1",
                "username": "a",
                "password": "b"
            }]})
        );
    }

    #[test]
    fn test_command_without_parameters() {
        let cmd = Command::new("getDefaultACLAccess", Parameters::new()).unwrap();
        let json = serde_json::to_string(&RequestEnvelope::single(cmd)).unwrap();
        assert_eq!(json, r#"{"commands":[{"command":"getDefaultACLAccess"}]}"#);
    }

    #[test]
    fn test_command_name_wins_over_parameter() {
        let cmd = Command::new("deleteClient", params(json!({"command": "bogus", "username": "x"})))
            .unwrap();
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["command"], "deleteClient");
        assert_eq!(value["username"], "x");
    }

    #[test]
    fn test_empty_command_name_rejected() {
        let result = Command::new("  ", Parameters::new());
        assert!(matches!(result, Err(DynSecError::Validation { .. })));
    }

    #[test]
    fn test_envelope_requires_sequence() {
        assert!(ResponseEnvelope::from_bytes(br#"{"responses":[]}"#).is_ok());
        assert!(matches!(
            ResponseEnvelope::from_bytes(br#"{"responses":{}}"#),
            Err(DynSecError::MalformedResponse { .. })
        ));
        assert!(matches!(
            ResponseEnvelope::from_bytes(b"not json"),
            Err(DynSecError::MalformedResponse { .. })
        ));
        assert!(ResponseEnvelope::from_bytes(br#"{"other":[]}"#).is_err());
    }

    #[test]
    fn test_error_takes_precedence_over_data() {
        let resp = decode_entry(&json!({
            "command": "createClient",
            "data": {"ignored": true},
            "error": "already exists"
        }))
        .unwrap();
        match resp.into_outcome() {
            Err(DynSecError::Remote { command, message }) => {
                assert_eq!(command, "createClient");
                assert_eq!(message, "already exists");
            }
            other => panic!("Expected Remote error, got: {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_is_null() {
        let resp = decode_entry(&json!({"command": "deleteRole"})).unwrap();
        assert_eq!(resp.into_outcome().unwrap(), Value::Null);
    }

    #[test]
    fn test_entry_with_non_string_error_is_malformed() {
        let entry = json!({"command": "getRole", "correlationData": "t-4", "error": 17});
        assert!(matches!(
            decode_entry(&entry),
            Err(DynSecError::MalformedResponse { .. })
        ));
        assert_eq!(salvage_correlation(&entry), Some("t-4"));
    }
}
