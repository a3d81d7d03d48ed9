//! Centralized configuration for the Dynamic Security client.
//!
//! Protocol constants live on [`ProtocolConfig`]; per-instance settings are
//! carried by [`EngineConfig`] and [`ConnectOptions`].

use std::time::Duration;

/// Wire-level protocol constants.
pub struct ProtocolConfig;

impl ProtocolConfig {
    pub const API_VERSION: &'static str = "v1";
    pub const MGMT_TOPIC: &'static str = "$CONTROL/dynamic-security/v1";
    pub const RESPONSE_TOPIC: &'static str = "$CONTROL/dynamic-security/v1/response";

    // Engine defaults
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DEFAULT_MAX_PENDING: usize = 1024;

    // MQTT session
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 1883;
    pub const DEFAULT_USERNAME: &'static str = "admin-user";
    pub const KEEP_ALIVE: Duration = Duration::from_secs(30);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;
}

/// How many calls may be outstanding for the same command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InFlightPolicy {
    /// A second dispatch of a pending command name fails with
    /// `CommandAlreadyInFlight`.
    #[default]
    OnePerCommand,
    /// Calls are told apart by correlation id only.
    Concurrent,
}

/// Settings for a [`CommandEngine`](crate::engine::CommandEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub command_timeout: Duration,
    pub in_flight_policy: InFlightPolicy,
    pub max_pending: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout: ProtocolConfig::DEFAULT_COMMAND_TIMEOUT,
            in_flight_policy: InFlightPolicy::OnePerCommand,
            max_pending: ProtocolConfig::DEFAULT_MAX_PENDING,
        }
    }
}

/// Broker connection settings for the MQTT transport.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl ConnectOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = Some(password.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: ProtocolConfig::DEFAULT_HOST.to_string(),
            port: ProtocolConfig::DEFAULT_PORT,
            username: ProtocolConfig::DEFAULT_USERNAME.to_string(),
            password: None,
            client_id: format!("dynsec-{}", uuid::Uuid::new_v4().simple()),
            keep_alive: ProtocolConfig::KEEP_ALIVE,
        }
    }
}
