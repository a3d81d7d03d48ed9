//! Builder for configuring a DynSecClient.

use std::sync::Arc;
use std::time::Duration;

use super::DynSecClient;
use crate::config::{ConnectOptions, EngineConfig, InFlightPolicy};
use crate::engine::CommandEngine;
use crate::error::{DynSecError, Result};
use crate::transport::{MqttTransport, Transport};

/// Builder for configuring a [`DynSecClient`].
///
/// # Example
///
/// ```rust,ignore
/// use dynsec_core::DynSecClient;
/// use std::time::Duration;
///
/// let client = DynSecClient::builder()
///     .host("broker.local")
///     .credentials("admin-user", "secret")
///     .command_timeout(Duration::from_secs(5))
///     .connect()
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DynSecClientBuilder {
    options: ConnectOptions,
    engine: EngineConfig,
}

impl DynSecClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all connection options at once.
    pub fn connect_options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    /// Default: `localhost`
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.options.host = host.into();
        self
    }

    /// Default: `1883`
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Default: `admin-user` with no password
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.options.username = username.into();
        self.options.password = Some(password.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.options.client_id = client_id.into();
        self
    }

    /// How long a command may wait for its response.
    ///
    /// Default: 3 seconds
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.engine.command_timeout = timeout;
        self
    }

    /// Allow several calls for the same command name at once.
    ///
    /// Default: `false` (one call per command name)
    pub fn concurrent_commands(mut self, enable: bool) -> Self {
        self.engine.in_flight_policy = if enable {
            InFlightPolicy::Concurrent
        } else {
            InFlightPolicy::OnePerCommand
        };
        self
    }

    pub fn max_pending(mut self, max_pending: usize) -> Self {
        self.engine.max_pending = max_pending;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.engine.command_timeout.is_zero() {
            return Err(DynSecError::Config {
                message: "command timeout must be greater than zero".to_string(),
            });
        }
        if self.engine.max_pending == 0 {
            return Err(DynSecError::Config {
                message: "max_pending must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Connect to the broker and start routing responses.
    pub async fn connect(self) -> Result<DynSecClient> {
        self.validate()?;
        let (session, events) = MqttTransport::connect(&self.options).await?;
        let transport: Arc<dyn Transport> = session.clone();
        let engine = Arc::new(CommandEngine::new(transport, self.engine));
        engine.spawn_event_pump(events);
        Ok(DynSecClient::from_session(session, engine))
    }

    /// Build over an existing transport instead of connecting.
    pub fn build_with_transport(self, transport: Arc<dyn Transport>) -> Result<DynSecClient> {
        self.validate()?;
        Ok(DynSecClient::with_transport(transport, self.engine))
    }
}
