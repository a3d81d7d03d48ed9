//! Typed Dynamic Security client.
//!
//! `DynSecClient` owns a [`CommandEngine`] and, when created through
//! [`DynSecClient::connect`], the MQTT session feeding it. Each administrative
//! operation is a thin parameter-shaping method over [`CommandEngine::call`];
//! the submodules group them the way the plugin documents them.

mod builder;
mod clients;
mod general;
mod groups;
mod roles;

pub use builder::DynSecClientBuilder;

use crate::commands::CommandName;
use crate::config::{ConnectOptions, EngineConfig};
use crate::engine::{to_parameters, CommandEngine};
use crate::transport::{MqttTransport, Transport};
use crate::{DynSecError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Administrative client for the Mosquitto Dynamic Security plugin.
pub struct DynSecClient {
    engine: Arc<CommandEngine>,
    session: Option<Arc<MqttTransport>>,
}

impl DynSecClient {
    /// Connect to a broker with the given options and default engine settings.
    pub async fn connect(options: ConnectOptions) -> Result<Self> {
        DynSecClientBuilder::new().connect_options(options).connect().await
    }

    pub fn builder() -> DynSecClientBuilder {
        DynSecClientBuilder::new()
    }

    /// Build a client over an existing transport.
    ///
    /// Inbound messages must be delivered to [`CommandEngine::handle_message`]
    /// (directly or through [`CommandEngine::spawn_event_pump`]).
    pub fn with_transport(transport: Arc<dyn Transport>, config: EngineConfig) -> Self {
        Self {
            engine: Arc::new(CommandEngine::new(transport, config)),
            session: None,
        }
    }

    pub(crate) fn from_session(session: Arc<MqttTransport>, engine: Arc<CommandEngine>) -> Self {
        Self {
            engine,
            session: Some(session),
        }
    }

    /// The correlation engine behind this client.
    pub fn engine(&self) -> &Arc<CommandEngine> {
        &self.engine
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }

    /// Fail all pending commands and close the broker session.
    pub async fn disconnect(&self) -> Result<()> {
        self.engine.fail_all("client disconnected");
        if let Some(session) = &self.session {
            session.disconnect().await?;
        }
        info!("Dynamic Security client disconnected");
        Ok(())
    }

    /// Send any command by wire name and return its raw data.
    pub async fn send_raw(&self, command: &str, parameters: Value) -> Result<Value> {
        let parameters = to_parameters(&parameters)?;
        self.engine.call(command, parameters).await
    }

    /// Send a catalog command and decode its data.
    pub(crate) async fn invoke<P, R>(&self, command: CommandName, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let data = self.engine.call(command.as_str(), to_parameters(params)?).await?;
        serde_json::from_value(data).map_err(|e| DynSecError::MalformedResponse {
            message: format!("unexpected data for {}: {}", command, e),
        })
    }

    /// Send a catalog command whose result carries no data.
    pub(crate) async fn invoke_void<P>(&self, command: CommandName, params: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        let data = self.engine.call(command.as_str(), to_parameters(params)?).await?;
        if !data.is_null() {
            debug!("Ignoring data returned by {}", command);
        }
        Ok(())
    }
}

impl Drop for DynSecClient {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            session.shutdown();
        }
    }
}

/// Reject empty required names before anything is sent.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DynSecError::empty_field(field));
    }
    Ok(())
}
