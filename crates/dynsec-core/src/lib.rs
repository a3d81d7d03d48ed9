//! DynSec Core - request/reply administration for the Mosquitto Dynamic
//! Security plugin.
//!
//! The plugin is driven by publishing JSON command batches to a control topic
//! and reading results from a response topic. This crate turns that exchange
//! into ordinary async calls: each command gets a correlation id, a timeout,
//! and exactly one outcome.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynsec_core::{DynSecClient, ListRequest};
//!
//! #[tokio::main]
//! async fn main() -> dynsec_core::Result<()> {
//!     let client = DynSecClient::builder()
//!         .host("localhost")
//!         .credentials("admin-user", "secret")
//!         .connect()
//!         .await?;
//!
//!     let defaults = client.get_default_acl_access().await?;
//!     println!("{} default rules", defaults.acls.len());
//!
//!     let clients = client.list_clients(ListRequest::verbose()).await?;
//!     println!("{} clients", clients.total_count);
//!
//!     client.disconnect().await
//! }
//! ```

pub mod client;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::{DynSecClient, DynSecClientBuilder};
pub use commands::CommandName;
pub use config::{ConnectOptions, EngineConfig, InFlightPolicy, ProtocolConfig};
pub use engine::{CommandEngine, DemuxReport, EngineStats, ResponseHandle};
pub use error::{DynSecError, Result};
pub use protocol::Parameters;
pub use transport::{MemoryTransport, MqttTransport, PublishedMessage, Transport, TransportEvent};
pub use types::*;
