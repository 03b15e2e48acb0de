//! Data connectors for the Warden gateway.
//!
//! A [`Connector`] is an opaque capability: the gateway brokers access to
//! it but never looks inside. The [`ConnectorRegistry`] maps names to
//! connectors and enforces the tenant grant list on every lookup.

pub mod config;
pub mod connector;
pub mod error;
pub mod log;
pub mod registry;

pub use config::{ConnectorEntry, ConnectorsFile, expand_env_str, load_connectors_file};
pub use connector::{Connector, ConnectorMeta, DynConnector};
pub use error::ConnectorError;
pub use log::LogConnector;
pub use registry::{ConnectorHealth, ConnectorRegistry};
