//! fleetfile core library — topology types, the listener contract, config.
//!
//! - [`types`] — [`AppCluster`], [`AppBackend`], [`HealthCheck`]
//! - [`listener`] — the [`EventListener`] contract
//! - [`logger`] — [`EventLogger`], the logging listener
//! - [`sink`] — injected [`LogSink`] capability
//! - [`config`] / [`manifest`] — YAML loaders
//! - [`error`] — [`ConfigError`], [`ManifestError`]

pub mod config;
pub mod error;
pub mod listener;
pub mod logger;
pub mod manifest;
pub mod sink;
pub mod types;

pub use config::PublisherConfig;
pub use error::{ConfigError, ManifestError};
pub use listener::{EventListener, RemovedFrom};
pub use logger::EventLogger;
pub use sink::{LogSink, MemorySink, TracingSink};
pub use types::{AppBackend, AppCluster, AppId, BackendState, HealthCheck};
