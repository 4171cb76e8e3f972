//! Domain types for the cluster topology.
//!
//! An [`AppCluster`] is one logical service; its [`AppBackend`]s are the
//! running instances behind it. All types are serializable via serde so a
//! topology can be read from a manifest file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed identifier for an app cluster.
///
/// Doubles as the artifact filename stem, so it must be unique within one
/// synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct AppId(pub String);

impl AppId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can name a single file directly under a directory:
    /// non-empty, not `.`/`..`, no path separators or NUL.
    pub fn is_valid_stem(&self) -> bool {
        let id = self.as_str();
        !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle state of a backend instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    #[default]
    Staging,
    Running,
    Draining,
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendState::Staging => write!(f, "staging"),
            BackendState::Running => write!(f, "running"),
            BackendState::Draining => write!(f, "draining"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One running instance of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBackend {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub state: BackendState,
}

impl AppBackend {
    pub fn new(host: impl Into<String>, port: u16, state: BackendState) -> Self {
        Self {
            host: host.into(),
            port,
            state,
        }
    }
}

impl fmt::Display for AppBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Health check descriptor attached to a cluster.
///
/// Only `protocol` ends up in the published artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HealthCheck {
    #[serde(default)]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// A logical service and the ordered set of backends behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppCluster {
    pub id: AppId,
    /// Transport protocol, e.g. `tcp` or `udp`.
    #[serde(default)]
    pub protocol: String,
    /// Application-level protocol as reported upstream. Informational; the
    /// published artifact resolves its own (see `labels["proto"]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    pub service_port: u16,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub backends: Vec<AppBackend>,
}

impl AppCluster {
    /// Health check protocol, if a health check with a non-empty protocol is set.
    pub fn health_check_protocol(&self) -> Option<&str> {
        self.health_check
            .as_ref()
            .map(|hc| hc.protocol.as_str())
            .filter(|proto| !proto.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
