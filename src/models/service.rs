//! Service entity and its protocol/status vocabulary.

use serde::Serialize;

use crate::models::host::{HostId, InterfaceId};

/// Opaque identifier for a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ServiceId(pub(crate) usize);

/// Transport protocol a service listens on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Other(String),
}

impl Protocol {
    /// Parse a recognized transport name, case-insensitive.
    ///
    /// Only TCP and UDP qualify; anything else is not a transport the
    /// port-splitting heuristics accept.
    pub fn from_transport(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observed state of a service's port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Open,
    Closed,
    Filtered,
}

/// A service bound to one host interface.
///
/// At most one `Service` exists per (interface, protocol, port) within a
/// report; records revisiting the same triple reuse the existing entity.
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: ServiceId,
    pub host: HostId,
    pub interface: InterfaceId,
    /// Display name; "unknown" when the source record cannot resolve one.
    pub name: String,
    pub protocol: Protocol,
    pub port: u16,
    pub status: ServiceStatus,
}
