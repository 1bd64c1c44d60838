//! Host and interface entities.

use serde::Serialize;

/// Opaque identifier for a registered host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HostId(pub(crate) usize);

/// Opaque identifier for a registered interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InterfaceId(pub(crate) usize);

/// Free-text key/value note attached to a host (e.g. netBIOS name/domain).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostNote {
    pub key: String,
    pub value: String,
}

/// A scanned host, identified by its primary network address.
///
/// Exactly one `Host` exists per distinct address within a report; the
/// registry enforces this.
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    pub id: HostId,
    pub address: String,
    pub os: Option<String>,
    pub notes: Vec<HostNote>,
}

/// A network interface bound to exactly one host.
///
/// Created once per (host, address) pair; `hostnames` only ever grows, and
/// never holds duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct Interface {
    pub id: InterfaceId,
    pub host: HostId,
    pub address: String,
    pub hostnames: Vec<String>,
}
