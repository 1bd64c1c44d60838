//! Canonical entity model all report formats normalize into.

pub mod host;
pub mod service;
pub mod severity;
pub mod vulnerability;

pub use host::{Host, HostId, HostNote, Interface, InterfaceId};
pub use service::{Protocol, Service, ServiceId, ServiceStatus};
pub use severity::Severity;
pub use vulnerability::{CreateVulnerability, VulnClass, VulnId, VulnTarget, Vulnerability};
