//! Vulnerability entity, its target binding, and its creation input.

use serde::Serialize;

use crate::models::host::HostId;
use crate::models::service::ServiceId;
use crate::models::severity::Severity;

/// Opaque identifier for a registered vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VulnId(pub(crate) usize);

/// What a vulnerability is bound to: a host-level finding has no port
/// context, a service-level finding attaches to one registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "id", rename_all = "lowercase")]
pub enum VulnTarget {
    Host(HostId),
    Service(ServiceId),
}

/// Routing subtype for a finding.
///
/// Web-classified findings carry the website they were observed on, so the
/// host application can route them to its web-vulnerability representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "class", rename_all = "lowercase")]
pub enum VulnClass {
    Generic,
    Web { website: Option<String> },
}

/// Normalized attributes for one finding, ready for registration.
#[derive(Debug, Clone)]
pub struct CreateVulnerability {
    pub target: VulnTarget,
    pub name: String,
    /// May be synthesized from several source fields (solution, exploit,
    /// score, context) joined in a fixed section order.
    pub description: String,
    pub severity: Severity,
    /// The source format's own label, kept alongside the normalized value.
    pub original_severity: String,
    /// Deduplicated, order-preserving reference list (CVE ids or
    /// equivalent); never contains sentinel tokens.
    pub references: Vec<String>,
    pub resolution: String,
    pub class: VulnClass,
}

/// A registered finding. Findings are never deduplicated: every normalized
/// record becomes one `Vulnerability`, even when name and target repeat.
#[derive(Debug, Clone, Serialize)]
pub struct Vulnerability {
    pub id: VulnId,
    pub target: VulnTarget,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub original_severity: String,
    pub references: Vec<String>,
    pub resolution: String,
    #[serde(flatten)]
    pub class: VulnClass,
}
