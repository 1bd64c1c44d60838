//! Entity registry: idempotent registration and deduplication of hosts,
//! interfaces, and services within one report.
//!
//! The registry exclusively owns entity identity. Format parsers never
//! construct or compare identifiers; they hand in normalized attributes and
//! get back opaque ids. `ensure_*` operations are idempotent upserts keyed
//! by the model invariants (one host per address, one interface per
//! (host, address), one service per (interface, protocol, port));
//! `add_vulnerability` never deduplicates. One registry instance is scoped
//! to one report run and is discarded afterwards.

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, warn};

use crate::errors::Warning;
use crate::models::{
    CreateVulnerability, Host, HostId, HostNote, Interface, InterfaceId, Protocol, Service,
    ServiceId, ServiceStatus, VulnId, Vulnerability,
};

/// What to do when a record carries no identifying address at all.
///
/// `Placeholder` coerces the absent address to the empty string, so the
/// finding still surfaces on a shared placeholder host. `Drop` rejects the
/// record with a [`Warning::MissingRequiredField`] instead, avoiding the
/// degenerate empty-address host entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingAddressPolicy {
    #[default]
    Placeholder,
    Drop,
}

/// In-memory entity store for a single report run.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    policy: MissingAddressPolicy,
    hosts: Vec<Host>,
    interfaces: Vec<Interface>,
    services: Vec<Service>,
    vulnerabilities: Vec<Vulnerability>,
    host_index: HashMap<String, HostId>,
    interface_index: HashMap<(HostId, String), InterfaceId>,
    service_index: HashMap<(InterfaceId, Protocol, u16), ServiceId>,
    warnings: Vec<Warning>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MissingAddressPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn missing_address_policy(&self) -> MissingAddressPolicy {
        self.policy
    }

    /// Look up or create the host for `address`, merging a newly-seen OS
    /// label into a host that had none. A conflicting OS label keeps the
    /// first-seen value and records a discrepancy warning.
    pub fn ensure_host(&mut self, address: &str, os: Option<&str>) -> HostId {
        if let Some(&id) = self.host_index.get(address) {
            let host = &mut self.hosts[id.0];
            match (&host.os, os) {
                (None, Some(new)) => host.os = Some(new.to_string()),
                (Some(kept), Some(new)) if kept != new => {
                    let w = Warning::RegistrarConflict {
                        entity: format!("host {address}"),
                        field: "os".into(),
                        kept: kept.clone(),
                        seen: new.to_string(),
                    };
                    warn!(%w, "registrar conflict");
                    self.warnings.push(w);
                }
                _ => {}
            }
            return id;
        }
        let id = HostId(self.hosts.len());
        debug!(address, ?os, "registered host");
        self.hosts.push(Host {
            id,
            address: address.to_string(),
            os: os.map(str::to_string),
            notes: Vec::new(),
        });
        self.host_index.insert(address.to_string(), id);
        id
    }

    /// Attach a key/value note to a host, skipping exact duplicates.
    pub fn add_host_note(&mut self, host: HostId, key: &str, value: &str) {
        let notes = &mut self.hosts[host.0].notes;
        if !notes.iter().any(|n| n.key == key && n.value == value) {
            notes.push(HostNote {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Look up or create the interface for (host, address), appending any
    /// hostnames not seen before.
    pub fn ensure_interface(
        &mut self,
        host: HostId,
        address: &str,
        hostnames: &[String],
    ) -> InterfaceId {
        let key = (host, address.to_string());
        let id = match self.interface_index.get(&key) {
            Some(&id) => id,
            None => {
                let id = InterfaceId(self.interfaces.len());
                debug!(address, "registered interface");
                self.interfaces.push(Interface {
                    id,
                    host,
                    address: address.to_string(),
                    hostnames: Vec::new(),
                });
                self.interface_index.insert(key, id);
                id
            }
        };
        let iface = &mut self.interfaces[id.0];
        for name in hostnames {
            if !name.is_empty() && !iface.hostnames.iter().any(|h| h == name) {
                iface.hostnames.push(name.clone());
            }
        }
        id
    }

    /// Look up or create the service for (interface, protocol, port).
    ///
    /// A revisit reuses the existing entity; a later resolved name upgrades
    /// an "unknown" one, and a conflicting status keeps first-seen with a
    /// discrepancy warning.
    pub fn ensure_service(
        &mut self,
        host: HostId,
        interface: InterfaceId,
        name: &str,
        protocol: Protocol,
        port: u16,
        status: ServiceStatus,
    ) -> ServiceId {
        let key = (interface, protocol.clone(), port);
        if let Some(&id) = self.service_index.get(&key) {
            let svc = &mut self.services[id.0];
            if svc.name == "unknown" && name != "unknown" && !name.is_empty() {
                svc.name = name.to_string();
            }
            if svc.status != status {
                let w = Warning::RegistrarConflict {
                    entity: format!("service {protocol}/{port}"),
                    field: "status".into(),
                    kept: format!("{:?}", svc.status),
                    seen: format!("{status:?}"),
                };
                warn!(%w, "registrar conflict");
                self.warnings.push(w);
            }
            return id;
        }
        let id = ServiceId(self.services.len());
        debug!(%protocol, port, name, "registered service");
        self.services.push(Service {
            id,
            host,
            interface,
            name: name.to_string(),
            protocol,
            port,
            status,
        });
        self.service_index.insert(key, id);
        id
    }

    /// Register one finding. Never deduplicates: duplicate findings are
    /// preserved for the host application's own policy to deal with.
    pub fn add_vulnerability(&mut self, create: CreateVulnerability) -> VulnId {
        let id = VulnId(self.vulnerabilities.len());
        debug!(name = %create.name, severity = %create.severity, "registered vulnerability");
        self.vulnerabilities.push(Vulnerability {
            id,
            target: create.target,
            name: create.name,
            description: create.description,
            severity: create.severity,
            original_severity: create.original_severity,
            references: create.references,
            resolution: create.resolution,
            class: create.class,
        });
        id
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn vulnerabilities(&self) -> &[Vulnerability] {
        &self.vulnerabilities
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.0]
    }

    pub fn interface(&self, id: InterfaceId) -> &Interface {
        &self.interfaces[id.0]
    }

    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.0]
    }

    /// Discrepancy warnings recorded by upsert merges.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Serialize the full entity set for the host application.
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "hosts": self.hosts,
            "interfaces": self.interfaces,
            "services": self.services,
            "vulnerabilities": self.vulnerabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, VulnClass, VulnTarget};

    fn vuln(target: VulnTarget, name: &str) -> CreateVulnerability {
        CreateVulnerability {
            target,
            name: name.into(),
            description: String::new(),
            severity: Severity::High,
            original_severity: "High".into(),
            references: vec![],
            resolution: String::new(),
            class: VulnClass::Generic,
        }
    }

    #[test]
    fn ensure_host_is_idempotent() {
        let mut reg = EntityRegistry::new();
        let a = reg.ensure_host("10.0.0.1", None);
        let b = reg.ensure_host("10.0.0.1", None);
        assert_eq!(a, b);
        assert_eq!(reg.hosts().len(), 1);
    }

    #[test]
    fn ensure_host_merges_missing_os() {
        let mut reg = EntityRegistry::new();
        let id = reg.ensure_host("10.0.0.1", None);
        reg.ensure_host("10.0.0.1", Some("Linux"));
        assert_eq!(reg.host(id).os.as_deref(), Some("Linux"));
        assert!(reg.warnings().is_empty());
    }

    #[test]
    fn conflicting_os_keeps_first_seen() {
        let mut reg = EntityRegistry::new();
        let id = reg.ensure_host("10.0.0.1", Some("Linux"));
        reg.ensure_host("10.0.0.1", Some("Windows"));
        assert_eq!(reg.host(id).os.as_deref(), Some("Linux"));
        assert_eq!(reg.warnings().len(), 1);
    }

    #[test]
    fn interface_hostnames_append_without_duplicates() {
        let mut reg = EntityRegistry::new();
        let h = reg.ensure_host("10.0.0.1", None);
        let i1 = reg.ensure_interface(h, "10.0.0.1", &["web".into()]);
        let i2 = reg.ensure_interface(h, "10.0.0.1", &["web".into(), "mail".into()]);
        assert_eq!(i1, i2);
        assert_eq!(reg.interface(i1).hostnames, vec!["web", "mail"]);
    }

    #[test]
    fn service_triple_is_reused() {
        let mut reg = EntityRegistry::new();
        let h = reg.ensure_host("10.0.0.1", None);
        let i = reg.ensure_interface(h, "10.0.0.1", &[]);
        let s1 = reg.ensure_service(h, i, "unknown", Protocol::Tcp, 443, ServiceStatus::Open);
        let s2 = reg.ensure_service(h, i, "https", Protocol::Tcp, 443, ServiceStatus::Open);
        assert_eq!(s1, s2);
        assert_eq!(reg.services().len(), 1);
        // resolved name upgrades the "unknown" placeholder
        assert_eq!(reg.service(s1).name, "https");
    }

    #[test]
    fn distinct_protocol_gets_distinct_service() {
        let mut reg = EntityRegistry::new();
        let h = reg.ensure_host("10.0.0.1", None);
        let i = reg.ensure_interface(h, "10.0.0.1", &[]);
        let s1 = reg.ensure_service(h, i, "unknown", Protocol::Tcp, 53, ServiceStatus::Open);
        let s2 = reg.ensure_service(h, i, "unknown", Protocol::Udp, 53, ServiceStatus::Open);
        assert_ne!(s1, s2);
    }

    #[test]
    fn vulnerabilities_are_never_deduplicated() {
        let mut reg = EntityRegistry::new();
        let h = reg.ensure_host("10.0.0.1", None);
        let v1 = reg.add_vulnerability(vuln(VulnTarget::Host(h), "CVE-X"));
        let v2 = reg.add_vulnerability(vuln(VulnTarget::Host(h), "CVE-X"));
        assert_ne!(v1, v2);
        assert_eq!(reg.vulnerabilities().len(), 2);
    }

    #[test]
    fn host_notes_skip_exact_duplicates() {
        let mut reg = EntityRegistry::new();
        let h = reg.ensure_host("10.0.0.1", None);
        reg.add_host_note(h, "netBIOSName", "SRV01");
        reg.add_host_note(h, "netBIOSName", "SRV01");
        reg.add_host_note(h, "netBIOSDomain", "CORP");
        assert_eq!(reg.host(h).notes.len(), 2);
    }

    #[test]
    fn snapshot_lists_all_entity_kinds() {
        let mut reg = EntityRegistry::new();
        let h = reg.ensure_host("10.0.0.1", Some("Linux"));
        reg.add_vulnerability(vuln(VulnTarget::Host(h), "finding"));
        let snap = reg.snapshot();
        assert_eq!(snap["hosts"].as_array().unwrap().len(), 1);
        assert_eq!(snap["vulnerabilities"].as_array().unwrap().len(), 1);
    }
}
