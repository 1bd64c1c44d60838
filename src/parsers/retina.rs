//! Retina network-scanner XML report parser.
//!
//! Walks every `<audit>` under `hosts/host`. Host metadata (dnsName,
//! netBIOS name/domain, os) uses Retina's "N/A"/"unknown" sentinels for
//! absence; audits carry a combined `<context>` token ("TCP:445") that only
//! yields a service when the protocol half is a recognized transport.
//! Audits without usable port context attach to the host. Findings on
//! HTTP/HTTPS ports, or with ssl/http-family names, are routed to the web
//! vulnerability subtype.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::errors::Warning;
use crate::models::{CreateVulnerability, Severity, ServiceStatus, VulnClass, VulnTarget};
use crate::parsers::fields::{
    is_web_service, non_empty, sanitize, split_endpoint, split_references, RETINA_SENTINELS,
};
use crate::parsers::{decode_utf8, ReportParser, RunReport};
use crate::registry::EntityRegistry;

/// Parser for Retina Network Security Scanner XML output.
#[derive(Debug, Default)]
pub struct RetinaParser;

impl RetinaParser {
    pub fn new() -> Self {
        Self
    }
}

impl ReportParser for RetinaParser {
    fn id(&self) -> &str {
        "retina"
    }

    fn name(&self) -> &str {
        "Retina XML Output Plugin"
    }

    fn plugin_version(&self) -> &str {
        "0.0.1"
    }

    fn version(&self) -> &str {
        "Retina Network 5.19.2.2718"
    }

    fn command_regex(&self) -> Option<&Regex> {
        static RE: OnceLock<Regex> = OnceLock::new();
        Some(RE.get_or_init(|| {
            Regex::new(r"^(sudo retina|\./retina)").expect("hardcoded pattern")
        }))
    }

    fn map_severity(&self, label: &str) -> Severity {
        Severity::from_label(label).unwrap_or(Severity::Info)
    }

    fn run(
        &self,
        data: &[u8],
        registry: &mut EntityRegistry,
    ) -> Result<RunReport, anyhow::Error> {
        let started_at = Utc::now();
        let mut warnings = Vec::new();
        let mut records = 0;
        let mut dropped = 0;

        let doc = decode_utf8(data, &mut warnings).and_then(|text| {
            match quick_xml::de::from_str::<RetinaDocument>(text) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    let w = Warning::ParseFailure {
                        detail: format!("malformed Retina XML: {err}"),
                    };
                    warn!(%w, "report skipped");
                    warnings.push(w);
                    None
                }
            }
        });

        let host_nodes = doc
            .as_ref()
            .and_then(|d| d.hosts.as_ref())
            .map(|h| h.hosts.as_slice())
            .unwrap_or_default();

        for (host_idx, node) in host_nodes.iter().enumerate() {
            records += node.audits.len();

            let Some(ip) = sanitize(node.ip.as_deref(), RETINA_SENTINELS) else {
                dropped += node.audits.len();
                warnings.push(Warning::MissingRequiredField {
                    record: host_idx,
                    field: "ip".into(),
                });
                warn!(record = host_idx, "host record without ip dropped");
                continue;
            };

            let os = sanitize(node.os.as_deref(), RETINA_SENTINELS);
            let host = registry.ensure_host(ip, os);

            let dns = sanitize(node.dns_name.as_deref(), RETINA_SENTINELS);
            let hostname = dns.unwrap_or(ip).to_string();
            let interface = registry.ensure_interface(host, ip, &[hostname.clone()]);

            if let Some(name) = sanitize(node.netbios_name.as_deref(), RETINA_SENTINELS) {
                registry.add_host_note(host, "netBIOSName", name);
            }
            if let Some(domain) = sanitize(node.netbios_domain.as_deref(), RETINA_SENTINELS) {
                registry.add_host_note(host, "netBIOSDomain", domain);
            }

            for audit in &node.audits {
                let name = audit.name.as_deref().and_then(non_empty).unwrap_or_default();
                let label = sanitize(audit.risk.as_deref(), RETINA_SENTINELS);
                let severity = match label {
                    Some(label) => match Severity::from_label(label) {
                        Some(severity) => severity,
                        None => {
                            let w = Warning::UnrecognizedSeverity {
                                label: label.to_string(),
                            };
                            warn!(%w, "severity defaulted");
                            warnings.push(w);
                            self.map_severity(label)
                        }
                    },
                    None => self.map_severity(""),
                };

                let create = CreateVulnerability {
                    target: VulnTarget::Host(host),
                    name: name.to_string(),
                    description: audit.compose_description(),
                    severity,
                    original_severity: label.unwrap_or_default().to_string(),
                    references: split_references(audit.cve.as_deref(), RETINA_SENTINELS),
                    resolution: audit
                        .fix_information
                        .as_deref()
                        .and_then(non_empty)
                        .unwrap_or_default()
                        .to_string(),
                    class: VulnClass::Generic,
                };

                let endpoint = audit
                    .context
                    .as_deref()
                    .and_then(non_empty)
                    .and_then(split_endpoint);

                match endpoint {
                    Some((protocol, port)) => {
                        let service = registry.ensure_service(
                            host,
                            interface,
                            "unknown",
                            protocol,
                            port,
                            ServiceStatus::Open,
                        );
                        let class = if is_web_service(port, name) {
                            VulnClass::Web {
                                website: Some(hostname.clone()),
                            }
                        } else {
                            VulnClass::Generic
                        };
                        registry.add_vulnerability(CreateVulnerability {
                            target: VulnTarget::Service(service),
                            class,
                            ..create
                        });
                    }
                    None => {
                        registry.add_vulnerability(create);
                    }
                }
            }
        }

        Ok(RunReport {
            parser: self.id().to_string(),
            records,
            dropped,
            warnings,
            started_at,
            completed_at: Utc::now(),
        })
    }
}

// -- Retina document shape (subset) --

#[derive(Debug, Deserialize)]
struct RetinaDocument {
    hosts: Option<HostsNode>,
}

#[derive(Debug, Deserialize)]
struct HostsNode {
    #[serde(default, rename = "host")]
    hosts: Vec<HostNode>,
}

#[derive(Debug, Deserialize)]
struct HostNode {
    ip: Option<String>,
    #[serde(rename = "dnsName")]
    dns_name: Option<String>,
    #[serde(rename = "netBIOSName")]
    netbios_name: Option<String>,
    #[serde(rename = "netBIOSDomain")]
    netbios_domain: Option<String>,
    os: Option<String>,
    #[serde(default, rename = "audit")]
    audits: Vec<AuditNode>,
}

#[derive(Debug, Deserialize)]
struct AuditNode {
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "fixInformation")]
    fix_information: Option<String>,
    risk: Option<String>,
    cve: Option<String>,
    #[serde(rename = "cvssScore")]
    cvss_score: Option<String>,
    exploit: Option<String>,
    context: Option<String>,
}

impl AuditNode {
    /// Synthesize the finding description from the audit's fragments, in a
    /// fixed section order so the result is stable and diffable:
    /// description, Exploit, cvssScore, Context.
    fn compose_description(&self) -> String {
        let mut desc = self
            .description
            .as_deref()
            .and_then(non_empty)
            .unwrap_or_default()
            .to_string();
        for (label, value) in [
            ("Exploit", &self.exploit),
            ("cvssScore", &self.cvss_score),
            ("Context", &self.context),
        ] {
            if let Some(value) = value.as_deref().and_then(non_empty) {
                desc.push('\n');
                desc.push_str(label);
                desc.push_str(": ");
                desc.push_str(value);
            }
        }
        desc
    }
}
