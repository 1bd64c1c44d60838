//! JUnit XML report parser.
//!
//! Security-compliance suites (CIS benchmarks, product hardening checks)
//! emit JUnit XML where each `<failure>` is one failed verification against
//! one host, named by a `host` attribute on the enclosing `<testcase>`.
//! Every failure becomes a host-level vulnerability: name from the test
//! suite, description from the failure message, severity High (the format
//! carries no severity vocabulary of its own).
//!
//! Both a bare `<testsuite>` root and a `<testsuites>` wrapper are accepted.

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::errors::Warning;
use crate::models::{CreateVulnerability, Severity, VulnClass, VulnTarget};
use crate::parsers::{decode_utf8, ReportParser, RunReport};
use crate::registry::{EntityRegistry, MissingAddressPolicy};

/// Parser for JUnit XML compliance output.
#[derive(Debug, Default)]
pub struct JunitParser;

impl JunitParser {
    pub fn new() -> Self {
        Self
    }
}

impl ReportParser for JunitParser {
    fn id(&self) -> &str {
        "junit"
    }

    fn name(&self) -> &str {
        "JUnit XML Output Plugin"
    }

    fn plugin_version(&self) -> &str {
        "0.0.1"
    }

    fn map_severity(&self, label: &str) -> Severity {
        // the format has no severity field; a failed security check is High
        Severity::from_label(label).unwrap_or(Severity::High)
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
            match quick_xml::de::from_str::<JunitDocument>(text) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    let w = Warning::ParseFailure {
                        detail: format!("malformed JUnit XML: {err}"),
                    };
                    warn!(%w, "report skipped");
                    warnings.push(w);
                    None
                }
            }
        });

        for record in doc.iter().flat_map(|d| d.records()) {
            records += 1;
            let address = match record.host {
                Some(host) => host,
                None => match registry.missing_address_policy() {
                    MissingAddressPolicy::Placeholder => {
                        warn!(record = records - 1, "testcase missing host attribute, using placeholder address");
                        ""
                    }
                    MissingAddressPolicy::Drop => {
                        dropped += 1;
                        warnings.push(Warning::MissingRequiredField {
                            record: records - 1,
                            field: "host".into(),
                        });
                        continue;
                    }
                },
            };

            let host = registry.ensure_host(address, Some("Linux"));
            registry.ensure_interface(host, address, &[]);
            registry.add_vulnerability(CreateVulnerability {
                target: VulnTarget::Host(host),
                name: record.suite.unwrap_or_default().to_string(),
                description: record.message.unwrap_or_default().to_string(),
                severity: self.map_severity("High"),
                original_severity: "High".into(),
                references: Vec::new(),
                resolution: String::new(),
                class: VulnClass::Generic,
            });
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

// -- JUnit document shape (subset) --

/// Root of a JUnit report. Covers both shapes: a bare `<testsuite>` root
/// (attributes and testcases directly on the root) and a `<testsuites>`
/// wrapper holding nested `<testsuite>` elements.
#[derive(Debug, Deserialize)]
struct JunitDocument {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(default, rename = "testcase")]
    testcases: Vec<TestCase>,
    #[serde(default, rename = "testsuite")]
    suites: Vec<TestSuite>,
}

#[derive(Debug, Deserialize)]
struct TestSuite {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(default, rename = "testcase")]
    testcases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct TestCase {
    #[serde(rename = "@host")]
    host: Option<String>,
    #[serde(default, rename = "failure")]
    failures: Vec<Failure>,
}

#[derive(Debug, Deserialize)]
struct Failure {
    #[serde(rename = "@message")]
    message: Option<String>,
}

/// One extracted failure record with its surrounding context.
#[derive(Debug)]
struct FailureRecord<'a> {
    suite: Option<&'a str>,
    host: Option<&'a str>,
    message: Option<&'a str>,
}

#[derive(Clone, Copy)]
struct SuiteView<'a> {
    name: Option<&'a str>,
    testcases: &'a [TestCase],
}

impl JunitDocument {
    /// Every `<failure>` under `testsuite/testcase`, one record each,
    /// in document order.
    fn records(&self) -> impl Iterator<Item = FailureRecord<'_>> {
        let root = SuiteView {
            name: self.name.as_deref(),
            testcases: &self.testcases,
        };
        std::iter::once(root)
            .chain(self.suites.iter().map(|s| SuiteView {
                name: s.name.as_deref(),
                testcases: &s.testcases,
            }))
            .flat_map(|suite| {
                suite.testcases.iter().flat_map(move |tc| {
                    tc.failures.iter().map(move |f| FailureRecord {
                        suite: suite.name,
                        host: tc.host.as_deref(),
                        message: f.message.as_deref(),
                    })
                })
            })
    }
}
