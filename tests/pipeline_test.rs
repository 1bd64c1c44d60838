//! End-to-end pipeline tests: raw report buffers in, canonical entity
//! registries out. Fixtures under `tests/fixtures/` mirror real scanner
//! output shapes.

use scanfuse::models::{Protocol, Severity, VulnClass, VulnTarget};
use scanfuse::parsers::junit::JunitParser;
use scanfuse::parsers::retina::RetinaParser;
use scanfuse::parsers::ReportParser;
use scanfuse::registry::EntityRegistry;

const JUNIT_REPORT: &[u8] = include_bytes!("fixtures/junit_report.xml");
const RETINA_REPORT: &[u8] = include_bytes!("fixtures/retina_report.xml");

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn junit_report_normalizes_to_host_level_findings() {
    init_tracing();
    let mut reg = EntityRegistry::new();
    let report = JunitParser::new().run(JUNIT_REPORT, &mut reg).unwrap();

    // three failures across two suites; the passing testcase yields nothing
    assert_eq!(report.records, 3);
    assert_eq!(report.dropped, 0);
    assert!(report.warnings.is_empty());

    // 192.168.1.1 appears in both suites but registers once
    assert_eq!(reg.hosts().len(), 2);
    assert!(reg.hosts().iter().all(|h| h.os.as_deref() == Some("Linux")));

    assert_eq!(reg.vulnerabilities().len(), 3);
    assert!(reg
        .vulnerabilities()
        .iter()
        .all(|v| v.severity == Severity::High
            && matches!(v.target, VulnTarget::Host(_))
            && v.class == VulnClass::Generic));

    let names: Vec<&str> = reg
        .vulnerabilities()
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert!(names.contains(&"PasswordQualityRequirements"));
}

#[test]
fn retina_report_normalizes_hosts_services_and_web_findings() {
    init_tracing();
    let mut reg = EntityRegistry::new();
    let report = RetinaParser::new().run(RETINA_REPORT, &mut reg).unwrap();

    assert_eq!(report.records, 5);
    assert_eq!(report.dropped, 0);

    assert_eq!(reg.hosts().len(), 2);
    let web01 = &reg.hosts()[0];
    assert_eq!(web01.address, "172.16.0.10");
    assert_eq!(web01.os.as_deref(), Some("Windows Server 2016"));
    assert_eq!(web01.notes.len(), 2);

    // 443 is shared by two findings, 445 and 22 get their own services;
    // the ICMP context is not a recognized transport, so no fourth service
    assert_eq!(reg.services().len(), 3);
    assert!(reg
        .services()
        .iter()
        .any(|s| s.protocol == Protocol::Tcp && s.port == 445));

    assert_eq!(reg.vulnerabilities().len(), 5);

    let web_vulns: Vec<_> = reg
        .vulnerabilities()
        .iter()
        .filter(|v| matches!(v.class, VulnClass::Web { .. }))
        .collect();
    // both 443 findings classify as web, bound to the shared service
    assert_eq!(web_vulns.len(), 2);
    assert!(web_vulns.iter().all(|v| v.class
        == VulnClass::Web {
            website: Some("web01.corp.example".into())
        }));

    // ICMP audit attaches to the host, not a service
    let icmp = reg
        .vulnerabilities()
        .iter()
        .find(|v| v.name.starts_with("ICMP"))
        .unwrap();
    assert!(matches!(icmp.target, VulnTarget::Host(_)));
    assert_eq!(icmp.severity, Severity::Info);
    assert_eq!(icmp.references, vec!["CVE-1999-0524"]);

    // sentinel dnsName on the second host falls back to its ip
    let second_iface = reg
        .interfaces()
        .iter()
        .find(|i| i.address == "172.16.0.22")
        .unwrap();
    assert_eq!(second_iface.hostnames, vec!["172.16.0.22"]);
}

#[test]
fn reruns_on_identical_input_are_deterministic() {
    init_tracing();
    for report in [JUNIT_REPORT, RETINA_REPORT] {
        let mut first = EntityRegistry::new();
        let mut second = EntityRegistry::new();
        if report == JUNIT_REPORT {
            JunitParser::new().run(report, &mut first).unwrap();
            JunitParser::new().run(report, &mut second).unwrap();
        } else {
            RetinaParser::new().run(report, &mut first).unwrap();
            RetinaParser::new().run(report, &mut second).unwrap();
        }
        assert_eq!(first.snapshot(), second.snapshot());
    }
}

#[test]
fn parser_identity_metadata_is_exposed() {
    let retina = RetinaParser::new();
    assert_eq!(retina.id(), "retina");
    assert_eq!(retina.name(), "Retina XML Output Plugin");
    assert_eq!(retina.plugin_version(), "0.0.1");
    assert!(retina.version().starts_with("Retina Network"));
    assert!(retina.handles_command("sudo retina --full-audit"));

    let junit = JunitParser::new();
    assert_eq!(junit.id(), "junit");
    assert!(junit.version().is_empty());
    assert!(junit.command_regex().is_none());
}

#[test]
fn severity_mapping_is_total_for_every_parser() {
    let parsers: Vec<Box<dyn ReportParser>> =
        vec![Box::new(JunitParser::new()), Box::new(RetinaParser::new())];
    for parser in &parsers {
        for label in ["Critical", "High", "Medium", "Low", "Information", "garbage", ""] {
            // must always land in a canonical bucket, never panic
            let _ = parser.map_severity(label);
        }
    }
}

#[test]
fn empty_report_body_yields_empty_entity_set() {
    let mut reg = EntityRegistry::new();
    let report = RetinaParser::new()
        .run(b"<scanJob><hosts/></scanJob>", &mut reg)
        .unwrap();
    assert_eq!(report.records, 0);
    assert!(report.warnings.is_empty());
    assert!(reg.hosts().is_empty());
    assert!(reg.vulnerabilities().is_empty());
}
