//! Shared field-normalization helpers.
//!
//! Scanner formats are inconsistent about absence: fields go missing, show
//! up empty, or hold sentinel tokens like "N/A". Everything funnels through
//! these helpers so that absent values reach the entity model as absent,
//! never as literal sentinel text.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Protocol;

/// Sentinel tokens Retina uses for "value absent".
pub const RETINA_SENTINELS: &[&str] = &["N/A", "unknown"];

/// Return `Some` only for a non-empty trimmed value.
pub fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Resolve an optional source field: trims, and treats empty values and the
/// given sentinel tokens as absent.
pub fn sanitize<'a>(value: Option<&'a str>, sentinels: &[&str]) -> Option<&'a str> {
    value
        .and_then(non_empty)
        .filter(|v| !sentinels.contains(v))
}

/// Split a comma-delimited reference field into a deduplicated,
/// order-preserving list. Absent or sentinel input yields an empty list.
pub fn split_references(value: Option<&str>, sentinels: &[&str]) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    if let Some(raw) = sanitize(value, sentinels) {
        for part in raw.split(',') {
            if let Some(r) = sanitize(Some(part), sentinels) {
                if !refs.iter().any(|seen| seen == r) {
                    refs.push(r.to_string());
                }
            }
        }
    }
    refs
}

/// Decompose a combined "PROTOCOL:port" token.
///
/// Succeeds only when the protocol half is a recognized transport name and
/// the port parses; anything else means the finding carries no usable port
/// context and stays host-level.
pub fn split_endpoint(token: &str) -> Option<(Protocol, u16)> {
    let (proto, port) = token.split_once(':')?;
    let protocol = Protocol::from_transport(proto)?;
    let port = port.trim().parse::<u16>().ok()?;
    Some((protocol, port))
}

/// Heuristic web classification: standard HTTP/HTTPS ports, or a finding
/// name from the ssl/http families.
pub fn is_web_service(port: u16, name: &str) -> bool {
    static WEB_NAME: OnceLock<Regex> = OnceLock::new();
    let re = WEB_NAME.get_or_init(|| Regex::new(r"(?i)ssl|http").expect("hardcoded pattern"));
    matches!(port, 80 | 443) || re.is_match(name)
}
