//! Scanner-report normalization core.
//!
//! Takes raw scanner output (one report per in-memory buffer) and normalizes
//! it into a canonical entity model: hosts, interfaces, services, and
//! vulnerabilities with severity and remediation metadata. Each supported
//! format ships a [`parsers::ReportParser`] that parses the document, walks
//! its records, maps format-specific vocabulary onto the shared model, and
//! registers entities through an [`registry::EntityRegistry`] scoped to that
//! one report.
//!
//! The host application owns parser selection (via each parser's identity
//! metadata), persistence, and any further deduplication of findings; none
//! of that lives here.

pub mod errors;
pub mod models;
pub mod parsers;
pub mod registry;
