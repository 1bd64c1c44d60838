//! Report parsers normalizing scanner output into the canonical model.
//!
//! Each format implements the [`ReportParser`] trait: it parses the raw
//! document, walks its records, maps format-specific vocabulary through the
//! shared helpers in [`fields`], and registers entities on the
//! [`EntityRegistry`] handed to it. Parsers declare their own identity
//! metadata (id, name, versions, command-recognition pattern) for the host
//! application's dispatch; dispatch itself lives outside this crate.

pub mod fields;
pub mod junit;
pub mod retina;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::errors::Warning;
use crate::models::Severity;
use crate::registry::EntityRegistry;

/// Summary of one report run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub parser: String,
    /// Records yielded by extraction, including dropped ones.
    pub records: usize,
    /// Records dropped for missing identity fields.
    pub dropped: usize,
    pub warnings: Vec<Warning>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Trait for pluggable report-format parsers.
pub trait ReportParser: Send + Sync {
    /// Stable plugin identifier.
    fn id(&self) -> &str;

    /// Human-readable plugin name.
    fn name(&self) -> &str;

    /// Version of this parser.
    fn plugin_version(&self) -> &str;

    /// Version of the scanner family this parser understands, when pinned.
    fn version(&self) -> &str {
        ""
    }

    /// Command-recognition pattern the host uses to pick this parser for a
    /// given invocation, when the format is produced by a known command.
    fn command_regex(&self) -> Option<&Regex> {
        None
    }

    /// Whether this parser recognizes the given command line.
    fn handles_command(&self, command_line: &str) -> bool {
        self.command_regex()
            .is_some_and(|re| re.is_match(command_line))
    }

    /// Map a tool-specific severity label to the canonical set. Total:
    /// unrecognized labels land in the parser's documented fallback bucket.
    fn map_severity(&self, label: &str) -> Severity;

    /// Process one report buffer, registering every extracted entity.
    ///
    /// Malformed documents are recovered: the run completes with zero
    /// entities and a [`Warning::ParseFailure`]. `Err` is reserved for
    /// input this parser does not handle at all.
    fn run(
        &self,
        data: &[u8],
        registry: &mut EntityRegistry,
    ) -> Result<RunReport, anyhow::Error>;
}

/// Decode the report buffer as UTF-8, recovering non-text input as a
/// parse failure rather than an error.
pub(crate) fn decode_utf8<'a>(data: &'a [u8], warnings: &mut Vec<Warning>) -> Option<&'a str> {
    match std::str::from_utf8(data) {
        Ok(text) => Some(text),
        Err(err) => {
            let w = Warning::ParseFailure {
                detail: format!("report is not valid UTF-8: {err}"),
            };
            warn!(%w, "unreadable report");
            warnings.push(w);
            None
        }
    }
}
