//! Warning taxonomy for report processing.
//!
//! Everything that can go wrong inside one report is recoverable: it is
//! recorded as a [`Warning`], logged, and processing of sibling records
//! continues. A whole-buffer parse failure simply yields an empty entity
//! set plus its warning. Nothing in the pipeline panics or aborts on
//! malformed input.

use serde::Serialize;

/// A recoverable condition encountered while processing one report.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The document was not well-formed; the report produced zero entities.
    #[error("document parse failure: {detail}")]
    ParseFailure { detail: String },

    /// A record lacked a field the identity model requires and was dropped.
    #[error("record {record} dropped: missing required field {field}")]
    MissingRequiredField { record: usize, field: String },

    /// A severity label matched no canonical bucket; the documented
    /// fallback was applied.
    #[error("unrecognized severity label {label:?}, defaulted to Info")]
    UnrecognizedSeverity { label: String },

    /// An upsert saw a value conflicting with an already-registered
    /// immutable field; the first-seen value was kept.
    #[error("{entity}.{field}: kept first-seen {kept:?}, ignoring {seen:?}")]
    RegistrarConflict {
        entity: String,
        field: String,
        kept: String,
        seen: String,
    },
}
