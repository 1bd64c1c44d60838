//! Canonical ordered severity shared across all report formats.

use serde::{Deserialize, Serialize};

/// Normalized severity level, ordered Info < Low < Medium < High < Critical.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Map a free-text severity label onto the canonical set.
    ///
    /// Recognizes the vocabulary the supported scanner families emit
    /// (Retina risk labels, SonarQube-style labels, plain names). Returns
    /// `None` for anything else; callers apply their documented fallback so
    /// that mapping stays total at the parser level.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "info" | "information" | "informational" | "none" => Some(Self::Info),
            "low" | "minor" => Some(Self::Low),
            "medium" | "moderate" | "major" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "blocker" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
