//! # quell-types
//!
//! Core data structures and serde contracts for `quell`.
//!
//! ## What belongs here
//! * Pure data structs (findings, reports, suppression entries)
//! * Serialization/Deserialization definitions
//! * Shared constants (virtual path, severities)
//!
//! ## What does NOT belong here
//! * File I/O
//! * Suppression matching or ledger mutation
//! * CLI argument parsing
//!
//! Findings are keyed by line, then column, in ordered maps. Every consumer
//! that walks a file's findings therefore sees them in ascending
//! line/column order, which is what makes counted suppressions consume
//! deterministically ("first N occurrences in document order").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display path of the virtual unit of work that carries outdated
/// suppression diagnostics. Not a real file; it is always scheduled last.
pub const OUTDATED_VIRTUAL_PATH: &str = "OUTDATED SUPPRESSIONS";

/// Severity used for informational, non-blocking diagnostics.
pub const SEVERITY_INFO: u8 = 0;

/// One finding reported by the linting engine at a specific location.
///
/// Unknown fields from richer engines are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier, e.g. `style.line_length`.
    pub source: String,
    /// Message text with positional parameters already substituted.
    pub message: String,
    /// Engine severity; `0` is informational.
    #[serde(default)]
    pub severity: u8,
    /// Whether the engine could fix this finding automatically.
    #[serde(default)]
    pub fixable: bool,
}

/// All findings for one file: line -> column -> findings at that location.
///
/// Multiple findings may share a location, hence the `Vec` leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFindings {
    #[serde(default)]
    pub findings: BTreeMap<u32, BTreeMap<u32, Vec<Finding>>>,
}

impl FileFindings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Total number of findings across all locations.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.findings
            .values()
            .flat_map(|cols| cols.values())
            .map(Vec::len)
            .sum()
    }

    /// Number of findings the engine marked as fixable.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.findings
            .values()
            .flat_map(|cols| cols.values())
            .flatten()
            .filter(|f| f.fixable)
            .count()
    }
}

/// A findings report handed over by the engine, keyed by file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsReport {
    #[serde(default)]
    pub files: BTreeMap<String, FileFindings>,
}

/// One suppression definition: the exact `(path, rule, message)` key plus
/// how many occurrences it is allowed to absorb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionEntry {
    pub path: String,
    /// Rule identifier. `sniff` is accepted as a legacy alias.
    #[serde(alias = "sniff")]
    pub rule: String,
    pub message: String,
    pub count: u32,
}
