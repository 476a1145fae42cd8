//! Findings-report ingestion and suppression filtering.
//!
//! The engine hands over findings grouped per file, keyed by line then
//! column. [`filter_file`] walks one file in that order and asks the
//! registry about every finding; consumed findings are dropped from the
//! surviving set and tallied, everything else passes through untouched.
//! Locations whose findings were all consumed disappear entirely, so a
//! fully suppressed file filters down to an empty [`FileFindings`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quell_ledger::{Registry, View};
use quell_types::{FileFindings, Finding, FindingsReport};

/// Errors from findings-report ingestion.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read findings report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse findings report JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a findings report from a JSON string.
pub fn report_from_str(s: &str) -> Result<FindingsReport, ReportError> {
    Ok(serde_json::from_str(s)?)
}

/// Load a findings report from a JSON file.
pub fn report_from_file(path: &Path) -> Result<FindingsReport, ReportError> {
    let content = std::fs::read_to_string(path)?;
    report_from_str(&content)
}

/// Rewrite every file key into its canonical absolute form, resolving
/// relative engine paths against `base` (the invocation's working
/// directory). Config-declared paths go through the same normalization, so
/// the two meet in one spelling.
pub fn normalize_paths(report: &mut FindingsReport, base: &str) {
    let files = std::mem::take(&mut report.files);
    report.files = files
        .into_iter()
        .map(|(path, file)| (quell_path::resolve(base, &path), file))
        .collect();
}

/// One file after suppression filtering: the findings that survived plus
/// the counts of what was ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredFile {
    pub findings: FileFindings,
    pub ignored_count: u32,
    pub ignored_fixable_count: u32,
}

impl FilteredFile {
    /// Number of findings that survived filtering.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.findings.finding_count()
    }

    /// Number of surviving findings the engine marked fixable.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.findings.fixable_count()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Filter one file's findings through the registry, in ascending
/// line/column order.
pub fn filter_file(
    registry: &mut Registry,
    view: View,
    path: &str,
    file: &FileFindings,
) -> FilteredFile {
    let mut surviving: BTreeMap<u32, BTreeMap<u32, Vec<Finding>>> = BTreeMap::new();
    let mut ignored_count = 0u32;
    let mut ignored_fixable_count = 0u32;

    for (&line, columns) in &file.findings {
        for (&column, findings) in columns {
            let mut kept = Vec::new();
            for finding in findings {
                if registry.consume(view, path, &finding.source, &finding.message) {
                    ignored_count += 1;
                    if finding.fixable {
                        ignored_fixable_count += 1;
                    }
                    continue;
                }
                kept.push(finding.clone());
            }
            if !kept.is_empty() {
                surviving.entry(line).or_default().insert(column, kept);
            }
        }
    }

    FilteredFile {
        findings: FileFindings {
            findings: surviving,
        },
        ignored_count,
        ignored_fixable_count,
    }
}

/// Filter a whole report. Files are visited in sorted path order, which is
/// also the order a sequential scan processes them.
pub fn filter_report(
    registry: &mut Registry,
    view: View,
    report: &FindingsReport,
) -> BTreeMap<String, FilteredFile> {
    report
        .files
        .iter()
        .map(|(path, file)| (path.clone(), filter_file(registry, view, path, file)))
        .collect()
}
