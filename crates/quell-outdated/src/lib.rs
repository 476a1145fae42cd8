//! Outdated-suppression detection and rendering.
//!
//! After a scan (and, for parallel runs, after cross-worker
//! reconciliation) whatever is left in the remaining ledger is a
//! suppression the source code no longer justifies. [`detect`] diffs the
//! remaining ledger against the original snapshot and produces one
//! diagnostic per leftover entry; [`synthetic_findings`] turns those into
//! ordinary finding records on the virtual outdated unit so they travel
//! through the same reporting pipeline as real findings.
//!
//! Two renderings exist: a text report with a gutter, and checkstyle XML
//! for CI consumers.

use serde::{Deserialize, Serialize};

use quell_ledger::{ConsistencyError, Ledger};
use quell_types::{FileFindings, Finding, SEVERITY_INFO};

/// Column the text rendering wraps diagnostics at.
const WRAP_WIDTH: usize = 70;

/// One stale suppression: where it was declared and the human-readable
/// explanation of how it fell short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedDiagnostic {
    pub path: String,
    pub rule: String,
    pub message: String,
}

/// Diff the remaining ledger against the original snapshot.
///
/// Every entry still present in `remaining` yields one diagnostic: either
/// it never matched at all, or it matched fewer times than configured.
/// Diagnostics come out sorted by path, rule, then message.
///
/// # Errors
///
/// A remaining entry the original snapshot does not cover (missing key, or
/// a remaining count above the seeded one) violates the registry's
/// invariants and is a fatal [`ConsistencyError`].
pub fn detect(
    original: &Ledger,
    remaining: &Ledger,
) -> Result<Vec<OutdatedDiagnostic>, ConsistencyError> {
    let mut diagnostics = Vec::new();
    for (path, rule, message, left) in remaining.entries() {
        let expected = original.get(path, rule, message);
        let Some(expected) = expected.filter(|&expected| left <= expected) else {
            return Err(ConsistencyError {
                path: path.to_string(),
                rule: rule.to_string(),
                message: message.to_string(),
            });
        };

        diagnostics.push(OutdatedDiagnostic {
            path: path.to_string(),
            rule: rule.to_string(),
            message: format_outdated_message(expected - left, expected, rule, message),
        });
    }
    Ok(diagnostics)
}

/// The exact diagnostic wording for one stale entry.
///
/// `occurred` is how many times the suppression actually matched,
/// `expected` the configured count.
#[must_use]
pub fn format_outdated_message(occurred: u32, expected: u32, rule: &str, message: &str) -> String {
    if occurred == 0 {
        format!("Suppression for rule '{rule}' with message '{message}' was not matched in any report.")
    } else {
        let times = if occurred == 1 {
            "1 time".to_string()
        } else {
            format!("{occurred} times")
        };
        format!(
            "Suppression for rule '{rule}' with message '{message}' is expected to occur \
             {expected} times, but occurred only {times}."
        )
    }
}

/// Pack diagnostics into synthetic findings at line 1, column 1 of the
/// virtual outdated unit: severity 0, never fixable.
#[must_use]
pub fn synthetic_findings(diagnostics: &[OutdatedDiagnostic]) -> FileFindings {
    let mut file = FileFindings::default();
    if diagnostics.is_empty() {
        return file;
    }
    let findings: Vec<Finding> = diagnostics
        .iter()
        .map(|diagnostic| Finding {
            source: diagnostic.rule.clone(),
            message: diagnostic.message.clone(),
            severity: SEVERITY_INFO,
            fixable: false,
        })
        .collect();
    file.findings.entry(1).or_default().insert(1, findings);
    file
}

/// Text report: per affected path a `FILE:` header, then each diagnostic
/// wrapped inside an `OUTDATED |` gutter. Paths under `base` (the
/// invocation's working directory) display relative.
#[must_use]
pub fn render_text(diagnostics: &[OutdatedDiagnostic], base: &str) -> String {
    let separator = "-".repeat(WRAP_WIDTH);
    let mut out = String::new();
    let mut current_path: Option<&str> = None;

    for diagnostic in diagnostics {
        if current_path != Some(diagnostic.path.as_str()) {
            if current_path.is_some() {
                out.push_str(&separator);
                out.push_str("\n\n");
            }
            let display = quell_path::relative_to(&diagnostic.path, base)
                .unwrap_or_else(|| diagnostic.path.clone());
            out.push_str("FILE: ");
            out.push_str(&display);
            out.push('\n');
            current_path = Some(diagnostic.path.as_str());
        }
        out.push_str(&separator);
        out.push('\n');

        let text = format!("{} ({})", diagnostic.message, diagnostic.rule);
        for (i, line) in wrap(&text, WRAP_WIDTH).iter().enumerate() {
            if i == 0 {
                out.push_str(" OUTDATED | ");
            } else {
                out.push_str("          | ");
            }
            out.push_str(line);
            out.push('\n');
        }
    }

    if current_path.is_some() {
        out.push_str(&separator);
        out.push('\n');
    }
    out
}

/// Checkstyle XML: one `<file>` per path, one `<error>` per diagnostic at
/// line 0, column 0.
#[must_use]
pub fn render_checkstyle(diagnostics: &[OutdatedDiagnostic]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<checkstyle version=\"1.0\">\n");

    let mut current_path: Option<&str> = None;
    for diagnostic in diagnostics {
        if current_path != Some(diagnostic.path.as_str()) {
            if current_path.is_some() {
                out.push_str("</file>\n");
            }
            out.push_str(&format!("<file name=\"{}\">\n", xml_escape(&diagnostic.path)));
            current_path = Some(diagnostic.path.as_str());
        }
        out.push_str(&format!(
            " <error line=\"0\" column=\"0\" severity=\"error\" message=\"{}\" source=\"{}\"/>\n",
            xml_escape(&diagnostic.message),
            xml_escape(&diagnostic.rule),
        ));
    }
    if current_path.is_some() {
        out.push_str("</file>\n");
    }

    out.push_str("</checkstyle>\n");
    out
}

/// Greedy word wrap; a single word longer than `width` stays on its own
/// line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
