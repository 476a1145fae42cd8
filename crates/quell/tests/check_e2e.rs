//! End-to-end tests for the `quell check` CLI command.

mod common;

use common::{CONFIG_FULL, REPORT, quell, write_config, write_report};
use predicates::prelude::*;

// ── exit codes ──────────────────────────────────────────────────────

#[test]
fn fully_suppressed_report_is_clean() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(tmp.path(), CONFIG_FULL);

    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 findings (0 fixable), 2 suppressed"));
}

#[test]
fn surviving_findings_exit_one() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());

    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FILE: src/lib.rs"))
        .stdout(predicate::str::contains("3:1  [style.line_length]"))
        .stdout(predicate::str::contains("2 findings (1 fixable), 0 suppressed"));
}

#[test]
fn fix_run_with_surviving_fixables_exits_two() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());

    quell(tmp.path())
        .args(["check", "--report", "report.json", "--fix"])
        .assert()
        .code(2);
}

#[test]
fn outdated_suppression_exits_three() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.gone"
message = "No longer reported"
count = 1
"#,
    );

    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("was not matched in any report."))
        .stdout(predicate::str::contains("OUTDATED |"));
}

#[test]
fn outdated_beats_fixable_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.gone"
message = "No longer reported"
count = 1
"#,
    );

    quell(tmp.path())
        .args(["check", "--report", "report.json", "--fix"])
        .assert()
        .code(3);
}

// ── outdated scenarios ──────────────────────────────────────────────

#[test]
fn partially_matched_count_reports_shortfall() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    // style.tabs occurs once, suppression expects two
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.tabs"
message = "Tab found"
count = 2
"#,
    );

    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .code(3)
        // fragments chosen to sit inside one gutter line of the wrapped
        // diagnostic
        .stdout(predicate::str::contains("is expected"))
        .stdout(predicate::str::contains("occurred only 1 time."));
}

#[test]
fn no_outdated_flag_reflects_findings_only() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.gone"
message = "No longer reported"
count = 1
"#,
    );

    quell(tmp.path())
        .args(["check", "--report", "report.json", "--no-outdated"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("was not matched").not());
}

#[test]
fn count_one_lets_second_occurrence_surface() {
    let tmp = tempfile::tempdir().unwrap();
    common::write_report_named(
        tmp.path(),
        "report.json",
        r#"
{
  "files": {
    "src/lib.rs": {
      "findings": {
        "2": { "5": [ { "source": "style.tabs", "message": "Tab found",
                        "severity": 5, "fixable": false } ] },
        "7": { "3": [ { "source": "style.tabs", "message": "Tab found",
                        "severity": 5, "fixable": false } ] }
      }
    }
  }
}
"#,
    );
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.tabs"
message = "Tab found"
count = 1
"#,
    );

    // first in document order consumed; the 7:3 occurrence surfaces
    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("7:3  [style.tabs]"))
        .stdout(predicate::str::contains("2:5").not())
        .stdout(predicate::str::contains("1 finding (0 fixable), 1 suppressed"));
}

// ── input modes and formats ─────────────────────────────────────────

#[test]
fn report_reads_from_stdin_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(tmp.path(), CONFIG_FULL);

    quell(tmp.path())
        .arg("check")
        .write_stdin(REPORT)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 suppressed"));
}

#[test]
fn explicit_config_flag_overrides_discovery() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    // discovered quell.toml would suppress everything; the explicit empty
    // config must win
    write_config(tmp.path(), CONFIG_FULL);
    std::fs::write(tmp.path().join("empty.toml"), "suppressions = []\n").unwrap();

    quell(tmp.path())
        .args(["check", "--report", "report.json", "--config", "empty.toml"])
        .assert()
        .code(1);
}

#[test]
fn checkstyle_format_renders_xml() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.gone"
message = "No longer reported"
count = 1
"#,
    );

    quell(tmp.path())
        .args([
            "check",
            "--report",
            "report.json",
            "--format",
            "checkstyle",
        ])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("<checkstyle version="))
        .stdout(predicate::str::contains("severity=\"error\""))
        .stdout(predicate::str::contains("source=\"style.gone\""));
}

// ── fatal errors ────────────────────────────────────────────────────

#[test]
fn zero_count_config_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(
        tmp.path(),
        r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.tabs"
message = "Tab found"
count = 0
"#,
    );

    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("must be greater than 0"));
}

#[test]
fn malformed_config_is_fatal_with_hint() {
    let tmp = tempfile::tempdir().unwrap();
    write_report(tmp.path());
    write_config(tmp.path(), "supressions = []\n");

    quell(tmp.path())
        .args(["check", "--report", "report.json"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Hints:"));
}

#[test]
fn missing_report_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();

    quell(tmp.path())
        .args(["check", "--report", "missing.json"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Failed to load findings report"));
}
