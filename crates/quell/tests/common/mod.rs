//! Shared test utilities for quell integration tests.
//!
//! Fixtures live in per-test temp directories: a findings report with
//! relative paths and a `quell.toml`, both resolved against the test's
//! working directory so config entries and report keys meet in the same
//! canonical absolute form.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;

/// Two findings in `src/lib.rs`: a fixable one at 3:1 and a plain one at
/// 8:5.
pub const REPORT: &str = r#"
{
  "files": {
    "src/lib.rs": {
      "findings": {
        "3": { "1": [ { "source": "style.line_length",
                        "message": "Line exceeds 100 characters",
                        "severity": 5, "fixable": true } ] },
        "8": { "5": [ { "source": "style.tabs",
                        "message": "Tab found",
                        "severity": 5, "fixable": false } ] }
      }
    }
  }
}
"#;

/// Suppresses every finding in [`REPORT`] exactly.
pub const CONFIG_FULL: &str = r#"
[[suppressions]]
path = "src/lib.rs"
rule = "style.line_length"
message = "Line exceeds 100 characters"
count = 1

[[suppressions]]
path = "src/lib.rs"
rule = "style.tabs"
message = "Tab found"
count = 1
"#;

/// A `quell` command rooted at `dir`.
pub fn quell(dir: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("quell");
    cmd.current_dir(dir);
    cmd
}

pub fn write_report(dir: &Path) -> PathBuf {
    write_report_named(dir, "report.json", REPORT)
}

pub fn write_report_named(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("quell.toml");
    std::fs::write(&path, content).unwrap();
    path
}
