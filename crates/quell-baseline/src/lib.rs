//! Baseline generation: aggregate observed findings into a canonical
//! suppression document.
//!
//! A baseline is the suppression config that would, if loaded, suppress
//! exactly the findings observed in one report. Everything here is sorted:
//! paths, rules within a path, messages within a rule, all
//! lexicographically. The emitted document is therefore byte-reproducible
//! across runs with the same findings, which is what makes baselines
//! reviewable and diffable.

use std::collections::BTreeMap;

use quell_types::FindingsReport;

/// Aggregated occurrence counts, `path -> rule -> message -> count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    counts: BTreeMap<String, BTreeMap<String, BTreeMap<String, u32>>>,
}

impl Baseline {
    /// Count every finding occurrence in a report.
    #[must_use]
    pub fn from_report(report: &FindingsReport) -> Self {
        let mut baseline = Self::default();
        for (path, file) in &report.files {
            for columns in file.findings.values() {
                for findings in columns.values() {
                    for finding in findings {
                        baseline.observe(path, &finding.source, &finding.message);
                    }
                }
            }
        }
        baseline
    }

    /// Record one observed occurrence.
    pub fn observe(&mut self, path: &str, rule: &str, message: &str) {
        *self
            .counts
            .entry(path.to_string())
            .or_default()
            .entry(rule.to_string())
            .or_default()
            .entry(message.to_string())
            .or_default() += 1;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct `(path, rule, message)` entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.counts
            .values()
            .flat_map(|rules| rules.values())
            .map(BTreeMap::len)
            .sum()
    }

    /// Emit the canonical suppression-config TOML document.
    ///
    /// Paths under `cwd` are emitted relative to it; control characters in
    /// messages come out as their literal two-character basic-string
    /// escapes, so loading the document restores the original text.
    #[must_use]
    pub fn render(&self, cwd: &str) -> String {
        let mut out = String::new();
        for (path, rules) in &self.counts {
            let display = quell_path::relative_to(path, cwd).unwrap_or_else(|| path.clone());
            for (rule, messages) in rules {
                for (message, count) in messages {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str("[[suppressions]]\n");
                    out.push_str(&format!("rule = \"{}\"\n", escape_basic_string(rule)));
                    out.push_str(&format!(
                        "message = \"{}\"\n",
                        escape_basic_string(message)
                    ));
                    out.push_str(&format!("count = {count}\n"));
                    out.push_str(&format!("path = \"{}\"\n", escape_basic_string(&display)));
                }
            }
        }
        out
    }
}

/// TOML basic-string escaping: backslash, quote, the common control
/// characters as two-character sequences, anything else below 0x20 as
/// `\uXXXX`.
fn escape_basic_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quell_config::SuppressionConfig;

    fn baseline(observations: &[(&str, &str, &str)]) -> Baseline {
        let mut baseline = Baseline::default();
        for (path, rule, message) in observations {
            baseline.observe(path, rule, message);
        }
        baseline
    }

    // ── aggregation ──

    #[test]
    fn duplicate_observations_accumulate() {
        let baseline = baseline(&[
            ("/repo/a.rs", "r.one", "m"),
            ("/repo/a.rs", "r.one", "m"),
            ("/repo/a.rs", "r.one", "other"),
        ]);
        assert_eq!(baseline.entry_count(), 2);
        assert!(baseline.render("/repo").contains("count = 2"));
    }

    #[test]
    fn from_report_counts_every_location() {
        let raw = r#"
{
  "files": {
    "/repo/a.rs": {
      "findings": {
        "1": { "1": [ { "source": "r.one", "message": "m" } ] },
        "9": { "2": [ { "source": "r.one", "message": "m" },
                      { "source": "r.two", "message": "x" } ] }
      }
    }
  }
}"#;
        let report: FindingsReport = serde_json::from_str(raw).unwrap();
        let baseline = Baseline::from_report(&report);
        assert_eq!(baseline.entry_count(), 2);

        let rendered = baseline.render("/repo");
        assert!(rendered.contains("rule = \"r.one\"\nmessage = \"m\"\ncount = 2"));
    }

    // ── canonical rendering ──

    #[test]
    fn render_is_sorted_and_cwd_relative() {
        let baseline = baseline(&[
            ("/repo/src/z.rs", "r.two", "m"),
            ("/repo/src/a.rs", "r.one", "beta"),
            ("/repo/src/a.rs", "r.one", "alpha"),
            ("/elsewhere/x.rs", "r.one", "m"),
        ]);

        insta::assert_snapshot!(baseline.render("/repo"), @r#"
        [[suppressions]]
        rule = "r.one"
        message = "m"
        count = 1
        path = "/elsewhere/x.rs"

        [[suppressions]]
        rule = "r.one"
        message = "alpha"
        count = 1
        path = "src/a.rs"

        [[suppressions]]
        rule = "r.one"
        message = "beta"
        count = 1
        path = "src/a.rs"

        [[suppressions]]
        rule = "r.two"
        message = "m"
        count = 1
        path = "src/z.rs"
        "#);
    }

    #[test]
    fn render_is_reproducible_regardless_of_observation_order() {
        let forward = baseline(&[("/a.rs", "r", "x"), ("/b.rs", "r", "y")]);
        let backward = baseline(&[("/b.rs", "r", "y"), ("/a.rs", "r", "x")]);
        assert_eq!(forward.render("/"), backward.render("/"));
    }

    #[test]
    fn empty_baseline_renders_empty_document() {
        assert_eq!(Baseline::default().render("/repo"), "");
    }

    // ── escaping and round-trip ──

    #[test]
    fn control_characters_escape_to_literal_sequences() {
        let mut b = Baseline::default();
        b.observe("/repo/a.rs", "r.one", "one\ntwo\tthree\rfour");
        let rendered = b.render("/repo");
        assert!(rendered.contains(r"message = "));
        assert!(rendered.contains(r"one\ntwo\tthree\rfour"));
    }

    #[test]
    fn rendered_document_loads_back_as_suppression_config() {
        let mut b = Baseline::default();
        b.observe("/repo/a.rs", "r.one", "quote \" slash \\ tab\t");
        b.observe("/repo/a.rs", "r.one", "quote \" slash \\ tab\t");

        let config = SuppressionConfig::from_toml(&b.render("/repo")).unwrap();
        assert_eq!(config.suppressions.len(), 1);
        assert_eq!(config.suppressions[0].message, "quote \" slash \\ tab\t");
        assert_eq!(config.suppressions[0].count, 2);
    }

    proptest! {
        #[test]
        fn arbitrary_messages_round_trip_through_toml(
            message in proptest::collection::vec(
                prop_oneof![
                    proptest::char::range('a', 'z'),
                    Just('\n'), Just('\t'), Just('\r'),
                    Just('"'), Just('\\'), Just('\u{1}'),
                ],
                0..24,
            ).prop_map(String::from_iter)
        ) {
            let mut b = Baseline::default();
            b.observe("/repo/a.rs", "r.one", &message);

            let config = SuppressionConfig::from_toml(&b.render("/repo")).unwrap();
            prop_assert_eq!(&config.suppressions[0].message, &message);
        }
    }
}
