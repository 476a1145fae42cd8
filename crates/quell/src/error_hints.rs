use anyhow::Error;

pub(crate) fn format(err: &Error) -> String {
    let mut out = format!("Error: {err:#}");
    let hints = suggestions(err);
    if !hints.is_empty() {
        out.push_str("\n\nHints:\n");
        for hint in hints {
            out.push_str("- ");
            out.push_str(&hint);
            out.push('\n');
        }
    }
    out
}

fn suggestions(err: &Error) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let haystack = chain.join(" | ").to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();

    if haystack.contains("suppression config")
        && (haystack.contains("parse") || haystack.contains("toml"))
    {
        push_hint(
            &mut out,
            "Check the suppression config syntax; every entry is a [[suppressions]] \
             table with path, rule, message, and count keys.",
        );
        push_hint(
            &mut out,
            "Regenerate the document from current findings with `quell baseline`.",
        );
    }

    if haystack.contains("must be greater than 0") {
        push_hint(
            &mut out,
            "A suppression that may match zero times is meaningless; delete the entry instead.",
        );
    }

    if haystack.contains("no such file or directory")
        || haystack.contains("failed to load findings report")
    {
        push_hint(&mut out, "Verify the input path exists and is readable.");
        push_hint(
            &mut out,
            "Use an absolute path to avoid working-directory confusion.",
        );
    }

    if haystack.contains("waiting time for all workers") {
        push_hint(
            &mut out,
            "A worker process likely crashed before reconciling; check stderr above for its error.",
        );
        push_hint(
            &mut out,
            "Re-run without `--parallel` to get a single-process result.",
        );
    }

    if haystack.contains("internally inconsistent") {
        push_hint(
            &mut out,
            "This is a bug in quell, not in your configuration; please report it.",
        );
    }

    out
}

fn push_hint(out: &mut Vec<String>, hint: &str) {
    if !out.iter().any(|h| h == hint) {
        out.push(hint.to_string());
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::{format, suggestions};

    #[test]
    fn suggests_for_malformed_config() {
        let err = anyhow!("Failed to parse suppression config TOML: expected newline");
        let hints = suggestions(&err);
        assert!(hints.iter().any(|h| h.contains("[[suppressions]]")));
        assert!(hints.iter().any(|h| h.contains("quell baseline")));
    }

    #[test]
    fn suggests_for_zero_count() {
        let err = anyhow!("count for path 'a.rs', rule 'r' and message 'm' must be greater than 0");
        let hints = suggestions(&err);
        assert!(hints.iter().any(|h| h.contains("delete the entry")));
    }

    #[test]
    fn suggests_for_reconciliation_timeout() {
        let err = anyhow!("Waiting time for all workers to complete - 30 seconds - exceeded");
        let hints = suggestions(&err);
        assert!(hints.iter().any(|h| h.contains("--parallel")));
    }

    #[test]
    fn format_includes_hints_section() {
        let err = anyhow!("Failed to load findings report from missing.json");
        let rendered = format(&err);
        assert!(rendered.contains("Error:"));
        assert!(rendered.contains("Hints:"));
    }

    #[test]
    fn unknown_errors_get_no_hints() {
        assert!(suggestions(&anyhow!("something else entirely")).is_empty());
    }
}
