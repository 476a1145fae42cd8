//! Shared input plumbing: report reading and suppression-config loading.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use quell_types::{FindingsReport, SuppressionEntry};

/// Read a findings report from a file path, or stdin when `spec` is `-`.
pub(crate) fn read_report(spec: &str) -> Result<FindingsReport> {
    if spec == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read findings report from stdin")?;
        quell_report::report_from_str(&raw).context("Failed to parse findings report from stdin")
    } else {
        quell_report::report_from_file(std::path::Path::new(spec))
            .with_context(|| format!("Failed to load findings report from {spec}"))
    }
}

/// Resolve which config files apply and load their entries in precedence
/// order. No `--config` flag means `quell.toml` in the working directory,
/// when present; entries may legitimately be empty.
pub(crate) fn load_suppressions(
    configs: &[PathBuf],
    verbose: u8,
) -> Result<(Vec<SuppressionEntry>, Vec<PathBuf>)> {
    let paths = if configs.is_empty() {
        quell_config::discover().into_iter().collect()
    } else {
        configs.to_vec()
    };

    let entries = quell_config::load_all(&paths).context("Failed to load suppression config")?;
    if verbose > 0 {
        eprintln!(
            "Loaded {} suppression entr{} from {} config file(s)",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" },
            paths.len(),
        );
    }
    Ok((entries, paths))
}

/// The invocation's working directory, as the canonical base every path is
/// resolved against.
pub(crate) fn cwd() -> Result<String> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    Ok(cwd.display().to_string())
}
