//! Handler for the `quell baseline` command.

use anyhow::{Context, Result};

use quell_baseline::Baseline;

use crate::cli::{BaselineArgs, GlobalArgs};
use crate::input;

pub(crate) fn handle(args: BaselineArgs, global: &GlobalArgs) -> Result<()> {
    let mut report = input::read_report(&args.report)?;
    let cwd = input::cwd()?;
    quell_report::normalize_paths(&mut report, &cwd);

    let baseline = Baseline::from_report(&report);
    if global.verbose > 0 {
        eprintln!(
            "Aggregated {} suppression entr{}",
            baseline.entry_count(),
            if baseline.entry_count() == 1 { "y" } else { "ies" },
        );
    }

    let document = baseline.render(&cwd);
    match &args.output {
        Some(path) => std::fs::write(path, document)
            .with_context(|| format!("Failed to write baseline to {}", path.display()))?,
        None => print!("{document}"),
    }
    Ok(())
}
