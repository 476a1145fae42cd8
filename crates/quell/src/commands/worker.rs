//! Handler for the hidden `quell worker` subcommand.
//!
//! One worker owns one shard of the findings report. It builds its own
//! registry from the same configs as every sibling, filters its shard,
//! and reconciles through the shared sync file: ordinary workers fold
//! their remaining ledger in on completion, the designated worker waits
//! for all siblings, runs outdated detection on the reconciled ledger,
//! and deletes the shared file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use quell_ledger::{Registry, View};
use quell_outdated::OutdatedDiagnostic;
use quell_report::FilteredFile;
use quell_sync::SyncFile;

use crate::cli::{GlobalArgs, WorkerArgs};

/// JSON document a worker hands back to its parent.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WorkerResult {
    pub files: BTreeMap<String, FilteredFile>,
    /// Empty for every worker but the designated reporter.
    pub outdated: Vec<OutdatedDiagnostic>,
}

pub(crate) fn handle(args: WorkerArgs, global: &GlobalArgs) -> Result<()> {
    let entries = quell_config::load_all(&args.config)
        .context("Failed to load suppression config in worker")?;
    let mut registry = Registry::load(&entries).context("Invalid suppression config")?;

    // shard paths were normalized by the parent
    let report = quell_report::report_from_file(&args.report)
        .with_context(|| format!("Failed to load worker shard {}", args.report.display()))?;

    let view = if args.fix { View::Fix } else { View::Check };
    let files = quell_report::filter_report(&mut registry, view, &report);
    let remaining = registry.remaining(view);

    let mut outdated = Vec::new();
    if let Some(sync_path) = &args.sync {
        let sync = SyncFile::at(sync_path.clone());
        if args.designated {
            if global.verbose > 0 {
                eprintln!("Designated worker waiting for siblings");
            }
            let reconciled = sync
                .await_peers(remaining)
                .context("Cross-worker reconciliation failed")?;
            outdated = quell_outdated::detect(registry.original(), &reconciled)
                .context("Suppression ledger is internally inconsistent")?;
            sync.cleanup()
                .context("Failed to remove reconciliation file")?;
        } else {
            sync.report_completion(remaining)
                .context("Failed to report worker completion")?;
        }
    }

    let result = WorkerResult { files, outdated };
    let out = std::fs::File::create(&args.out)
        .with_context(|| format!("Failed to create worker result {}", args.out.display()))?;
    serde_json::to_writer(out, &result)
        .with_context(|| format!("Failed to write worker result {}", args.out.display()))?;
    Ok(())
}
