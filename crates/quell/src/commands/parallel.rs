//! Parallel orchestration for `quell check --parallel N`.
//!
//! Files are split into N contiguous shards; the virtual outdated unit
//! rides in the last shard, which makes that worker the designated
//! reporter. Each shard runs as a child process of the same binary
//! (hidden `worker` subcommand) with its own registry, writes a JSON
//! result document, and reconciles through the shared sync file. The
//! parent merges the per-worker results back into one [`Outcome`].

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};

use quell_sync::SyncFile;
use quell_types::FindingsReport;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::check::Outcome;
use crate::commands::worker::WorkerResult;

pub(crate) fn run(
    args: &CheckArgs,
    config_paths: &[PathBuf],
    report: &FindingsReport,
    global: &GlobalArgs,
) -> Result<Outcome> {
    // the virtual outdated unit counts as one unit of work
    let unit_count = report.files.len() + 1;
    let worker_count = (args.parallel as usize).min(unit_count);

    let dir = tempfile::Builder::new()
        .prefix("quell-parallel-")
        .tempdir()
        .context("Failed to create parallel scratch directory")?;

    let sync = if args.no_outdated {
        None
    } else {
        Some(
            SyncFile::create(dir.path().join("outdated.json"), worker_count as u32)
                .context("Failed to create reconciliation file")?,
        )
    };

    let shards = shard_files(report, worker_count);
    if global.verbose > 0 {
        eprintln!(
            "Spawning {} worker(s) over {} file(s)",
            worker_count,
            report.files.len(),
        );
    }

    let exe = std::env::current_exe().context("Failed to locate own executable")?;
    let mut children = Vec::with_capacity(worker_count);
    for (index, shard) in shards.into_iter().enumerate() {
        let shard_path = dir.path().join(format!("shard-{index}.json"));
        let out_path = dir.path().join(format!("result-{index}.json"));
        let file = std::fs::File::create(&shard_path)
            .with_context(|| format!("Failed to write worker shard {index}"))?;
        serde_json::to_writer(file, &shard)
            .with_context(|| format!("Failed to write worker shard {index}"))?;

        let mut command = Command::new(&exe);
        command
            .arg("worker")
            .arg("--report")
            .arg(&shard_path)
            .arg("--out")
            .arg(&out_path);
        for config in config_paths {
            command.arg("--config").arg(config);
        }
        if let Some(sync) = &sync {
            command.arg("--sync").arg(sync.data_path());
        }
        // last shard carries the virtual unit and reports
        if index == worker_count - 1 {
            command.arg("--designated");
        }
        if args.fix {
            command.arg("--fix");
        }
        for _ in 0..global.verbose {
            command.arg("--verbose");
        }

        let child = command
            .spawn()
            .with_context(|| format!("Failed to spawn worker {index}"))?;
        children.push((index, child, out_path));
    }

    let mut outcome = Outcome {
        files: Default::default(),
        outdated: Vec::new(),
    };
    let mut failed = None;
    for (index, mut child, out_path) in children {
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for worker {index}"))?;
        if !status.success() {
            failed.get_or_insert((index, status));
            continue;
        }
        if failed.is_some() {
            continue;
        }

        let raw = std::fs::read_to_string(&out_path)
            .with_context(|| format!("Failed to read result of worker {index}"))?;
        let result: WorkerResult = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse result of worker {index}"))?;
        // shards are disjoint, so file maps never collide
        outcome.files.extend(result.files);
        outcome.outdated.extend(result.outdated);
    }

    if let Some((index, status)) = failed {
        bail!("Worker {index} failed with {status}");
    }
    Ok(outcome)
}

/// Split a report's files into `worker_count` contiguous shards, in
/// sorted path order. Earlier shards take the remainder.
fn shard_files(report: &FindingsReport, worker_count: usize) -> Vec<FindingsReport> {
    let files: Vec<_> = report.files.iter().collect();
    let base = files.len() / worker_count;
    let remainder = files.len() % worker_count;

    let mut shards = Vec::with_capacity(worker_count);
    let mut offset = 0;
    for index in 0..worker_count {
        let size = base + usize::from(index < remainder);
        let shard = FindingsReport {
            files: files[offset..offset + size]
                .iter()
                .map(|(path, file)| ((*path).clone(), (*file).clone()))
                .collect(),
        };
        offset += size;
        shards.push(shard);
    }
    shards
}
