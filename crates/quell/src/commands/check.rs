//! Handler for the `quell check` command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use quell_ledger::{Registry, View};
use quell_outdated::OutdatedDiagnostic;
use quell_report::FilteredFile;
use quell_types::OUTDATED_VIRTUAL_PATH;

use crate::cli::{CheckArgs, GlobalArgs, OutputFormat};
use crate::commands::parallel;
use crate::input;
use crate::{EXIT_CLEAN, EXIT_FINDINGS, EXIT_FIXABLE, EXIT_OUTDATED};

/// Everything a check run produces before rendering: the filtered files
/// and the outdated diagnostics (already reconciled for parallel runs).
pub(crate) struct Outcome {
    pub files: BTreeMap<String, FilteredFile>,
    pub outdated: Vec<OutdatedDiagnostic>,
}

pub(crate) fn handle(args: CheckArgs, global: &GlobalArgs) -> Result<()> {
    let (entries, config_paths) = input::load_suppressions(&args.config, global.verbose)?;
    // validate the config up front, even though parallel workers re-load it
    let mut registry = Registry::load(&entries).context("Invalid suppression config")?;

    let mut report = input::read_report(&args.report)?;
    let cwd = input::cwd()?;
    quell_report::normalize_paths(&mut report, &cwd);

    let mut outcome = if args.parallel > 1 {
        parallel::run(&args, &config_paths, &report, global)?
    } else {
        let view = if args.fix { View::Fix } else { View::Check };
        let files = quell_report::filter_report(&mut registry, view, &report);
        let outdated = if args.no_outdated {
            Vec::new()
        } else {
            quell_outdated::detect(registry.original(), registry.remaining(view))
                .context("Suppression ledger is internally inconsistent")?
        };
        Outcome { files, outdated }
    };

    // outdated diagnostics join the finding stream as synthetic findings
    // on the virtual unit, so the totals and exit path see them uniformly
    if !outcome.outdated.is_empty() {
        outcome.files.insert(
            OUTDATED_VIRTUAL_PATH.to_string(),
            FilteredFile {
                findings: quell_outdated::synthetic_findings(&outcome.outdated),
                ignored_count: 0,
                ignored_fixable_count: 0,
            },
        );
    }

    print_summary(&outcome.files, &cwd);
    if !outcome.outdated.is_empty() {
        match args.format {
            OutputFormat::Text => {
                println!();
                print!("{}", quell_outdated::render_text(&outcome.outdated, &cwd));
            }
            OutputFormat::Checkstyle => {
                print!("{}", quell_outdated::render_checkstyle(&outcome.outdated));
            }
        }
    }

    let code = exit_code(&outcome, args.fix);
    if code != EXIT_CLEAN {
        std::process::exit(code);
    }
    Ok(())
}

/// Surviving findings per file, then one totals line.
fn print_summary(files: &BTreeMap<String, FilteredFile>, cwd: &str) {
    let mut findings = 0usize;
    let mut fixable = 0usize;
    let mut suppressed = 0u32;

    for (path, file) in files {
        suppressed += file.ignored_count;
        if file.is_clean() {
            continue;
        }
        findings += file.finding_count();
        fixable += file.fixable_count();
        if path == OUTDATED_VIRTUAL_PATH {
            // displayed by the outdated rendering below
            continue;
        }

        let display =
            quell_path::relative_to(path, cwd).unwrap_or_else(|| path.clone());
        println!("FILE: {display}");
        for (line, columns) in &file.findings.findings {
            for (column, list) in columns {
                for finding in list {
                    println!("  {line}:{column}  [{}] {}", finding.source, finding.message);
                }
            }
        }
        println!();
    }

    println!(
        "{findings} finding{} ({fixable} fixable), {suppressed} suppressed",
        if findings == 1 { "" } else { "s" },
    );
}

/// Exit-code precedence: outdated beats leftover fixables beats findings.
fn exit_code(outcome: &Outcome, fix: bool) -> i32 {
    let findings: usize = outcome
        .files
        .values()
        .map(FilteredFile::finding_count)
        .sum();
    let fixable: usize = outcome
        .files
        .values()
        .map(FilteredFile::fixable_count)
        .sum();

    if !outcome.outdated.is_empty() {
        EXIT_OUTDATED
    } else if fix && fixable > 0 {
        EXIT_FIXABLE
    } else if findings > 0 {
        EXIT_FINDINGS
    } else {
        EXIT_CLEAN
    }
}
