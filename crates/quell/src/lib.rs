//! # quell
//!
//! **CLI Binary**
//!
//! This is the entry point for the `quell` command-line application. It
//! orchestrates the other crates: load suppression configs, filter a
//! findings report, detect outdated suppressions (sequentially or across
//! worker processes), and generate baselines.
//!
//! ## Responsibilities
//! * Parse command line arguments
//! * Dispatch commands to appropriate handlers
//! * Handle errors and exit codes
//!
//! This crate should contain minimal business logic.

mod cli;
mod commands;
mod error_hints;
mod input;

use anyhow::Result;
use clap::Parser;

/// No surviving findings, no outdated suppressions.
pub const EXIT_CLEAN: i32 = 0;
/// Findings survived suppression filtering.
pub const EXIT_FINDINGS: i32 = 1;
/// An auto-fix attempt (`--fix`) left fixable findings behind.
pub const EXIT_FIXABLE: i32 = 2;
/// Outdated suppressions were detected.
pub const EXIT_OUTDATED: i32 = 3;
/// Fatal error: config, consistency, synchronization timeout, or I/O.
pub const EXIT_FATAL: i32 = 4;

/// Entry point used by the `quell` binary.
pub fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    commands::dispatch(cli)
}

/// Render an error with actionable hints for known failure modes.
#[must_use]
pub fn format_error(err: &anyhow::Error) -> String {
    error_hints::format(err)
}
