//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// `quell` — counted suppression tracking for lint findings.
///
/// Filters a findings report through pre-approved suppressions and
/// reports the suppressions the code no longer justifies.
#[derive(Parser, Debug)]
#[command(name = "quell", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Verbose output on stderr (repeat for more detail).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Filter a findings report through the suppression config and report
    /// outdated suppressions.
    Check(CheckArgs),

    /// Generate a suppression baseline from a findings report.
    Baseline(BaselineArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),

    /// One parallel worker's share of a check run (spawned internally).
    #[command(hide = true)]
    Worker(WorkerArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Findings report JSON; `-` reads stdin.
    #[arg(long, default_value = "-", value_name = "PATH")]
    pub report: String,

    /// Suppression config file(s); later files win on exact key collision.
    /// Repeatable. Defaults to `quell.toml` in the working directory.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// The report is the outcome of an auto-fix attempt: consume from the
    /// fix view and flag surviving fixable findings.
    #[arg(long)]
    pub fix: bool,

    /// Shard files across N worker processes.
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub parallel: u32,

    /// Output format for the outdated-suppression report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip outdated-suppression detection entirely.
    #[arg(long = "no-outdated")]
    pub no_outdated: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Checkstyle,
}

#[derive(Args, Debug, Clone)]
pub struct BaselineArgs {
    /// Findings report JSON; `-` reads stdin.
    #[arg(long, default_value = "-", value_name = "PATH")]
    pub report: String,

    /// Write the baseline document here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    Powershell,
    Zsh,
}

#[derive(Args, Debug, Clone)]
pub struct WorkerArgs {
    /// This worker's shard of the findings report.
    #[arg(long, value_name = "PATH")]
    pub report: PathBuf,

    /// Resolved suppression config file(s), in precedence order.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Shared reconciliation data file; absent when outdated detection is
    /// disabled.
    #[arg(long, value_name = "PATH")]
    pub sync: Option<PathBuf>,

    /// This worker carries the virtual outdated unit and emits the final
    /// diagnostics.
    #[arg(long)]
    pub designated: bool,

    /// Consume from the fix view instead of the check view.
    #[arg(long)]
    pub fix: bool,

    /// Where to write this worker's JSON result document.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}
