pub(crate) mod baseline;
pub(crate) mod check;
pub(crate) mod completions;
pub(crate) mod parallel;
pub(crate) mod worker;

use anyhow::Result;

use crate::cli::{Cli, Commands};

pub(crate) fn dispatch(cli: Cli) -> Result<()> {
    let global = &cli.global;
    match cli.command {
        Commands::Check(args) => check::handle(args, global),
        Commands::Baseline(args) => baseline::handle(args, global),
        Commands::Completions(args) => completions::handle(args),
        Commands::Worker(args) => worker::handle(args, global),
    }
}
