//! repoctx - Bounded repository context for language-model prompts
//!
//! repoctx provides:
//! - Directory tree rendering with noise filtering and per-directory caps
//! - Key file classification (docs, entry points, config, core sources)
//! - Budgeted context assembly under per-file and total byte caps
//! - Line-numbered listings of explicitly requested files
//! - Shallow GitHub clones as an alternative to a local root

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backends;
mod cli;
mod core;
mod flows;

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    // stdout carries the document, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        colored::control::set_override(false);
    }

    cli::run(cli)
}
