//! crosspack - cross-compile and package binaries for release

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crosspack_cli::console::ConsoleReporter;
use crosspack_cli::{Cli, driver};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Some(dir) = &cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let reporter = ConsoleReporter::new(cli.quiet);
    driver::run(&cli, &reporter)
}
