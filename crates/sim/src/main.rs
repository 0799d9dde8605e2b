//! Combat simulator entry point.
//!
//! Loads a content directory and either runs the status tick loop or
//! evaluates a single formula against the loaded roster.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Eval, Run};

/// Combat formula simulator
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Run designer combat content from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Cast skills, then advance the stepped clock and update every entity
    Run(Run),

    /// Evaluate one formula against the loaded content
    Eval(Eval),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Eval(cmd) => cmd.execute(),
    }
}
