//! notesync: publish Markdown notes to Notion databases.
//!
//! # Usage
//!
//! ```text
//! notesync init <vault>
//! notesync collections list [--json]
//! notesync collections add <folder> <database-id>
//! notesync collections remove <folder>
//! notesync sync <folder>... [--update] [--since <days>] [--dry-run]
//! notesync sync --all [...]
//! notesync inspect <file> [--tier rich|plain-text|empty]
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    collections::CollectionsCommand, init::InitArgs, inspect::InspectArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "notesync",
    version,
    about = "Publish Markdown notes from a vault into Notion databases",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create ~/.notesync/config.yaml pointing at a vault.
    Init(InitArgs),

    /// Manage folder → database mappings.
    Collections {
        #[command(subcommand)]
        command: CollectionsCommand,
    },

    /// Upload notes from one or more mapped folders.
    Sync(SyncArgs),

    /// Show the identity, properties and blocks derived from one note.
    Inspect(InspectArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run().map(|()| ExitCode::SUCCESS),
        Commands::Collections { command } => {
            commands::collections::run(command).map(|()| ExitCode::SUCCESS)
        }
        Commands::Sync(args) => args.run(),
        Commands::Inspect(args) => args.run().map(|()| ExitCode::SUCCESS),
    }
}
