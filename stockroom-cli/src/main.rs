//! Stockroom: grouped inventory records kept in SQLite.
//!
//! # Usage
//!
//! ```text
//! stockroom init [--database <path>]
//! stockroom list [--json]
//! stockroom show <record-id>
//! stockroom group add <name> [--description <text>] [--dry-run]
//! stockroom group rename <group> <name> [--dry-run]
//! stockroom group describe <group> <text> [--dry-run]
//! stockroom group delete <group> [--dry-run]
//! stockroom record add <group> <name> --quantity <n> [--description <text>] [--dry-run]
//! stockroom record edit <id> [--quantity <n>] [--name <name>] [--description <text>] [--group <group>] [--dry-run]
//! stockroom record delete <id> [--dry-run]
//! ```
//!
//! `<group>` is a numeric group id or a group name that is unique.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    group::GroupCommand,
    init::InitArgs,
    list::{ListArgs, ShowArgs},
    record::RecordCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stockroom",
    version,
    about = "Track inventory records organised into groups",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the config file and create the database schema.
    Init(InitArgs),

    /// List every group with its records.
    List(ListArgs),

    /// Show a single record.
    Show(ShowArgs),

    /// Add, rename, describe or delete groups.
    Group {
        #[command(subcommand)]
        command: GroupCommand,
    },

    /// Add, edit or delete records.
    Record {
        #[command(subcommand)]
        command: RecordCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Group { command } => commands::group::run(command),
        Commands::Record { command } => commands::record::run(command),
    }
}
