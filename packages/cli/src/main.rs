mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, check, delete, list, new, outline, reconcile, ApplyArgs, CheckArgs, DeleteArgs,
    ListArgs, NewArgs, OutlineArgs, ReconcileArgs,
};
use std::path::Path;

/// Drafter - structural editing for legal drafts
#[derive(Parser, Debug)]
#[command(name = "drafter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the sample motion draft to a file or collection
    New(NewArgs),

    /// Print the numbered outline of a draft
    Outline(OutlineArgs),

    /// Verify the structural invariants of a draft
    Check(CheckArgs),

    /// Replace a paragraph's sentences from raw text
    Reconcile(ReconcileArgs),

    /// Apply a JSON list of mutations to a draft
    Apply(ApplyArgs),

    /// List the drafts of a collection, newest first
    List(ListArgs),

    /// Remove a draft from a collection
    Delete(DeleteArgs),
}

fn run(command: Command, cwd: &Path) -> anyhow::Result<()> {
    match command {
        Command::New(args) => new(args, cwd),
        Command::Outline(args) => outline(args, cwd),
        Command::Check(args) => check(args, cwd),
        Command::Reconcile(args) => reconcile(args, cwd),
        Command::Apply(args) => apply(args, cwd),
        Command::List(args) => list(args, cwd),
        Command::Delete(args) => delete(args, cwd),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| run(cli.command, &cwd));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
