use super::OpenDraft;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use drafting_editor::{Mutation, MutationOutcome};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Draft file
    pub file: PathBuf,

    /// JSON file with a list of mutations
    #[arg(short, long)]
    pub script: PathBuf,

    /// Apply and report without writing the result
    #[arg(long)]
    pub dry_run: bool,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let mut open = OpenDraft::open(cwd, &args.file)?;

    let script_path = cwd.join(&args.script);
    let script = fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid mutation script {}", script_path.display()))?;

    println!(
        "⚙️  {} {} mutation(s) to {}",
        "Applying".green().bold(),
        mutations.len(),
        open.path.display()
    );

    for (index, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        let outcome = open
            .engine
            .apply(mutation)
            .with_context(|| format!("Mutation #{} ({}) was rejected", index + 1, name))?;
        println!("  {} {} {}", "✓".green(), name, describe(&outcome).dimmed());
    }

    if args.dry_run {
        println!();
        println!("{} Dry run, nothing written", "ℹ".blue());
        return Ok(());
    }

    let written = open.save()?;
    println!();
    if written {
        println!("✨ {} Saved {}", "Done".green().bold(), open.path.display());
    } else {
        println!("✨ {} No changes", "Done".green().bold());
    }

    Ok(())
}

fn describe(outcome: &MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Unchanged => "(unchanged)".to_string(),
        MutationOutcome::Applied => String::new(),
        MutationOutcome::Sentence { sentence_id } => format!("→ {}", sentence_id),
        MutationOutcome::Merged(merged) => {
            format!("→ {} @ {}", merged.merged_id, merged.cursor_position)
        }
        MutationOutcome::Cursor(cursor) => {
            format!("→ {} @ {}", cursor.sentence_id, cursor.cursor_offset)
        }
        MutationOutcome::Paragraph(created) => {
            format!("→ {} / {}", created.paragraph_id, created.sentence_id)
        }
        MutationOutcome::Section { section_id } => format!("→ {}", section_id),
    }
}
