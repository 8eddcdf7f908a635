use super::OpenDraft;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Draft file
    pub file: PathBuf,

    /// Paragraph to replace
    #[arg(short, long)]
    pub paragraph: String,

    /// Edited raw text of the paragraph
    #[arg(short, long)]
    pub text: String,

    /// Show the result without writing it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn reconcile(args: ReconcileArgs, cwd: &Path) -> Result<()> {
    let mut open = OpenDraft::open(cwd, &args.file)?;

    let existing: HashSet<String> = open
        .engine
        .structure()
        .paragraph(&args.paragraph)
        .map(|p| p.sentence_ids.iter().cloned().collect())
        .unwrap_or_default();

    let reconciled = open.engine.reconcile_paragraph(&args.paragraph, &args.text)?;

    for sentence in &reconciled {
        let marker = if existing.contains(&sentence.id) {
            "kept".blue()
        } else {
            "new ".green()
        };
        println!("  {} {} {}", marker, sentence.text, format!("[{}]", sentence.id).dimmed());
    }
    let dropped = existing.len().saturating_sub(reconciled.len());
    if dropped > 0 {
        println!("  {} {} sentence(s)", "drop".red(), dropped);
    }

    if args.dry_run {
        println!();
        println!("{} Dry run, nothing written", "ℹ".blue());
        return Ok(());
    }

    open.engine
        .update_paragraph_sentences(&args.paragraph, &reconciled)?;
    open.save()?;

    println!();
    println!("  {} Updated {}", "✓".green(), open.path.display());
    Ok(())
}
