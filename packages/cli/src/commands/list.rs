use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use drafting_editor::DraftCollection;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Collection directory
    pub dir: PathBuf,
}

pub fn list(args: ListArgs, cwd: &Path) -> Result<()> {
    let dir = cwd.join(&args.dir);
    let collection = DraftCollection::open(&dir)
        .with_context(|| format!("Failed to open collection {}", dir.display()))?;

    if collection.list().is_empty() {
        println!("{} No drafts in {}", "ℹ".blue(), dir.display());
        return Ok(());
    }

    println!("📚 {} in {}", "Drafts".green().bold(), dir.display());
    println!();
    for entry in collection.list() {
        println!(
            "  {}  {}  {}",
            entry.last_modified.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            entry.title.bold(),
            entry.id.dimmed()
        );
    }

    Ok(())
}
