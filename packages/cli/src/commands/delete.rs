use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use drafting_editor::DraftCollection;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Collection directory
    pub dir: PathBuf,

    /// ID of the draft to remove
    pub id: String,
}

pub fn delete(args: DeleteArgs, cwd: &Path) -> Result<()> {
    let dir = cwd.join(&args.dir);
    let mut collection = DraftCollection::open(&dir)
        .with_context(|| format!("Failed to open collection {}", dir.display()))?;

    if !collection.delete(&args.id)? {
        bail!("No draft {} in {}", args.id, dir.display());
    }

    println!("  {} Deleted {}", "✓".green(), args.id);
    Ok(())
}
