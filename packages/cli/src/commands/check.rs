use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use drafting_editor::Draft;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Draft files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Entity counts of a draft that passed the check
#[derive(Debug, PartialEq, Eq)]
struct Counts {
    sections: usize,
    paragraphs: usize,
    sentences: usize,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    println!("🔍 {} structural check", "Starting".green().bold());
    println!();

    let mut failures = 0;

    for file in &args.files {
        let path = cwd.join(file);

        match check_file(&path) {
            Ok(counts) => println!(
                "{} {} ({} sections, {} paragraphs, {} sentences)",
                "✓".green(),
                path.display(),
                counts.sections,
                counts.paragraphs,
                counts.sentences
            ),
            Err(err) => {
                println!("{} {}", "✗".red(), path.display());
                println!("  {} {:#}", "error".red().bold(), err);
                failures += 1;
            }
        }
    }

    println!();
    if failures > 0 {
        bail!("{} of {} drafts failed the check", failures, args.files.len());
    }
    println!("✨ {} No issues found!", "Done".green().bold());

    Ok(())
}

fn check_file(path: &Path) -> Result<Counts> {
    let content = fs::read_to_string(path).context("Failed to read draft")?;

    // Decode without validation so the violation itself can be reported
    let draft: Draft = serde_json::from_str(&content).context("Invalid draft JSON")?;
    draft.structure.check_invariants()?;

    Ok(Counts {
        sections: draft.structure.section_count(),
        paragraphs: draft.structure.paragraph_count(),
        sentences: draft.structure.sentence_count(),
    })
}
