use anyhow::Result;
use clap::Args;
use colored::Colorize;
use drafting_editor::sample::motion_draft;
use drafting_editor::{Draft, DraftCollection};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Draft file to create, or the directory with --collection
    pub file: PathBuf,

    /// Register the draft in the collection at FILE instead
    #[arg(short, long)]
    pub collection: bool,

    /// Draft title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn new(args: NewArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.file);

    if args.collection {
        let mut collection = DraftCollection::open(&path)?;
        let mut draft = Draft::untitled(motion_draft().structure);
        if let Some(title) = args.title {
            draft.title = title;
        }
        collection.save(&draft)?;
        let file = collection.path_of(&draft.id)?;
        print_created(&file, &draft);
        return Ok(());
    }

    if path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            path.display().to_string().bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let mut draft = motion_draft();
    if let Some(title) = args.title {
        draft.title = title;
    }
    draft.save(&path)?;
    print_created(&path, &draft);

    Ok(())
}

fn print_created(path: &Path, draft: &Draft) {
    println!("  {} Created {}", "✓".green(), path.display());
    println!("   ID:        {}", draft.id);
    println!("   Title:     {}", draft.title);
    println!(
        "   Sections:  {}  Paragraphs: {}  Sentences: {}",
        draft.structure.section_count(),
        draft.structure.paragraph_count(),
        draft.structure.sentence_count()
    );
}
