use anyhow::Result;
use clap::Args;
use colored::Colorize;
use drafting_editor::numbering::outline_labels;
use drafting_editor::{Draft, DocumentStructure, ParagraphStyle, Section};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct OutlineArgs {
    /// Draft file
    pub file: PathBuf,

    /// Show entity IDs next to sections, paragraphs and sentences
    #[arg(long)]
    pub ids: bool,

    /// Print section headings only
    #[arg(long)]
    pub headings: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn outline(args: OutlineArgs, cwd: &Path) -> Result<()> {
    let draft = Draft::load(&cwd.join(&args.file))?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&draft.structure)?);
        return Ok(());
    }

    println!("{}", draft.title.bold());
    println!();

    let doc = &draft.structure;
    let labels = outline_labels(doc);

    for (index, section) in doc.sections_in_order().into_iter().enumerate() {
        if section.is_root() && index > 0 {
            println!();
        }
        let indent = "   ".repeat(section.level.saturating_sub(1) as usize);
        let label = labels
            .get(&section.id)
            .cloned()
            .flatten()
            .unwrap_or_else(|| "?.".to_string());

        print!("{}{} {}", indent, label.bright_blue().bold(), section.title.bold());
        if args.ids {
            print!(" {}", format!("[{}]", section.id).dimmed());
        }
        println!();

        if !args.headings {
            print_paragraphs(doc, section, &indent, args.ids);
        }
    }

    Ok(())
}

fn print_paragraphs(doc: &DocumentStructure, section: &Section, indent: &str, ids: bool) {
    for paragraph_id in &section.paragraph_ids {
        let (Some(paragraph), Some(sentences)) = (
            doc.paragraph(paragraph_id),
            doc.paragraph_sentences(paragraph_id),
        ) else {
            continue;
        };
        let marker = style_marker(paragraph.effective_style());

        if ids {
            println!("{}   {}", indent, format!("¶ [{}]", paragraph_id).dimmed());
        }

        for (position, sentence) in sentences.into_iter().enumerate() {
            // Style marker on the first line only
            let lead = if position == 0 { marker } else { " " };
            let text = if sentence.text.is_empty() {
                "(empty)".dimmed().to_string()
            } else {
                sentence.text.clone()
            };
            if ids {
                println!(
                    "{}   {} {} {}",
                    indent,
                    lead,
                    text,
                    format!("[{}]", sentence.id).dimmed()
                );
            } else {
                println!("{} {} {}", indent, lead, text);
            }
        }
    }
}

fn style_marker(style: ParagraphStyle) -> &'static str {
    match style {
        ParagraphStyle::Body => " ",
        ParagraphStyle::ListItem => "•",
        ParagraphStyle::BlockQuote => "│",
    }
}
