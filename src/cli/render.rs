//! The `render` command: print a stored citation selection as text.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::api::{AlmaClient, HttpTransport};
use crate::cache::ListCache;
use crate::config::DisplayMode;
use crate::render::{RenderedBlock, SelectionRenderer};

/// Arguments for `leganto render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// The stored selection JSON, given directly.
    #[arg(long, conflicts_with = "file")]
    pub selection: Option<String>,

    /// Read the stored selection from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Display mode: page, inline-collapsed, or inline-expanded.
    #[arg(long, value_enum, default_value_t = DisplayArg::Page)]
    pub display: DisplayArg,
}

/// CLI mirror of [`DisplayMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DisplayArg {
    Page,
    InlineCollapsed,
    InlineExpanded,
}

impl From<DisplayArg> for DisplayMode {
    fn from(arg: DisplayArg) -> Self {
        match arg {
            DisplayArg::Page => Self::Page,
            DisplayArg::InlineCollapsed => Self::InlineCollapsed,
            DisplayArg::InlineExpanded => Self::InlineExpanded,
        }
    }
}

pub async fn execute<T: HttpTransport, C: ListCache>(
    client: &AlmaClient<T, C>,
    args: &RenderArgs,
) -> Result<()> {
    let stored = match (&args.selection, &args.file) {
        (Some(selection), _) => selection.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("could not read selection from {}", path.display()))?,
        (None, None) => anyhow::bail!("either --selection or --file is required"),
    };

    let renderer = SelectionRenderer::new(client, args.display.into());
    let blocks = renderer.render(&stored).await?;

    if blocks.is_empty() {
        println!("Nothing to display.");
        return Ok(());
    }

    for block in &blocks {
        match block {
            RenderedBlock::Section(heading) => {
                let count = match heading.citation_count {
                    1 => "1 item".to_string(),
                    n => format!("{n} items"),
                };
                println!("{} {}", heading.name.bold(), format!("({count})").dimmed());
                if let Some(description) = &heading.description {
                    println!("  {description}");
                }
            }
            RenderedBlock::GroupOpen | RenderedBlock::GroupClose => {
                // Grouping boundaries become vertical space in plain text.
                println!();
            }
            RenderedBlock::Citation(citation) => {
                println!("  - {}", citation.title);
                let details: Vec<&str> = [
                    citation.author.as_deref(),
                    citation.edition.as_deref(),
                    citation.publisher.as_deref(),
                    citation.published.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect();
                if !details.is_empty() {
                    println!("    {}", details.join(", ").dimmed());
                }
                if let Some(source) = &citation.source {
                    println!("    {}", source.underline());
                }
            }
        }
    }

    Ok(())
}
