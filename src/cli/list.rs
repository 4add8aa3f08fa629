//! List manifest entries.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

use super::CommandContext;
use crate::models::{ListOptions, SearchFilter, SnippetMeta, TagsMode};

/// Output format for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    #[default]
    Table,
    Json,
}

/// List snippets from a manifest without fetching their documents.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Manifest URL or path
    #[arg(short, long)]
    manifest: Option<String>,

    /// Only entries in this group
    #[arg(short, long)]
    group: Option<String>,

    /// Only entries of this type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    snippet_type: Option<String>,

    /// Only entries carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Require every --tag instead of any
    #[arg(long, requires = "tags")]
    all_tags: bool,

    /// Maximum number of entries
    #[arg(long)]
    limit: Option<usize>,

    /// Number of entries to skip
    #[arg(long, default_value_t = 0)]
    offset: usize,

    #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
    format: ListFormat,
}

impl ListCommand {
    fn filter(&self) -> SearchFilter {
        let mode = if self.all_tags {
            TagsMode::All
        } else {
            TagsMode::Any
        };
        let mut filter = SearchFilter::new().with_tags(self.tags.iter().cloned(), mode);
        filter.snippet_type.clone_from(&self.snippet_type);
        filter.group.clone_from(&self.group);
        filter
    }

    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let engine = ctx.engine(self.manifest.as_deref(), None)?;
        let options = ListOptions {
            offset: self.offset,
            limit: self.limit,
        };
        let items = engine.search(&self.filter(), options).await?;

        match self.format {
            ListFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
            ListFormat::Table => print_table(&items),
        }
        Ok(())
    }
}

fn print_table(items: &[SnippetMeta]) {
    if items.is_empty() {
        println!("No snippets found.");
        return;
    }

    println!(
        "{:<32} {:<32} {:<12} {:<16} {}",
        "Slug".cyan().bold(),
        "Title".cyan().bold(),
        "Type".cyan().bold(),
        "Group".cyan().bold(),
        "Tags".cyan().bold()
    );
    println!("{}", "-".repeat(100).bright_black());

    for item in items {
        println!(
            "{:<32} {:<32} {:<12} {:<16} {}",
            item.slug,
            item.title.as_deref().unwrap_or("-"),
            item.snippet_type.as_deref().unwrap_or("-"),
            item.group_name().unwrap_or("-"),
            item.tags.as_ref().map_or_else(String::new, |tags| tags.join(", ")).bright_black()
        );
    }

    println!();
    println!("{}: {} snippets", "Total".green().bold(), items.len());
}
