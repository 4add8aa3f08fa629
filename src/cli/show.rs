//! Render a single snippet.

use anyhow::{Context, Result};
use clap::Args;

use super::CommandContext;

/// Print the rendered HTML of a snippet.
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Slug of the snippet, exactly as in the manifest
    slug: String,

    /// Manifest URL or path
    #[arg(short, long)]
    manifest: Option<String>,

    /// Base joined with relative document paths
    #[arg(short, long)]
    base: Option<String>,

    /// Print the markdown body instead of HTML
    #[arg(long, conflicts_with = "json")]
    raw: bool,

    /// Print the whole snippet (metadata, markdown and HTML) as JSON
    #[arg(long)]
    json: bool,
}

impl ShowCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let engine = ctx.engine(self.manifest.as_deref(), self.base.as_deref())?;
        let snippet =
            engine.get(&self.slug).await.with_context(|| format!("Failed to show '{}'", self.slug))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(snippet.as_ref())?);
        } else if self.raw {
            print!("{}", snippet.markdown);
        } else {
            print!("{}", snippet.html);
        }
        Ok(())
    }
}
