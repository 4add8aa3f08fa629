//! Generate a manifest from a snippet directory.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::CommandContext;
use crate::constants::DEFAULT_SOURCE_DIR;
use crate::manifest::build_manifest_file;

/// Scan `SOURCE_DIR` for `*.md` files and write `snippets-index.json`.
///
/// Fails with exit code 2 when two documents resolve to the same slug.
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Directory containing markdown snippets [default: content/snippets]
    source_dir: Option<PathBuf>,

    /// Output file [default: SOURCE_DIR/snippets-index.json]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl BuildCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let source_dir = self
            .source_dir
            .or_else(|| ctx.config.source_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        let output = self.output.or_else(|| ctx.config.output.clone());

        let report =
            tokio::task::spawn_blocking(move || build_manifest_file(&source_dir, output.as_deref()))
                .await??;

        println!(
            "{} {} snippets to {}",
            "Wrote".green().bold(),
            report.manifest.len(),
            report.output_path.display()
        );
        Ok(())
    }
}
