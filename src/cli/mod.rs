//! Command-line interface for mark-down.
//!
//! # Available Commands
//!
//! - `build` - Scan a snippet directory and write its manifest
//! - `list` - List manifest entries, optionally filtered and paginated
//! - `show` - Render one snippet to HTML
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging and engine diagnostics (front-matter
//!   slug mismatches, ignored front-matter data)
//! - `--quiet` / `-q`: only log errors
//! - `--config` / `-c`: configuration file, see [`crate::config`]
//!
//! `RUST_LOG` overrides the log level chosen by these flags.
//!
//! # Example
//!
//! ```bash
//! mark-down build content/snippets
//! mark-down list --tag ui --format json
//! mark-down show getting-started --manifest https://cdn.example.com/snippets-index.json
//! ```

mod build;
mod list;
mod show;

pub use build::BuildCommand;
pub use list::{ListCommand, ListFormat};
pub use show::ShowCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ProjectConfig;
use crate::constants::{DEFAULT_MANIFEST_NAME, DEFAULT_SOURCE_DIR, default_http_timeout};
use crate::engine::SnippetEngine;
use crate::fetch::{DefaultFetcher, FileFetcher, HttpFetcher};

/// Settings derived from global flags, applied before a command runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Configuration file named with `--config`.
    pub config_path: Option<PathBuf>,

    /// Engine diagnostics requested with `--verbose`.
    pub verbose: bool,
}

impl CliConfig {
    /// Install the global `tracing` subscriber, writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// State shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config: ProjectConfig,
    pub verbose: bool,
}

impl CommandContext {
    /// The manifest location: the flag, else the configuration file, else
    /// `snippets-index.json` in the source directory.
    #[must_use]
    pub fn manifest_location(&self, flag: Option<&str>) -> String {
        if let Some(manifest) = flag.or(self.config.manifest.as_deref()) {
            return manifest.to_string();
        }
        let source_dir =
            self.config.source_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        source_dir.join(DEFAULT_MANIFEST_NAME).to_string_lossy().into_owned()
    }

    /// An engine configured from the file, overridden by flags.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be initialized.
    pub fn engine(&self, manifest: Option<&str>, base: Option<&str>) -> Result<SnippetEngine> {
        let mut options = self.config.engine_options();
        options.verbose |= self.verbose;
        if let Some(base) = base {
            options.base = Some(base.to_string());
        }

        let http = HttpFetcher::with_timeout(default_http_timeout())?;
        let fetcher = DefaultFetcher::with_parts(http, FileFetcher::new());

        Ok(SnippetEngine::builder(self.manifest_location(manifest))
            .options(options)
            .fetcher(fetcher)
            .build())
    }
}

/// Main CLI structure
#[derive(Parser)]
#[command(
    name = "mark-down",
    about = "Build, list and render markdown snippets",
    version,
    long_about = "mark-down indexes markdown snippets with front-matter into a JSON manifest \
                  and resolves, renders and caches them on demand."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging and engine diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the configuration file (default: ./mark-down.toml)
    #[arg(short, long, global = true, env = "MARK_DOWN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the manifest from a directory of markdown files
    Build(BuildCommand),

    /// List snippets from a manifest
    List(ListCommand),

    /// Render a snippet
    Show(ShowCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Propagates configuration and command errors for display by `main`.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Derive a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
            verbose: self.verbose,
        }
    }

    /// Execute with an explicit configuration, for tests.
    ///
    /// # Errors
    ///
    /// Propagates configuration and command errors.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let project = ProjectConfig::load(config.config_path.as_deref()).await?;
        let ctx = CommandContext {
            config: project,
            verbose: config.verbose,
        };

        match self.command {
            Commands::Build(cmd) => cmd.execute(&ctx).await,
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Show(cmd) => cmd.execute(&ctx).await,
        }
    }
}
