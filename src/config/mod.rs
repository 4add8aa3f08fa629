//! Project configuration for mark-down
//!
//! Settings shared by every command can live in a `mark-down.toml` file so
//! they do not need to be repeated on the command line. Command-line flags
//! always win over file values.
//!
//! # Location
//!
//! 1. The path given with `--config`
//! 2. The path in the `MARK_DOWN_CONFIG` environment variable
//! 3. `mark-down.toml` in the current directory
//!
//! An explicitly named file must exist. The default file is optional; when it
//! is missing every setting takes its default.
//!
//! # Format
//!
//! Every key is optional:
//!
//! ```toml
//! # Manifest URL or path used by `list` and `show`
//! manifest = "content/snippets/snippets-index.json"
//! # Base joined with relative document paths
//! base = "https://cdn.example.com/content"
//! cache = true
//! front_matter = true
//! # "strict" fails on malformed front-matter, "lenient" renders it as markdown
//! front_matter_errors = "strict"
//! verbose = false
//!
//! # Used by `build`
//! source_dir = "content/snippets"
//! output = "content/snippets/snippets-index.json"
//! ```
//!
//! Relative `manifest`, `source_dir` and `output` paths are resolved against
//! the directory containing the configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{CONFIG_ENV_VAR, CONFIG_FILE_NAME};
use crate::core::{Result, SnippetError, cause};
use crate::engine::{EngineOptions, FrontMatterPolicy};
use crate::utils::paths::is_absolute_url;

/// Contents of `mark-down.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_matter: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_matter_errors: Option<FrontMatterPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl ProjectConfig {
    /// Where the configuration is read from, and whether it must exist.
    #[must_use]
    pub fn locate(explicit: Option<&Path>) -> (PathBuf, bool) {
        if let Some(path) = explicit {
            return (path.to_path_buf(), true);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return (PathBuf::from(path), true);
        }
        (PathBuf::from(CONFIG_FILE_NAME), false)
    }

    /// Load the configuration, honoring `--config` and `MARK_DOWN_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::Config`] when an explicitly named file is
    /// missing, or when the file cannot be read or parsed.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = Self::locate(explicit);
        if !required && !path.exists() {
            debug!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path).await
    }

    /// Load the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::Config`] when the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| SnippetError::Config {
            message: format!("Failed to read {}", path.display()),
            source: Some(cause(e)),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| SnippetError::Config {
            message: format!("Failed to parse {}", path.display()),
            source: Some(cause(e)),
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config.relative_to(path.parent().unwrap_or_else(|| Path::new(""))))
    }

    fn relative_to(mut self, dir: &Path) -> Self {
        if dir.as_os_str().is_empty() {
            return self;
        }
        if let Some(manifest) = &self.manifest
            && !is_absolute_url(manifest)
            && !manifest.starts_with("//")
        {
            self.manifest = Some(dir.join(manifest).to_string_lossy().into_owned());
        }
        self.source_dir = self.source_dir.map(|p| dir.join(p));
        self.output = self.output.map(|p| dir.join(p));
        self
    }

    /// Engine options described by this file.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        let defaults = EngineOptions::default();
        EngineOptions {
            base: self.base.clone(),
            cache: self.cache.unwrap_or(defaults.cache),
            front_matter: self.front_matter.unwrap_or(defaults.front_matter),
            front_matter_policy: self.front_matter_errors.unwrap_or(defaults.front_matter_policy),
            verbose: self.verbose.unwrap_or(defaults.verbose),
        }
    }
}
