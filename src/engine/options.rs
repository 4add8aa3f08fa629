//! Engine configuration.

use serde::{Deserialize, Serialize};

/// What `get` does when a document's front-matter block is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterPolicy {
    /// Fail the request with [`crate::core::SnippetError::FrontMatterParse`].
    #[default]
    Strict,
    /// Log a warning and render the whole document as markdown.
    Lenient,
}

/// Behavior switches of a [`super::SnippetEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Explicit base joined with every relative document path. When unset,
    /// the directory of the manifest location is used.
    pub base: Option<String>,

    /// Memoize the manifest and every snippet. When off, each call reloads.
    pub cache: bool,

    /// Split and merge front-matter. When off, the whole document is the body
    /// and the manifest metadata is used as-is.
    pub front_matter: bool,

    pub front_matter_policy: FrontMatterPolicy,

    /// Emit diagnostic warnings (slug mismatches, ignored front-matter data).
    pub verbose: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            base: None,
            cache: true,
            front_matter: true,
            front_matter_policy: FrontMatterPolicy::Strict,
            verbose: false,
        }
    }
}
