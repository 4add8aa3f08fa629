//! Error handling for mark-down
//!
//! This module provides the error type shared by every layer of the snippet
//! engine, plus user-friendly error reporting for the command-line interface.
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can match on the failure kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`SnippetError`] - Enumerated error types for all engine failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Slugs**: [`SnippetError::InvalidSlug`]
//! - **Manifests and I/O**: [`SnippetError::ManifestLoad`]
//! - **Documents**: [`SnippetError::FrontMatterParse`], [`SnippetError::Render`]
//! - **Lookups**: [`SnippetError::SnippetNotFound`]
//! - **Configuration**: [`SnippetError::Config`]
//!
//! `SnippetError` is `Clone`: the engine memoizes in-flight futures, and every
//! caller awaiting a shared future that failed receives its own copy of the
//! error. Underlying causes are therefore held behind an [`Arc`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use mark_down::core::{SnippetError, user_friendly_error};
//!
//! let error = SnippetError::SnippetNotFound { slug: "intro".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared, cloneable handle on an underlying error cause.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Wrap any error into a [`Cause`].
pub fn cause<E>(error: E) -> Cause
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    Arc::from(error.into())
}

/// The main error type for snippet operations
///
/// # Propagation
///
/// Errors are never swallowed at the engine boundary. Diagnostic-only
/// conditions (slug mismatches, unexpected front-matter shapes) are reported
/// through `tracing` when verbose mode is on and never become errors.
#[derive(Error, Debug, Clone)]
pub enum SnippetError {
    /// Slug normalization input has no usable characters
    ///
    /// Fatal to the calling operation, never retried.
    #[error("Invalid slug '{input}': {reason}")]
    InvalidSlug {
        /// The input that failed to normalize
        input: String,
        /// Why it failed
        reason: String,
    },

    /// The manifest (or a document behind it) could not be loaded
    ///
    /// Covers unreachable sources, malformed JSON, entries missing required
    /// fields, duplicate slugs, and underlying network or file failures. No
    /// partial manifest is ever returned alongside this error.
    #[error("{message}")]
    ManifestLoad {
        /// Description of what failed
        message: String,
        /// The original cause, kept for diagnostics
        #[source]
        source: Option<Cause>,
    },

    /// A document's front-matter block is present but malformed
    #[error("Failed to parse front-matter{}: {reason}", for_slug(.slug.as_deref()))]
    FrontMatterParse {
        /// Slug of the snippet being parsed, when known
        slug: Option<String>,
        /// Parser message
        reason: String,
        /// The YAML error
        #[source]
        source: Option<Cause>,
    },

    /// Slug absent from a successfully loaded manifest
    ///
    /// Fatal to that lookup only; the manifest cache remains valid.
    #[error("Snippet with slug '{slug}' was not found in the manifest")]
    SnippetNotFound {
        /// The slug that was requested
        slug: String,
    },

    /// The injected renderer failed
    #[error("Failed to render snippet '{slug}'")]
    Render {
        /// Slug of the snippet being rendered
        slug: String,
        /// The renderer's error
        #[source]
        source: Option<Cause>,
    },

    /// Configuration file problem
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
        /// The underlying read or parse error
        #[source]
        source: Option<Cause>,
    },
}

fn for_slug(slug: Option<&str>) -> String {
    slug.map(|s| format!(" for snippet '{s}'")).unwrap_or_default()
}

impl SnippetError {
    /// Create a [`SnippetError::ManifestLoad`] without a cause.
    pub fn manifest_load(message: impl Into<String>) -> Self {
        Self::ManifestLoad {
            message: message.into(),
            source: None,
        }
    }

    /// Create a [`SnippetError::ManifestLoad`] carrying the original cause.
    pub fn manifest_load_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::ManifestLoad {
            message: message.into(),
            source: Some(cause(source)),
        }
    }

    /// Attach a slug to a front-matter error raised before the slug was known.
    #[must_use]
    pub fn with_slug(self, slug: &str) -> Self {
        match self {
            Self::FrontMatterParse {
                reason,
                source,
                ..
            } => Self::FrontMatterParse {
                slug: Some(slug.to_string()),
                reason,
                source,
            },
            other => other,
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// The CLI prints errors through this type: the error itself in red, optional
/// details in yellow and an optional suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The error message to show
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from any displayable error
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`SnippetError`] variants anywhere in the error chain and
/// [`std::io::Error`] at the root; anything else is shown with its full cause
/// chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let snippet_error = error.chain().find_map(|e| e.downcast_ref::<SnippetError>());
    if let Some(snippet_error) = snippet_error {
        return create_error_context(snippet_error, &error);
    }

    if let Some(duplicates) = error.chain().find_map(|e| e.downcast_ref::<crate::manifest::DuplicateSlugs>()) {
        return ErrorContext::new(with_chain(&error))
            .with_suggestion("Give each document a unique 'slug' in its front-matter, or rename the files")
            .with_details(format!("{} slug(s) are claimed by more than one document", duplicates.slugs.len()));
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(&error)
                    .with_suggestion("Check file ownership and permissions")
                    .with_details("mark-down could not read or write a file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(&error)
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    ErrorContext::new(with_chain(&error))
}

fn with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn create_error_context(snippet_error: &SnippetError, error: &anyhow::Error) -> ErrorContext {
    let ctx = ErrorContext::new(with_chain(error));
    match snippet_error {
        SnippetError::InvalidSlug {
            ..
        } => ctx
            .with_suggestion("Use a slug containing at least one letter or digit")
            .with_details("Slugs are lowercased and every run of other characters becomes a single '-'"),
        SnippetError::ManifestLoad {
            ..
        } => ctx
            .with_suggestion(
                "Check that the manifest exists, is a JSON array, and every entry has 'slug' and 'path'",
            )
            .with_details("Run 'mark-down build' to regenerate the manifest from your snippet directory"),
        SnippetError::FrontMatterParse {
            ..
        } => ctx
            .with_suggestion("Fix the YAML between the leading '---' lines of the document")
            .with_details("Set front_matter_errors = \"lenient\" to render such documents as plain markdown"),
        SnippetError::SnippetNotFound {
            ..
        } => ctx.with_suggestion("Run 'mark-down list' to see the available slugs"),
        SnippetError::Render {
            ..
        } => ctx,
        SnippetError::Config {
            ..
        } => ctx.with_suggestion("Check the syntax of mark-down.toml"),
    }
}
