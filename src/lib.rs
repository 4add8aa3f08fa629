//! mark-down - markdown snippets with front-matter, resolved and cached
//!
//! A snippet is a markdown document with structured metadata. Snippets are
//! indexed by a manifest (a JSON array of entries, each at least
//! `{slug, path}`), fetched on demand over HTTP or from the filesystem, merged
//! with the metadata in their own front-matter, rendered to HTML and cached.
//!
//! # Architecture Overview
//!
//! Leaf-first:
//!
//! - [`slug`] - canonical identifiers from arbitrary strings
//! - [`markdown`] - front-matter parsing and markdown rendering
//! - [`utils::paths`] - resolution of document paths against manifests and bases
//! - [`manifest`] - loading manifests from their three source shapes, and
//!   building them from a directory of documents
//! - [`engine`] - the [`engine::SnippetEngine`] owning the manifest and
//!   snippet caches
//!
//! Supporting modules:
//!
//! - [`core`] - the [`core::SnippetError`] type and CLI error reporting
//! - [`models`] - manifest entries, snippets, filters
//! - [`fetch`] - the [`fetch::Fetcher`] trait with HTTP and file implementations
//! - [`config`] - the optional `mark-down.toml` project configuration
//! - [`cli`] - the `mark-down` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use mark_down::engine::SnippetEngine;
//! use mark_down::models::ListOptions;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = SnippetEngine::builder("content/snippets/snippets-index.json").build();
//!
//! for entry in engine.list_by_group("guides", ListOptions::default()).await? {
//!     let snippet = engine.get(&entry.slug).await?;
//!     println!("{}: {} bytes of HTML", entry.slug, snippet.html.len());
//! }
//!
//! // A document changed on disk
//! engine.invalidate_slug("getting-started");
//! # Ok(())
//! # }
//! ```
//!
//! # Manifest Format
//!
//! ```json
//! [
//!   {
//!     "slug": "getting-started",
//!     "path": "guides/getting-started.md",
//!     "title": "Getting Started",
//!     "type": "guide",
//!     "order": 1,
//!     "tags": ["docs", "intro"],
//!     "group": "guides",
//!     "extra": { "hero": true }
//!   }
//! ]
//! ```

// Core functionality
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod engine;

// Documents and manifests
pub mod fetch;
pub mod manifest;
pub mod markdown;
pub mod slug;

// Supporting modules
pub mod models;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
