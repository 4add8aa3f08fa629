//! Manifest loading and building.
//!
//! A manifest is the ordered index of snippet documents: a JSON array whose
//! entries carry at least `slug` and `path`.
//!
//! ```json
//! [
//!   { "slug": "intro", "path": "guides/intro.md", "title": "Introduction", "order": 1 },
//!   { "slug": "button", "path": "components/button.md", "tags": ["ui"], "group": "components" }
//! ]
//! ```
//!
//! The engine reads manifests through [`load_manifest`], which accepts the
//! three shapes of [`ManifestSource`]. Loading is all-or-nothing: every entry
//! is validated before anything is returned, and the first problem fails the
//! whole load with [`SnippetError::ManifestLoad`].
//!
//! The [`builder`] submodule generates a manifest by scanning a directory of
//! markdown files.

pub mod builder;

pub use builder::{BuildReport, DuplicateSlugs, build_manifest, build_manifest_file};

use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::core::{Result, SnippetError};
use crate::fetch::Fetcher;
use crate::models::{SnippetMeta, route_fields};
use crate::slug::normalize_slug;
use crate::utils::paths::normalize_separators;

/// Zero-argument function producing manifest entries.
pub type ManifestProducer =
    Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Vec<SnippetMeta>>> + Send + Sync>;

/// Where a manifest comes from.
#[derive(Clone)]
pub enum ManifestSource {
    /// Entries held in memory.
    Inline(Vec<SnippetMeta>),
    /// A function called on every (re)load.
    Producer(ManifestProducer),
    /// A URL or filesystem path to a JSON array, read through the fetcher.
    Location(String),
}

impl ManifestSource {
    /// Wrap a synchronous producer.
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<SnippetMeta>> + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(move || {
            let entries = producer();
            Box::pin(async move { entries })
        }))
    }

    /// Wrap an asynchronous producer.
    pub fn from_async<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<SnippetMeta>>> + Send + 'static,
    {
        Self::Producer(Arc::new(move || Box::pin(producer())))
    }

    /// The location the manifest is read from, if it is read from one.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Location(location) => Some(location),
            _ => None,
        }
    }
}

impl fmt::Debug for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(entries) => f.debug_tuple("Inline").field(&entries.len()).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
            Self::Location(location) => f.debug_tuple("Location").field(location).finish(),
        }
    }
}

impl From<Vec<SnippetMeta>> for ManifestSource {
    fn from(entries: Vec<SnippetMeta>) -> Self {
        Self::Inline(entries)
    }
}

impl From<&str> for ManifestSource {
    fn from(location: &str) -> Self {
        Self::Location(location.to_string())
    }
}

impl From<String> for ManifestSource {
    fn from(location: String) -> Self {
        Self::Location(location)
    }
}

impl From<PathBuf> for ManifestSource {
    fn from(path: PathBuf) -> Self {
        Self::Location(path.to_string_lossy().into_owned())
    }
}

/// Resolve `source` into a validated list of entries.
///
/// Every entry must have a non-blank `slug` and `path`. Slugs must already be
/// in normalized form (see [`normalize_slug`]) and must be unique. Paths are normalized by collapsing duplicate separators. The
/// returned entries are owned copies; mutating them never affects `source`.
///
/// # Errors
///
/// Returns [`SnippetError::ManifestLoad`] when the producer fails, the
/// location cannot be fetched, the text is not a JSON array of objects, or
/// any entry is invalid. The original cause is kept as the error source.
pub async fn load_manifest(source: &ManifestSource, fetcher: &dyn Fetcher) -> Result<Vec<SnippetMeta>> {
    let entries = match source {
        ManifestSource::Inline(entries) => entries.clone(),
        ManifestSource::Producer(producer) => producer()
            .await
            .map_err(|e| SnippetError::manifest_load_with("Manifest producer failed", e))?,
        ManifestSource::Location(location) => {
            debug!("Loading manifest from {}", location);
            let text = fetcher.fetch(location).await.map_err(|e| {
                SnippetError::manifest_load_with(format!("Failed to fetch manifest from '{location}'"), e)
            })?;
            parse_manifest(&text).map_err(|e| match e {
                SnippetError::ManifestLoad {
                    message,
                    source,
                } => SnippetError::ManifestLoad {
                    message: format!("{message} (manifest '{location}')"),
                    source,
                },
                other => other,
            })?
        }
    };

    validate_entries(entries)
}

/// Parse manifest JSON text into entries.
///
/// Recognized fields are type-checked the same way front-matter is: a value
/// of the wrong type is dropped. A nested `extra` object is merged into the
/// entry's extra fields; any other unrecognized key lands there too.
///
/// # Errors
///
/// Returns [`SnippetError::ManifestLoad`] for invalid JSON, a non-array top
/// level, a non-object entry, or an entry whose `slug` or `path` is not a
/// non-blank string.
pub fn parse_manifest(text: &str) -> Result<Vec<SnippetMeta>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SnippetError::manifest_load_with("Manifest is not valid JSON", e))?;

    let Value::Array(items) = value else {
        return Err(SnippetError::manifest_load("Manifest must be a JSON array"));
    };

    items.into_iter().enumerate().map(|(index, item)| entry_from_json(index, item)).collect()
}

fn entry_from_json(index: usize, item: Value) -> Result<SnippetMeta> {
    let Value::Object(mut fields) = item else {
        return Err(SnippetError::manifest_load(format!("Manifest entry {index} is not an object")));
    };

    let slug = required_string(index, &mut fields, "slug")?;
    let path = required_string(index, &mut fields, "path")?;
    let nested_extra = match fields.remove("extra") {
        Some(Value::Object(extra)) => Some(extra),
        Some(other) => {
            fields.insert("extra".to_string(), other);
            None
        }
        None => None,
    };

    let routed = route_fields(fields);
    let mut meta = SnippetMeta::new(slug, path);
    meta.merge(&routed.meta, &routed.extra);
    if let Some(extra) = nested_extra {
        meta.extra.extend(extra);
    }
    Ok(meta)
}

fn required_string(index: usize, fields: &mut serde_json::Map<String, Value>, key: &str) -> Result<String> {
    match fields.remove(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing_field(index, key)),
    }
}

fn missing_field(index: usize, key: &str) -> SnippetError {
    SnippetError::manifest_load(format!("Manifest entry {index} is missing required field '{key}'"))
}

fn validate_entries(mut entries: Vec<SnippetMeta>) -> Result<Vec<SnippetMeta>> {
    let mut seen = HashSet::with_capacity(entries.len());

    for (index, entry) in entries.iter_mut().enumerate() {
        if entry.slug.trim().is_empty() {
            return Err(missing_field(index, "slug"));
        }
        if entry.path.trim().is_empty() {
            return Err(missing_field(index, "path"));
        }
        ensure_normalized_slug(index, &entry.slug)?;
        if !seen.insert(entry.slug.clone()) {
            return Err(SnippetError::manifest_load(format!(
                "Manifest contains duplicate slug '{}' (entry {index})",
                entry.slug
            )));
        }
        entry.path = normalize_separators(&entry.path);
    }

    Ok(entries)
}

fn ensure_normalized_slug(index: usize, slug: &str) -> Result<()> {
    let normalized = normalize_slug(slug).map_err(|e| {
        SnippetError::manifest_load_with(format!("Manifest entry {index} has an invalid slug '{slug}'"), e)
    })?;
    if normalized != slug {
        return Err(SnippetError::manifest_load(format!(
            "Manifest entry {index} has slug '{slug}' which is not normalized (expected '{normalized}')"
        )));
    }
    Ok(())
}
