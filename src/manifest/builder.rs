//! Generate a manifest from a directory of markdown documents.
//!
//! Every `*.md` file below the source directory becomes one entry:
//!
//! - `slug`: the document's front-matter `slug` when it is a non-blank string,
//!   otherwise its relative path without the `.md` extension, normalized
//! - `path`: the relative path with `/` separators
//! - `group`: the relative directory, `"root"` for top-level files
//!
//! Drafts (`draft: true`) are left out. Entries are ordered by `order`
//! (entries without one last), then by case-insensitive title.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::{DEFAULT_MANIFEST_NAME, ROOT_GROUP};
use crate::markdown::frontmatter::parse_front_matter;
use crate::models::SnippetMeta;
use crate::slug::normalize_slug;
use crate::utils::fs::{atomic_write, to_forward_slashes};

/// Two or more documents normalize to the same slug.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate slugs detected: {}", .slugs.join(", "))]
pub struct DuplicateSlugs {
    /// Every duplicated slug, in discovery order.
    pub slugs: Vec<String>,
}

/// Outcome of [`build_manifest_file`].
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: Vec<SnippetMeta>,
    pub output_path: PathBuf,
}

/// Scan `source_dir` and produce manifest entries.
///
/// # Errors
///
/// Fails when the directory cannot be read, a document cannot be read or has
/// malformed front-matter, a slug cannot be derived, or slugs collide
/// ([`DuplicateSlugs`], reachable through `downcast_ref`).
pub fn build_manifest(source_dir: &Path) -> Result<Vec<SnippetMeta>> {
    let root = source_dir
        .canonicalize()
        .with_context(|| format!("Failed to read snippet directory: {}", source_dir.display()))?;

    let mut manifest = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        let relative = to_forward_slashes(relative);
        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;

        let snippet = create_entry(&relative, &content)?;
        if snippet.draft == Some(true) {
            debug!("Skipping draft {}", relative);
            continue;
        }
        manifest.push(snippet);
    }

    ensure_unique_slugs(&manifest)?;
    manifest.sort_by(compare_entries);

    Ok(manifest)
}

/// Build the manifest and write it as pretty-printed JSON.
///
/// `output` defaults to `snippets-index.json` inside `source_dir`. The file
/// is replaced atomically.
///
/// # Errors
///
/// Everything [`build_manifest`] can fail with, plus write failures.
pub fn build_manifest_file(source_dir: &Path, output: Option<&Path>) -> Result<BuildReport> {
    let manifest = build_manifest(source_dir)?;
    let output_path = output.map_or_else(|| source_dir.join(DEFAULT_MANIFEST_NAME), Path::to_path_buf);

    let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    atomic_write(&output_path, json.as_bytes())?;

    debug!("Wrote {} snippets to {}", manifest.len(), output_path.display());
    Ok(BuildReport {
        manifest,
        output_path,
    })
}

/// Build the entry for one document at `relative_path`.
///
/// # Errors
///
/// Fails on malformed front-matter or when no slug can be derived.
pub fn create_entry(relative_path: &str, content: &str) -> Result<SnippetMeta> {
    let parsed = parse_front_matter(content)
        .map_err(|e| e.with_slug(relative_path))
        .with_context(|| format!("Failed to parse {relative_path}"))?;

    let slug_source = parsed
        .slug
        .as_deref()
        .filter(|slug| !slug.trim().is_empty())
        .map_or_else(|| strip_markdown_extension(relative_path), str::to_string);
    let slug = normalize_slug(&slug_source)
        .with_context(|| format!("Cannot derive a slug for {relative_path}"))?;

    let mut meta = SnippetMeta::new(slug, relative_path);
    let mut fields = parsed.meta;
    fields.group = None;
    if fields.draft == Some(false) {
        fields.draft = None;
    }
    meta.merge(&fields, &parsed.extra);
    meta.group = Some(Some(derive_group(relative_path)));

    Ok(meta)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn strip_markdown_extension(path: &str) -> String {
    match path.len().checked_sub(3) {
        Some(idx) if path.is_char_boundary(idx) && path[idx..].eq_ignore_ascii_case(".md") => {
            path[..idx].to_string()
        }
        _ => path.to_string(),
    }
}

fn derive_group(relative_path: &str) -> String {
    match relative_path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => ROOT_GROUP.to_string(),
    }
}

fn ensure_unique_slugs(manifest: &[SnippetMeta]) -> std::result::Result<(), DuplicateSlugs> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for entry in manifest {
        if !seen.insert(entry.slug.as_str()) && !duplicates.contains(&entry.slug) {
            duplicates.push(entry.slug.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(DuplicateSlugs {
            slugs: duplicates,
        })
    }
}

fn compare_entries(a: &SnippetMeta, b: &SnippetMeta) -> Ordering {
    let order_a = a.order.unwrap_or(f64::INFINITY);
    let order_b = b.order.unwrap_or(f64::INFINITY);
    order_a.total_cmp(&order_b).then_with(|| {
        let title_a = a.title.as_deref().unwrap_or_default().to_lowercase();
        let title_b = b.title.as_deref().unwrap_or_default().to_lowercase();
        title_a.cmp(&title_b)
    })
}
