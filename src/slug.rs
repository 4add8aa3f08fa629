//! Slug normalization.
//!
//! A slug is the canonical identifier of a snippet: lowercase ASCII letters and
//! digits separated by single hyphens, never starting or ending with one.

use crate::core::{Result, SnippetError};

/// Normalize an arbitrary string into a slug.
///
/// Trims the input, lowercases it, and replaces every maximal run of
/// non-alphanumeric characters with a single `-`, then strips leading and
/// trailing hyphens. Only ASCII letters and digits survive; case folding is
/// ASCII-only so the result does not depend on locale.
///
/// Normalization is idempotent: `normalize_slug(&normalize_slug(s)?)` equals
/// `normalize_slug(s)`.
///
/// # Errors
///
/// Returns [`SnippetError::InvalidSlug`] when the input is empty or
/// whitespace-only, or when nothing alphanumeric remains.
///
/// # Examples
///
/// ```rust
/// use mark_down::slug::normalize_slug;
///
/// assert_eq!(normalize_slug("Hello World!").unwrap(), "hello-world");
/// assert_eq!(normalize_slug("--Example--").unwrap(), "example");
/// assert!(normalize_slug("   ").is_err());
/// ```
pub fn normalize_slug(input: &str) -> Result<String> {
    let value = input.trim();
    if value.is_empty() {
        return Err(SnippetError::InvalidSlug {
            input: input.to_string(),
            reason: "cannot normalize an empty slug".to_string(),
        });
    }

    let mut normalized = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_hyphen = false;
            normalized.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if normalized.is_empty() {
        return Err(SnippetError::InvalidSlug {
            input: input.to_string(),
            reason: "slug does not contain any alphanumeric characters".to_string(),
        });
    }

    Ok(normalized)
}
