//! Shared data models for snippet operations
//!
//! These types are produced by the manifest loader and the front-matter
//! parser and handed out by the engine:
//!
//! - [`SnippetMeta`] - One manifest entry
//! - [`Snippet`] - A manifest entry enriched with its rendered document
//! - [`MetaFields`] - The recognized optional metadata fields, used for merging
//! - [`SearchFilter`] / [`ListOptions`] - Read-only projections over a manifest

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Open map of unrecognized metadata keys.
pub type ExtraFields = BTreeMap<String, Value>;

/// A manifest entry describing one snippet document.
///
/// `group` distinguishes three states: unset (`None`), explicitly absent
/// (`Some(None)`, written as `group: null`), and a named group
/// (`Some(Some(name))`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnippetMeta {
    /// Unique, normalized identifier.
    pub slug: String,

    /// Location of the document, relative to the manifest or absolute/URL.
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Snippet type. Uses `rename = "type"` to match the manifest format.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub snippet_type: Option<String>,

    /// Numeric sort key; absent sorts last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,

    /// Ordered tags, duplicates allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "deserialize_explicit_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,

    /// Manifest-author-defined metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: ExtraFields,
}

/// Keeps `null` distinct from a missing key: a present key always yields `Some`.
fn deserialize_explicit_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl SnippetMeta {
    /// Create an entry with only the required fields set.
    pub fn new(slug: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// The group name, if the entry belongs to a named group.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_ref().and_then(|g| g.as_deref())
    }

    /// Whether the entry carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.as_ref().is_some_and(|tags| tags.iter().any(|t| t == tag))
    }

    /// Overlay front-matter metadata onto this entry.
    ///
    /// Merging is per field: every field present in `overrides` replaces the
    /// entry's value, every absent field keeps it. `extra` keys are merged the
    /// same way, one key at a time.
    pub fn merge(&mut self, overrides: &MetaFields, extra: &ExtraFields) {
        if let Some(title) = &overrides.title {
            self.title = Some(title.clone());
        }
        if let Some(snippet_type) = &overrides.snippet_type {
            self.snippet_type = Some(snippet_type.clone());
        }
        if let Some(order) = overrides.order {
            self.order = Some(order);
        }
        if let Some(tags) = &overrides.tags {
            self.tags = Some(tags.clone());
        }
        if let Some(group) = &overrides.group {
            self.group = Some(group.clone());
        }
        if let Some(draft) = overrides.draft {
            self.draft = Some(draft);
        }
        for (key, value) in extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// A snippet: manifest metadata plus its rendered document.
///
/// Immutable once produced; the engine hands out shared references until
/// the snippet is invalidated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    /// Manifest metadata merged with the document's front-matter.
    #[serde(flatten)]
    pub meta: SnippetMeta,

    /// Markdown body after front-matter stripping.
    pub markdown: String,

    /// Rendered HTML of the body.
    pub html: String,
}

impl Snippet {
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.meta.slug
    }

    /// The source body that was rendered. Same text as [`Snippet::markdown`].
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.markdown
    }
}

/// The recognized optional metadata fields.
///
/// Every field is `None` when the key was absent or carried a value of the
/// wrong type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaFields {
    pub title: Option<String>,
    pub snippet_type: Option<String>,
    pub order: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub group: Option<Option<String>>,
    pub draft: Option<bool>,
}

impl MetaFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Metadata split into the slug, recognized fields and everything else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutedFields {
    pub slug: Option<String>,
    pub meta: MetaFields,
    pub extra: ExtraFields,
}

/// Route a metadata map into recognized fields and `extra`.
///
/// Recognized keys (`slug`, `title`, `type`, `order`, `tags`, `group`,
/// `draft`) are type-checked; a value of the wrong type is dropped rather
/// than coerced. Every other key lands in `extra` verbatim.
pub fn route_fields<I>(fields: I) -> RoutedFields
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut routed = RoutedFields::default();

    for (key, value) in fields {
        match key.as_str() {
            "slug" => routed.slug = value.as_str().map(str::to_string),
            "title" => routed.meta.title = value.as_str().map(str::to_string),
            "type" => routed.meta.snippet_type = value.as_str().map(str::to_string),
            "order" => routed.meta.order = value.as_f64(),
            "tags" => routed.meta.tags = normalize_tags(&value),
            "group" => match value {
                Value::String(group) => routed.meta.group = Some(Some(group)),
                Value::Null => routed.meta.group = Some(None),
                _ => {}
            },
            "draft" => routed.meta.draft = value.as_bool(),
            _ => {
                routed.extra.insert(key, value);
            }
        }
    }

    routed
}

/// Normalize a `tags` value.
///
/// A list is stringified per element; a string is split on commas, trimmed,
/// with empty tokens removed. Empty or falsy values yield `None`.
pub fn normalize_tags(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Value::String(s) if !s.is_empty() => Some(
            s.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(str::to_string).collect(),
        ),
        _ => None,
    }
}

/// How requested tags are matched against an entry's tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagsMode {
    /// At least one requested tag is present.
    #[default]
    Any,
    /// Every requested tag is present.
    All,
}

/// Filter for [`crate::engine::SnippetEngine::search`].
///
/// All configured criteria are combined with logical AND; an empty filter
/// matches every entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub snippet_type: Option<String>,
    pub group: Option<String>,
    pub tags: Vec<String>,
    pub tags_mode: TagsMode,
}

impl SearchFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, snippet_type: impl Into<String>) -> Self {
        self.snippet_type = Some(snippet_type.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I, mode: TagsMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.tags_mode = mode;
        self
    }

    /// Whether `meta` satisfies every criterion of this filter.
    #[must_use]
    pub fn matches(&self, meta: &SnippetMeta) -> bool {
        if let Some(snippet_type) = &self.snippet_type
            && meta.snippet_type.as_deref() != Some(snippet_type.as_str())
        {
            return false;
        }

        if let Some(group) = &self.group
            && meta.group_name() != Some(group.as_str())
        {
            return false;
        }

        if self.tags.is_empty() {
            return true;
        }

        match self.tags_mode {
            TagsMode::Any => self.tags.iter().any(|tag| meta.has_tag(tag)),
            TagsMode::All => self.tags.iter().all(|tag| meta.has_tag(tag)),
        }
    }
}

/// Pagination applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Number of leading entries to skip.
    pub offset: usize,
    /// Maximum number of entries to return.
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let items = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => items.take(limit).collect(),
            None => items.collect(),
        }
    }
}
