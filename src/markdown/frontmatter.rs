//! Front-matter extraction for snippet documents.
//!
//! A front-matter block is YAML between two `---` marker lines at the very
//! start of a document. A leading byte-order mark and blank lines before the
//! opening marker are tolerated; blank lines after the closing marker are
//! dropped from the body.
//!
//! ```text
//! ---
//! title: Introduction
//! tags: [docs, start]
//! ---
//! # Hello
//! ```
//!
//! Parsing is structural only: the body is never inspected. Recognized keys
//! are routed through [`crate::models::route_fields`]; all other keys are
//! returned in `extra`.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::{Result, SnippetError, cause};
use crate::models::{ExtraFields, MetaFields, route_fields};

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\x{FEFF}?[ \t\r\n]*---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(?:[ \t]*\r?\n)*")
        .expect("front-matter pattern is valid")
});

/// Byte boundaries of the front-matter section, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterBoundaries {
    /// Always 0: the block is anchored at the start of the document.
    pub start: usize,
    /// First byte of the body.
    pub end: usize,
}

/// Result of splitting a document into front-matter and body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedFrontMatter {
    /// The body with the front-matter block removed, or the whole input when
    /// there was no block.
    pub content: String,

    /// Recognized metadata fields.
    pub meta: MetaFields,

    /// Unrecognized keys, verbatim.
    pub extra: ExtraFields,

    /// The document's own `slug`, as written (not normalized).
    pub slug: Option<String>,

    /// Whether a front-matter block was found.
    pub has_front_matter: bool,

    /// Set when the block held YAML that is not a mapping (a list or a
    /// scalar); its data is ignored.
    pub ignored_data: bool,
}

/// Locate the front-matter block, if any.
#[must_use]
pub fn front_matter_boundaries(raw: &str) -> Option<FrontMatterBoundaries> {
    FRONT_MATTER.find(raw).map(|m| FrontMatterBoundaries {
        start: m.start(),
        end: m.end(),
    })
}

/// Split `raw` into metadata and body.
///
/// # Errors
///
/// Returns [`SnippetError::FrontMatterParse`] when the markers are present but
/// the YAML between them does not parse. Whether that is fatal is the
/// caller's decision.
///
/// # Examples
///
/// ```rust
/// use mark_down::markdown::frontmatter::parse_front_matter;
///
/// let parsed = parse_front_matter("---\ntitle: Intro\ncustom: true\n---\n# Hello").unwrap();
/// assert!(parsed.has_front_matter);
/// assert_eq!(parsed.meta.title.as_deref(), Some("Intro"));
/// assert!(parsed.extra.contains_key("custom"));
/// assert_eq!(parsed.content, "# Hello");
/// ```
pub fn parse_front_matter(raw: &str) -> Result<ParsedFrontMatter> {
    let Some(captures) = FRONT_MATTER.captures(raw) else {
        return Ok(ParsedFrontMatter {
            content: raw.to_string(),
            ..Default::default()
        });
    };

    let whole = captures.get(0).map_or(0, |m| m.end());
    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let content = raw[whole..].to_string();

    let data: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| SnippetError::FrontMatterParse {
            slug: None,
            reason: e.to_string(),
            source: Some(cause(e)),
        })?;

    let mapping = match data {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        _ => {
            return Ok(ParsedFrontMatter {
                content,
                has_front_matter: true,
                ignored_data: true,
                ..Default::default()
            });
        }
    };

    let routed = route_fields(mapping.into_iter().map(|(key, value)| (yaml_key(key), to_json(value))));

    Ok(ParsedFrontMatter {
        content,
        meta: routed.meta,
        extra: routed.extra,
        slug: routed.slug,
        has_front_matter: true,
        ignored_data: false,
    })
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => serde_yaml::to_string(&other).map(|s| s.trim_end().to_string()).unwrap_or_default(),
    }
}

fn to_json(value: serde_yaml::Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
