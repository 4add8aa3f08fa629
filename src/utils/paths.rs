//! Resolution of snippet document locations.
//!
//! Manifest entries declare where their document lives, usually relative to
//! the manifest itself. [`resolve_document_path`] turns that declaration into
//! the address handed to the fetcher. Rules, in priority order:
//!
//! 1. An absolute URL (`scheme:...`) or protocol-relative `//host/...` path is
//!    returned with duplicate separators collapsed.
//! 2. An explicit base is joined with the path. URL bases use URL resolution;
//!    other bases are joined as `/`-separated segments with exactly one
//!    separator between them.
//! 3. Otherwise the manifest location's directory is the implicit base. A path
//!    starting with `/` is already rooted and is not joined.
//! 4. Otherwise the path is returned normalized.
//!
//! Resolution is pure: nothing here touches the network or the filesystem.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").expect("scheme pattern is valid"));

/// Whether `location` starts with a URL scheme such as `https:` or `file:`.
///
/// Single-letter schemes are not accepted so that Windows drive letters
/// (`C:\...`) stay filesystem paths.
#[must_use]
pub fn is_absolute_url(location: &str) -> bool {
    URL_SCHEME.is_match(location)
}

fn is_protocol_relative(location: &str) -> bool {
    location.starts_with("//")
}

/// Collapse runs of two or more `/` into one.
///
/// The `//` after a URL scheme and a protocol-relative leading `//` are kept.
/// Query strings and fragments are left untouched.
///
/// ```rust
/// use mark_down::utils::paths::normalize_separators;
///
/// assert_eq!(normalize_separators("https://cdn.example.com/a//b.md"), "https://cdn.example.com/a/b.md");
/// assert_eq!(normalize_separators("//cdn.example.com//x.md"), "//cdn.example.com/x.md");
/// assert_eq!(normalize_separators("docs///x.md"), "docs/x.md");
/// ```
#[must_use]
pub fn normalize_separators(location: &str) -> String {
    let (prefix, rest) = if let Some(m) = URL_SCHEME.find(location) {
        let after_scheme = &location[m.end()..];
        if let Some(stripped) = after_scheme.strip_prefix("//") {
            (&location[..m.end() + 2], stripped)
        } else {
            (&location[..m.end()], after_scheme)
        }
    } else if is_protocol_relative(location) {
        ("//", location.trim_start_matches('/'))
    } else {
        ("", location)
    };

    let split = rest.find(['?', '#']).unwrap_or(rest.len());
    let (path, tail) = rest.split_at(split);

    let mut out = String::with_capacity(location.len());
    out.push_str(prefix);
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    out.push_str(tail);
    out
}

/// Join a base and a relative path.
///
/// URL bases are resolved with URL semantics, treating the base as a
/// directory. Other bases are joined as path segments: one leading separator
/// is stripped from `relative` and exactly one separator sits between the two.
///
/// ```rust
/// use mark_down::utils::paths::join_path;
///
/// assert_eq!(join_path("/assets/content", "docs/x.md"), "/assets/content/docs/x.md");
/// assert_eq!(join_path("/assets/content/", "/docs/x.md"), "/assets/content/docs/x.md");
/// assert_eq!(
///     join_path("https://cdn.example.com/content", "docs/x.md"),
///     "https://cdn.example.com/content/docs/x.md"
/// );
/// ```
#[must_use]
pub fn join_path(base: &str, relative: &str) -> String {
    let relative = relative.strip_prefix('/').unwrap_or(relative);

    if is_absolute_url(base)
        && let Ok(base_url) = Url::parse(&as_directory(base))
        && let Ok(joined) = base_url.join(relative)
    {
        return normalize_separators(joined.as_str());
    }

    if base.is_empty() {
        return normalize_separators(relative);
    }

    normalize_separators(&format!("{}/{}", base.trim_end_matches('/'), relative))
}

fn as_directory(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

/// The directory containing `location`, with a trailing `/`.
///
/// For URLs the query and fragment are dropped. Returns `None` when the
/// location has no directory component (a bare file name).
///
/// ```rust
/// use mark_down::utils::paths::parent_location;
///
/// assert_eq!(
///     parent_location("https://cdn.example.com/content/manifest.json?v=2").as_deref(),
///     Some("https://cdn.example.com/content/")
/// );
/// assert_eq!(parent_location("/assets/snippets/index.json").as_deref(), Some("/assets/snippets/"));
/// assert_eq!(parent_location("index.json"), None);
/// ```
#[must_use]
pub fn parent_location(location: &str) -> Option<String> {
    if is_absolute_url(location)
        && let Ok(url) = Url::parse(location)
        && !url.cannot_be_a_base()
    {
        return url.join("./").ok().map(|dir| dir.to_string());
    }

    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    path.rfind('/').map(|idx| path[..=idx].to_string())
}

/// Compute the address a document is fetched from.
///
/// `manifest_location` is the location the manifest was loaded from, when it
/// was loaded from a location at all. See the module docs for the rules.
///
/// ```rust
/// use mark_down::utils::paths::resolve_document_path;
///
/// assert_eq!(
///     resolve_document_path("docs/x.md", None, Some("/assets/content")),
///     "/assets/content/docs/x.md"
/// );
/// assert_eq!(
///     resolve_document_path("company/team.md", Some("https://cdn.example.com/content/manifest.json"), None),
///     "https://cdn.example.com/content/company/team.md"
/// );
/// ```
#[must_use]
pub fn resolve_document_path(
    document_path: &str,
    manifest_location: Option<&str>,
    explicit_base: Option<&str>,
) -> String {
    if is_absolute_url(document_path) || is_protocol_relative(document_path) {
        return normalize_separators(document_path);
    }

    if let Some(base) = explicit_base.filter(|b| !b.is_empty()) {
        return join_path(base, document_path);
    }

    if !document_path.starts_with('/')
        && let Some(dir) = manifest_location.and_then(parent_location)
    {
        return join_path(&dir, document_path);
    }

    normalize_separators(document_path)
}
