//! Markdown rendering and front-matter handling for snippet documents.
//!
//! # Document Format
//!
//! A snippet document is UTF-8 text, optionally starting with a YAML
//! front-matter block, followed by a markdown body:
//!
//! ```markdown
//! ---
//! title: "Button"
//! type: component
//! tags: [ui, interactive]
//! variant: lead
//! ---
//!
//! # Button
//!
//! Buttons trigger actions.
//! ```
//!
//! # Rendering
//!
//! The engine renders bodies through the [`Renderer`] trait. The default
//! [`ComrakRenderer`] produces CommonMark HTML with the GitHub-flavored
//! extensions (tables, strikethrough, autolinks, task lists). Any
//! `Fn(&str) -> String` closure is also a renderer, and asynchronous renderers
//! implement the trait directly.
//!
//! Rendered HTML is not sanitized; raw HTML in the markdown is passed through.
//! Presentation layers are expected to sanitize before inserting it in a page.

pub mod frontmatter;

use futures::future::BoxFuture;
use tracing::warn;

pub use frontmatter::{FrontMatterBoundaries, ParsedFrontMatter, parse_front_matter};

/// Markdown-to-HTML transform injected into the engine.
pub trait Renderer: Send + Sync {
    /// Render a markdown body to HTML. May suspend.
    fn render<'a>(&'a self, markdown: &'a str) -> BoxFuture<'a, anyhow::Result<String>>;
}

impl<F> Renderer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn render<'a>(&'a self, markdown: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        let html = self(markdown);
        Box::pin(async move { Ok(html) })
    }
}

/// The default renderer, backed by `comrak`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakRenderer;

impl ComrakRenderer {
    /// Render synchronously.
    #[must_use]
    pub fn render_html(&self, markdown: &str) -> String {
        comrak::markdown_to_html(markdown, &comrak_options())
    }
}

impl Renderer for ComrakRenderer {
    fn render<'a>(&'a self, markdown: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async move { Ok(self.render_html(markdown)) })
    }
}

fn comrak_options() -> comrak::Options<'static> {
    let mut options = comrak::Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = true;
    options
}

/// A standalone document rendered outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
    /// The parsed front-matter, when parsing was requested and succeeded.
    pub front_matter: Option<ParsedFrontMatter>,
}

/// Render a standalone document, e.g. an inline block embedded in a page.
///
/// When `process_front_matter` is set the leading block is split off first.
/// A malformed block is not an error here: a warning is logged and the whole
/// text is rendered as markdown.
///
/// # Examples
///
/// ```rust
/// use mark_down::markdown::render_document;
///
/// let doc = render_document("---\nslug: intro\n---\n# Introduction", true);
/// assert!(doc.html.contains("<h1>Introduction</h1>"));
/// assert_eq!(doc.front_matter.unwrap().slug.as_deref(), Some("intro"));
/// ```
#[must_use]
pub fn render_document(raw: &str, process_front_matter: bool) -> RenderedDocument {
    let front_matter = if process_front_matter {
        match parse_front_matter(raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Failed to parse front-matter of inline document: {e}");
                None
            }
        }
    } else {
        None
    };

    let body = front_matter.as_ref().map_or(raw, |fm| fm.content.as_str());
    let html = ComrakRenderer.render_html(body);

    RenderedDocument {
        html,
        front_matter,
    }
}
