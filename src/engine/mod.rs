//! The snippet engine: manifest and snippet resolution with caching.
//!
//! A [`SnippetEngine`] owns two caches for its whole lifetime:
//!
//! - the **manifest snapshot**, loaded lazily on first use from its
//!   [`ManifestSource`]
//! - the **snippet cache**, one entry per slug, filled on the first
//!   [`SnippetEngine::get`] for that slug
//!
//! Both caches memoize the in-flight load, so concurrent callers share a
//! single fetch. Nothing expires on its own: callers drop entries with
//! [`SnippetEngine::invalidate`] or [`SnippetEngine::invalidate_slug`], for
//! example in response to a file-watch event.
//!
//! Engines are independent. Cloning an engine yields another handle on the
//! same caches; building a second engine yields fresh ones.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mark_down::engine::SnippetEngine;
//! use mark_down::models::{ListOptions, SearchFilter, TagsMode};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = SnippetEngine::builder("https://cdn.example.com/content/snippets-index.json")
//!     .verbose(true)
//!     .build();
//!
//! let snippet = engine.get("getting-started").await?;
//! println!("{}", snippet.html);
//!
//! let ui = engine
//!     .search(&SearchFilter::new().with_tags(["ui"], TagsMode::Any), ListOptions::default())
//!     .await?;
//! println!("{} UI snippets", ui.len());
//! # Ok(())
//! # }
//! ```

mod cache;
mod options;

pub use options::{EngineOptions, FrontMatterPolicy};

use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{Result, SnippetError, cause};
use crate::fetch::{DefaultFetcher, Fetcher};
use crate::manifest::{ManifestSource, load_manifest};
use crate::markdown::frontmatter::{ParsedFrontMatter, parse_front_matter};
use crate::markdown::{ComrakRenderer, Renderer};
use crate::models::{ListOptions, SearchFilter, Snippet, SnippetMeta};
use crate::slug::normalize_slug;
use crate::utils::paths::resolve_document_path;
use cache::{MemoCell, MemoMap};

/// Resolves, renders and caches snippets.
#[derive(Clone)]
pub struct SnippetEngine {
    inner: Arc<Inner>,
}

struct Inner {
    source: ManifestSource,
    options: EngineOptions,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    manifest: MemoCell<Vec<SnippetMeta>>,
    snippets: MemoMap<Snippet>,
}

impl fmt::Debug for SnippetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnippetEngine")
            .field("source", &self.inner.source)
            .field("options", &self.inner.options)
            .field("cached_snippets", &self.inner.snippets.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SnippetEngine`].
pub struct SnippetEngineBuilder {
    source: ManifestSource,
    options: EngineOptions,
    fetcher: Option<Arc<dyn Fetcher>>,
    renderer: Option<Arc<dyn Renderer>>,
}

impl SnippetEngineBuilder {
    /// Replace every option at once.
    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Base joined with relative document paths.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.options.base = Some(base.into());
        self
    }

    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.options.cache = enabled;
        self
    }

    #[must_use]
    pub fn front_matter(mut self, enabled: bool) -> Self {
        self.options.front_matter = enabled;
        self
    }

    #[must_use]
    pub fn front_matter_policy(mut self, policy: FrontMatterPolicy) -> Self {
        self.options.front_matter_policy = policy;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.options.verbose = verbose;
        self
    }

    /// Fetcher used for the manifest location and every document.
    #[must_use]
    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Renderer applied to every document body.
    #[must_use]
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    #[must_use]
    pub fn build(self) -> SnippetEngine {
        SnippetEngine {
            inner: Arc::new(Inner {
                source: self.source,
                options: self.options,
                fetcher: self.fetcher.unwrap_or_else(|| Arc::new(DefaultFetcher::new())),
                renderer: self.renderer.unwrap_or_else(|| Arc::new(ComrakRenderer)),
                manifest: MemoCell::new(),
                snippets: MemoMap::new(),
            }),
        }
    }
}

impl SnippetEngine {
    /// Start configuring an engine reading its manifest from `source`.
    pub fn builder(source: impl Into<ManifestSource>) -> SnippetEngineBuilder {
        SnippetEngineBuilder {
            source: source.into(),
            options: EngineOptions::default(),
            fetcher: None,
            renderer: None,
        }
    }

    /// An engine with default options, fetcher and renderer.
    pub fn new(source: impl Into<ManifestSource>) -> Self {
        Self::builder(source).build()
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    /// Fetch, parse and render the snippet registered under `slug`.
    ///
    /// The slug must match a manifest entry exactly. Concurrent calls for the
    /// same slug share one fetch and render.
    ///
    /// # Errors
    ///
    /// - [`SnippetError::ManifestLoad`] when the manifest or the document
    ///   cannot be loaded
    /// - [`SnippetError::SnippetNotFound`] when no entry has this slug
    /// - [`SnippetError::FrontMatterParse`] for malformed front-matter under
    ///   the strict policy
    /// - [`SnippetError::Render`] when the renderer fails
    pub async fn get(&self, slug: &str) -> Result<Arc<Snippet>> {
        let manifest = self.manifest().await?;
        let entry = manifest.iter().find(|entry| entry.slug == slug).cloned().ok_or_else(|| {
            SnippetError::SnippetNotFound {
                slug: slug.to_string(),
            }
        })?;

        let inner = Arc::clone(&self.inner);
        if !self.inner.options.cache {
            return inner.load_snippet(entry).await.map(Arc::new);
        }

        self.inner
            .snippets
            .resolve(slug, move || {
                debug!("Snippet cache miss for '{}'", entry.slug);
                async move { inner.load_snippet(entry).await.map(Arc::new) }.boxed()
            })
            .await
    }

    /// The rendered HTML of `slug`.
    ///
    /// # Errors
    ///
    /// Same as [`SnippetEngine::get`].
    pub async fn get_html(&self, slug: &str) -> Result<String> {
        Ok(self.get(slug).await?.html.clone())
    }

    /// Every manifest entry, in manifest order.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::ManifestLoad`] when the manifest cannot be loaded.
    pub async fn list_all(&self) -> Result<Vec<SnippetMeta>> {
        self.list(ListOptions::default()).await
    }

    /// Manifest entries with pagination applied.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::ManifestLoad`] when the manifest cannot be loaded.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<SnippetMeta>> {
        self.list_where(|_| true, options).await
    }

    /// Manifest entries accepted by `predicate`, with pagination applied.
    ///
    /// Never fetches documents.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::ManifestLoad`] when the manifest cannot be loaded.
    pub async fn list_where<P>(&self, predicate: P, options: ListOptions) -> Result<Vec<SnippetMeta>>
    where
        P: Fn(&SnippetMeta) -> bool,
    {
        let manifest = self.manifest().await?;
        Ok(options.apply(manifest.iter().filter(|entry| predicate(entry)).cloned()))
    }

    /// Entries whose group is `group`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::ManifestLoad`] when the manifest cannot be loaded.
    pub async fn list_by_group(&self, group: &str, options: ListOptions) -> Result<Vec<SnippetMeta>> {
        self.list_where(|entry| entry.group_name() == Some(group), options).await
    }

    /// Entries whose type is `snippet_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::ManifestLoad`] when the manifest cannot be loaded.
    pub async fn list_by_type(&self, snippet_type: &str, options: ListOptions) -> Result<Vec<SnippetMeta>> {
        self.list_where(|entry| entry.snippet_type.as_deref() == Some(snippet_type), options).await
    }

    /// Entries matching every criterion of `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::ManifestLoad`] when the manifest cannot be loaded.
    pub async fn search(&self, filter: &SearchFilter, options: ListOptions) -> Result<Vec<SnippetMeta>> {
        self.list_where(|entry| filter.matches(entry), options).await
    }

    /// Drop the manifest snapshot and every cached snippet.
    pub fn invalidate(&self) {
        debug!("Invalidating manifest and snippet caches");
        self.inner.manifest.clear();
        self.inner.snippets.clear();
    }

    /// Drop the cached snippet for `slug`. Returns whether one was cached.
    pub fn invalidate_slug(&self, slug: &str) -> bool {
        debug!("Invalidating cached snippet '{}'", slug);
        self.inner.snippets.remove(slug)
    }

    async fn manifest(&self) -> Result<Arc<Vec<SnippetMeta>>> {
        let inner = Arc::clone(&self.inner);
        if !self.inner.options.cache {
            return inner.load_manifest().await.map(Arc::new);
        }

        self.inner
            .manifest
            .resolve(move || async move { inner.load_manifest().await.map(Arc::new) }.boxed())
            .await
    }
}

impl Inner {
    async fn load_manifest(&self) -> Result<Vec<SnippetMeta>> {
        let entries = load_manifest(&self.source, self.fetcher.as_ref()).await?;
        debug!("Loaded manifest with {} entries", entries.len());
        Ok(entries)
    }

    async fn load_snippet(&self, meta: SnippetMeta) -> Result<Snippet> {
        let location =
            resolve_document_path(&meta.path, self.source.location(), self.options.base.as_deref());
        debug!("Fetching snippet '{}' from {}", meta.slug, location);

        let raw = self.fetcher.fetch(&location).await.map_err(|e| {
            SnippetError::manifest_load_with(
                format!("Failed to fetch snippet '{}' from '{location}'", meta.slug),
                e,
            )
        })?;

        let (meta, markdown) = self.apply_front_matter(meta, raw)?;

        let html = self.renderer.render(&markdown).await.map_err(|e| SnippetError::Render {
            slug: meta.slug.clone(),
            source: Some(cause(e)),
        })?;

        Ok(Snippet {
            meta,
            markdown,
            html,
        })
    }

    fn apply_front_matter(&self, mut meta: SnippetMeta, raw: String) -> Result<(SnippetMeta, String)> {
        if !self.options.front_matter {
            return Ok((meta, raw));
        }

        let parsed = match parse_front_matter(&raw) {
            Ok(parsed) => parsed,
            Err(e) => match self.options.front_matter_policy {
                FrontMatterPolicy::Strict => return Err(e.with_slug(&meta.slug)),
                FrontMatterPolicy::Lenient => {
                    warn!("Ignoring malformed front-matter in snippet '{}': {}", meta.slug, e);
                    return Ok((meta, raw));
                }
            },
        };

        if self.options.verbose {
            report_diagnostics(&meta.slug, &parsed);
        }

        meta.merge(&parsed.meta, &parsed.extra);
        Ok((meta, parsed.content))
    }
}

/// Verbose-only warnings; never change the returned snippet.
fn report_diagnostics(manifest_slug: &str, parsed: &ParsedFrontMatter) {
    if parsed.ignored_data {
        warn!("Front-matter of snippet '{}' is not a key-value mapping and was ignored", manifest_slug);
    }

    let Some(own_slug) = parsed.slug.as_deref() else {
        return;
    };
    match normalize_slug(own_slug) {
        Ok(normalized) if normalized != manifest_slug => warn!(
            "Front-matter slug '{}' of snippet '{}' does not match its manifest slug",
            own_slug, manifest_slug
        ),
        Ok(_) => {}
        Err(e) => warn!("Front-matter slug of snippet '{}' is unusable: {}", manifest_slug, e),
    }
}
