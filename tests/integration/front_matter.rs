//! Front-matter merging, toggles and policies through the engine.

use mark_down::core::SnippetError;
use mark_down::engine::{FrontMatterPolicy, SnippetEngine};
use mark_down::models::SnippetMeta;
use mark_down::test_utils::{LogCapture, MockFetcher, init_test_logging};
use serde_json::json;
use std::sync::Arc;
use tracing::Level;

use crate::common::INTRO;

fn single(meta: SnippetMeta, document: &str) -> (SnippetEngine, Arc<MockFetcher>) {
    let location = format!("/content/{}", meta.path);
    let fetcher = Arc::new(MockFetcher::new().with_document(location, document));
    let engine = SnippetEngine::builder(vec![meta]).base("/content").fetcher(Arc::clone(&fetcher)).build();
    (engine, fetcher)
}

fn intro_meta() -> SnippetMeta {
    let mut meta = SnippetMeta::new("intro", "guides/intro.md");
    meta.title = Some("Introduction".to_string());
    meta.snippet_type = Some("guide".to_string());
    meta.order = Some(1.0);
    meta.extra.insert("hero".to_string(), json!(false));
    meta
}

#[tokio::test]
async fn test_front_matter_wins_per_field() {
    let (engine, _) = single(intro_meta(), INTRO);

    let snippet = engine.get("intro").await.unwrap();

    assert_eq!(snippet.meta.title.as_deref(), Some("Intro Override"));
    assert_eq!(snippet.meta.snippet_type.as_deref(), Some("guide"));
    assert_eq!(snippet.meta.order, Some(1.0));
    assert_eq!(snippet.meta.tags, Some(vec!["docs".to_string(), "start".to_string()]));
    assert_eq!(snippet.meta.extra.get("custom"), Some(&json!(true)));
    assert_eq!(snippet.meta.extra.get("hero"), Some(&json!(false)));
    assert!(snippet.markdown.starts_with("# Introduction"));
    assert!(snippet.html.contains("<p>Welcome.</p>"));
}

#[tokio::test]
async fn test_explicit_null_group_overrides_manifest_group() {
    let mut meta = SnippetMeta::new("loose", "loose.md");
    meta.group = Some(Some("components".to_string()));
    let (engine, _) = single(meta, "---\ngroup: null\n---\nBody");

    let snippet = engine.get("loose").await.unwrap();
    assert_eq!(snippet.meta.group, Some(None));
}

#[tokio::test]
async fn test_manifest_slug_is_authoritative() {
    init_test_logging(Some(Level::WARN));
    let meta = SnippetMeta::new("about", "about.md");
    let fetcher = Arc::new(MockFetcher::new().with_document("/content/about.md", "---\nslug: ABOUT-US\n---\nBody"));
    let engine = SnippetEngine::builder(vec![meta])
        .base("/content")
        .verbose(true)
        .fetcher(Arc::clone(&fetcher))
        .build();

    let snippet = engine.get("about").await.unwrap();
    assert_eq!(snippet.slug(), "about");

    let err = engine.get("about-us").await.unwrap_err();
    assert!(matches!(err, SnippetError::SnippetNotFound { .. }));
}

fn about_engine(document: &str, verbose: bool) -> SnippetEngine {
    let fetcher = MockFetcher::new().with_document("/content/about.md", document);
    SnippetEngine::builder(vec![SnippetMeta::new("about", "about.md")])
        .base("/content")
        .verbose(verbose)
        .fetcher(fetcher)
        .build()
}

#[tokio::test]
async fn test_slug_mismatch_warns_only_when_verbose() {
    for verbose in [true, false] {
        let logs = LogCapture::new();
        let _guard = logs.set_default(Level::WARN);

        let snippet = about_engine("---\nslug: ABOUT-US\n---\nBody", verbose).get("about").await.unwrap();
        assert_eq!(snippet.slug(), "about");

        let output = logs.contents();
        assert_eq!(output.contains("does not match its manifest slug"), verbose, "verbose={verbose}: {output}");
        if verbose {
            assert!(output.contains("Front-matter slug 'ABOUT-US'"));
            assert!(output.contains("WARN"));
        }
    }
}

#[tokio::test]
async fn test_slug_equal_after_normalization_does_not_warn() {
    let logs = LogCapture::new();
    let _guard = logs.set_default(Level::WARN);

    about_engine("---\nslug: About\n---\nBody", true).get("about").await.unwrap();

    assert!(!logs.contents().contains("does not match"), "{}", logs.contents());
}

#[tokio::test]
async fn test_front_matter_disabled() {
    let mut meta = SnippetMeta::new("hidden", "hidden.md");
    meta.title = Some("Manifest Title".to_string());
    let fetcher = Arc::new(
        MockFetcher::new().with_document("/content/hidden.md", "---\ntitle: Hidden\n---\n# Body"),
    );
    let engine = SnippetEngine::builder(vec![meta])
        .base("/content")
        .front_matter(false)
        .fetcher(Arc::clone(&fetcher))
        .build();

    let snippet = engine.get("hidden").await.unwrap();
    assert_eq!(snippet.meta.title.as_deref(), Some("Manifest Title"));
    assert!(snippet.raw().contains("title: Hidden"));
}

#[tokio::test]
async fn test_malformed_front_matter_policies() {
    let broken = "---\ntitle: [\"unterminated\n---\n\nContent";

    let (strict, _) = single(intro_meta(), broken);
    let err = strict.get("intro").await.unwrap_err();
    assert!(matches!(err, SnippetError::FrontMatterParse { .. }));
    assert!(err.to_string().contains("intro"));

    let fetcher = Arc::new(MockFetcher::new().with_document("/content/guides/intro.md", broken));
    let lenient = SnippetEngine::builder(vec![intro_meta()])
        .base("/content")
        .front_matter_policy(FrontMatterPolicy::Lenient)
        .fetcher(Arc::clone(&fetcher))
        .build();
    let snippet = lenient.get("intro").await.unwrap();
    assert_eq!(snippet.meta.title.as_deref(), Some("Introduction"));
    assert!(snippet.markdown.contains("Content"));
}

#[tokio::test]
async fn test_non_mapping_front_matter_is_ignored() {
    let (engine, _) = single(intro_meta(), "---\n- just\n- a list\n---\nBody");

    let snippet = engine.get("intro").await.unwrap();
    assert_eq!(snippet.meta.title.as_deref(), Some("Introduction"));
    assert_eq!(snippet.markdown, "Body");
}

#[tokio::test]
async fn test_custom_renderer() {
    let fetcher = Arc::new(MockFetcher::new().with_document("/content/guides/intro.md", INTRO));
    let engine = SnippetEngine::builder(vec![intro_meta()])
        .base("/content")
        .renderer(|markdown: &str| format!("<pre>{}</pre>", markdown.len()))
        .fetcher(Arc::clone(&fetcher))
        .build();

    let html = engine.get_html("intro").await.unwrap();
    assert!(html.starts_with("<pre>"));
}
