//! Manifest sources, validation and document path resolution.

use mark_down::core::SnippetError;
use mark_down::engine::SnippetEngine;
use mark_down::manifest::{ManifestSource, build_manifest_file};
use mark_down::models::{ListOptions, SnippetMeta};
use mark_down::test_utils::{MockFetcher, SnippetFixture};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{sample_manifest, write_sample_site};

#[tokio::test]
async fn test_file_manifest_resolves_documents_next_to_it() {
    let temp = TempDir::new().unwrap();
    let fixture = write_sample_site(temp.path());
    let manifest = fixture.write_manifest(&sample_manifest()).unwrap();

    let engine = SnippetEngine::new(manifest);
    let snippet = engine.get("button").await.unwrap();

    assert!(snippet.html.contains("<h1>Button</h1>"));
    assert_eq!(snippet.meta.order, Some(2.0));
}

#[tokio::test]
async fn test_file_url_manifest() {
    let temp = TempDir::new().unwrap();
    let fixture = write_sample_site(temp.path());
    let manifest = fixture.write_manifest(&sample_manifest()).unwrap();
    let url = url::Url::from_file_path(&manifest).unwrap();

    let engine = SnippetEngine::new(url.to_string());
    let snippet = engine.get("card").await.unwrap();

    assert!(snippet.html.contains("<h1>Card</h1>"));
}

#[tokio::test]
async fn test_built_manifest_round_trips_through_engine() {
    let temp = TempDir::new().unwrap();
    write_sample_site(temp.path());
    let report = build_manifest_file(temp.path(), None).unwrap();

    let engine = SnippetEngine::new(report.output_path.clone());
    let slugs: Vec<String> = engine.list_all().await.unwrap().into_iter().map(|m| m.slug).collect();
    assert_eq!(slugs, vec!["components-card", "components-button", "intro"]);

    let components = engine.list_by_group("components", ListOptions::default()).await.unwrap();
    assert_eq!(components.len(), 2);

    let intro = engine.get("intro").await.unwrap();
    assert_eq!(intro.meta.title.as_deref(), Some("Intro Override"));
}

#[tokio::test]
async fn test_explicit_base_overrides_manifest_directory() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_document("/assets/snippets/manifest.json", r#"[{"slug": "intro", "path": "guides/introduction.md"}]"#)
            .with_document("/assets/snippets/content/guides/introduction.md", "# Hi"),
    );
    let engine = SnippetEngine::builder("/assets/snippets/manifest.json")
        .base("/assets/snippets/content")
        .fetcher(Arc::clone(&fetcher))
        .build();

    engine.get("intro").await.unwrap();
    assert_eq!(fetcher.calls("/assets/snippets/content/guides/introduction.md"), 1);
}

#[tokio::test]
async fn test_implicit_base_from_manifest_url() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_document(
                "https://cdn.example.com/content/manifest.json?v=3",
                r#"[{"slug": "team", "path": "company//team.md"}]"#,
            )
            .with_document("https://cdn.example.com/content/company/team.md", "# Team"),
    );
    let engine = SnippetEngine::builder("https://cdn.example.com/content/manifest.json?v=3")
        .fetcher(Arc::clone(&fetcher))
        .build();

    let entries = engine.list_all().await.unwrap();
    assert_eq!(entries[0].path, "company/team.md");
    assert!(engine.get("team").await.is_ok());
}

#[tokio::test]
async fn test_absolute_document_urls_are_fetched_as_is() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_document("/index.json", r#"[{"slug": "remote", "path": "https://cdn.example.com/a//b.md"}]"#)
            .with_document("https://cdn.example.com/a/b.md", "# Remote"),
    );
    let engine = SnippetEngine::builder("/index.json").base("/ignored").fetcher(Arc::clone(&fetcher)).build();

    assert!(engine.get("remote").await.is_ok());
    assert_eq!(fetcher.calls("https://cdn.example.com/a/b.md"), 1);
}

#[tokio::test]
async fn test_entry_without_path_fails_before_any_document_fetch() {
    let fetcher = Arc::new(MockFetcher::new().with_document(
        "/index.json",
        r#"[{"slug": "ok", "path": "ok.md"}, {"slug": "broken"}]"#,
    ));
    let engine = SnippetEngine::builder("/index.json").fetcher(Arc::clone(&fetcher)).build();

    let err = engine.get("ok").await.unwrap_err();
    assert!(matches!(err, SnippetError::ManifestLoad { .. }));
    assert!(err.to_string().contains("entry 1"));
    assert_eq!(fetcher.total_calls(), 1);
}

#[tokio::test]
async fn test_unnormalized_manifest_slug_is_rejected() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_document("/index.json", r#"[{"slug": "Hello World", "path": "hello.md"}]"#)
            .with_document("/hello.md", "# Hello"),
    );
    let engine = SnippetEngine::builder("/index.json").fetcher(Arc::clone(&fetcher)).build();

    let err = engine.get("hello-world").await.unwrap_err();
    assert!(matches!(err, SnippetError::ManifestLoad { .. }));
    assert!(err.to_string().contains("not normalized"));
    assert!(err.to_string().contains("manifest '/index.json'"));
    assert_eq!(fetcher.calls("/hello.md"), 0);

    let engine = SnippetEngine::new(vec![SnippetMeta::new("!!!", "bang.md")]);
    let err = engine.list_all().await.unwrap_err();
    assert!(err.to_string().contains("invalid slug '!!!'"));
}

#[tokio::test]
async fn test_non_array_manifest_is_rejected() {
    let fetcher = Arc::new(MockFetcher::new().with_document("/index.json", r#"{"slug": "a"}"#));
    let engine = SnippetEngine::builder("/index.json").fetcher(Arc::clone(&fetcher)).build();

    let err = engine.list_all().await.unwrap_err();
    assert!(err.to_string().contains("JSON array"));
}

#[tokio::test]
async fn test_unreachable_manifest_keeps_cause() {
    let temp = TempDir::new().unwrap();
    let engine = SnippetEngine::new(temp.path().join("missing.json"));

    let err = engine.list_all().await.unwrap_err();
    assert!(matches!(err, SnippetError::ManifestLoad { .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_duplicate_slugs_rejected_at_runtime() {
    let entries = vec![SnippetMeta::new("same", "a.md"), SnippetMeta::new("same", "b.md")];
    let engine = SnippetEngine::new(entries);

    let err = engine.list_all().await.unwrap_err();
    assert!(err.to_string().contains("duplicate slug 'same'"));
}

#[tokio::test]
async fn test_sync_producer_source() {
    let temp = TempDir::new().unwrap();
    let fixture = SnippetFixture::new(temp.path());
    fixture.write_document("a.md", "# A").unwrap();

    let root = temp.path().to_string_lossy().into_owned();
    let source = ManifestSource::from_fn(|| Ok(vec![SnippetMeta::new("a", "a.md")]));
    let engine = SnippetEngine::builder(source).base(root).build();

    assert!(engine.get_html("a").await.unwrap().contains("<h1>A</h1>"));
}
