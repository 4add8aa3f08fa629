//! Request collapsing, cache toggles and invalidation.

use mark_down::engine::SnippetEngine;
use mark_down::manifest::ManifestSource;
use mark_down::models::{ListOptions, SearchFilter, TagsMode};
use mark_down::test_utils::{MockFetcher, init_test_logging};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::common::{BUTTON, CARD, INTRO};

const MANIFEST: &str = "https://cdn.example.com/content/snippets-index.json";
const INTRO_URL: &str = "https://cdn.example.com/content/guides/intro.md";
const BUTTON_URL: &str = "https://cdn.example.com/content/components/button.md";
const CARD_URL: &str = "https://cdn.example.com/content/components/card.md";

fn site() -> Arc<MockFetcher> {
    let manifest = serde_json::to_string(&crate::common::sample_manifest()).unwrap();
    Arc::new(
        MockFetcher::new()
            .with_document(MANIFEST, manifest)
            .with_document(INTRO_URL, INTRO)
            .with_document(BUTTON_URL, BUTTON)
            .with_document(CARD_URL, CARD),
    )
}

#[tokio::test]
async fn test_concurrent_gets_share_one_fetch() {
    init_test_logging(None);
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_delay(Duration::from_millis(20))
            .with_document(MANIFEST, serde_json::to_string(&crate::common::sample_manifest()).unwrap())
            .with_document(BUTTON_URL, BUTTON),
    );
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    let (a, b) = tokio::join!(engine.get("button"), engine.get("button"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(fetcher.calls(MANIFEST), 1);
    assert_eq!(fetcher.calls(BUTTON_URL), 1);
}

#[tokio::test]
async fn test_concurrent_gets_across_tasks() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.get("card").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fetcher.calls(CARD_URL), 1);
    assert_eq!(fetcher.calls(MANIFEST), 1);
}

#[tokio::test]
async fn test_cache_disabled_fetches_every_time() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).cache(false).build();

    for _ in 0..3 {
        engine.get("button").await.unwrap();
    }

    assert_eq!(fetcher.calls(BUTTON_URL), 3);
}

#[tokio::test]
async fn test_repeated_get_hits_cache() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    let first = engine.get("intro").await.unwrap();
    let second = engine.get("intro").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fetcher.calls(INTRO_URL), 1);
}

#[tokio::test]
async fn test_invalidate_slug_only_drops_that_slug() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    engine.get("button").await.unwrap();
    engine.get("card").await.unwrap();

    assert!(engine.invalidate_slug("button"));
    assert!(!engine.invalidate_slug("button"));

    engine.get("button").await.unwrap();
    engine.get("card").await.unwrap();

    assert_eq!(fetcher.calls(BUTTON_URL), 2);
    assert_eq!(fetcher.calls(CARD_URL), 1);
    assert_eq!(fetcher.calls(MANIFEST), 1);
}

#[tokio::test]
async fn test_invalidate_reloads_everything() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    engine.get("button").await.unwrap();
    engine.invalidate();

    fetcher.insert(BUTTON_URL, "# Button v2");
    let snippet = engine.get("button").await.unwrap();

    assert!(snippet.html.contains("Button v2"));
    assert_eq!(fetcher.calls(MANIFEST), 2);
    assert_eq!(fetcher.calls(BUTTON_URL), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let fetcher = site();
    fetcher.remove(BUTTON_URL);
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    assert!(engine.get("button").await.is_err());

    fetcher.insert(BUTTON_URL, BUTTON);
    assert!(engine.get("button").await.is_ok());
    assert_eq!(fetcher.calls(BUTTON_URL), 2);
}

#[tokio::test]
async fn test_failed_manifest_is_not_cached() {
    let fetcher = Arc::new(MockFetcher::new());
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    assert!(engine.list_all().await.is_err());

    fetcher.insert(MANIFEST, r#"[{"slug": "a", "path": "a.md"}]"#);
    assert_eq!(engine.list_all().await.unwrap().len(), 1);
    assert_eq!(fetcher.calls(MANIFEST), 2);
}

#[tokio::test]
async fn test_projections_never_fetch_documents() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    let all = engine.list_all().await.unwrap();
    let components = engine.list_by_group("components", ListOptions::default()).await.unwrap();
    let guides = engine.list_by_type("guide", ListOptions::default()).await.unwrap();
    let any = engine
        .search(&SearchFilter::new().with_tags(["action", "layout"], TagsMode::Any), ListOptions::default())
        .await
        .unwrap();
    let page = engine
        .list(ListOptions {
            offset: 1,
            limit: Some(1),
        })
        .await
        .unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(components.iter().map(|m| m.slug.as_str()).collect::<Vec<_>>(), ["button", "card"]);
    assert_eq!(guides.len(), 1);
    assert_eq!(any.len(), 2);
    assert_eq!(page[0].slug, "button");

    assert_eq!(fetcher.total_calls(), 1);
}

#[tokio::test]
async fn test_returned_metadata_is_a_copy() {
    let fetcher = site();
    let engine = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    let mut entries = engine.list_all().await.unwrap();
    entries[0].title = Some("Mutated".to_string());
    entries.clear();

    let fresh = engine.list_all().await.unwrap();
    assert_eq!(fresh[0].title.as_deref(), Some("Introduction"));
}

#[tokio::test]
async fn test_engines_have_independent_caches() {
    let fetcher = site();
    let first = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();
    let second = SnippetEngine::builder(MANIFEST).fetcher(Arc::clone(&fetcher)).build();

    first.get("card").await.unwrap();
    second.get("card").await.unwrap();
    first.invalidate();
    second.get("card").await.unwrap();

    assert_eq!(fetcher.calls(CARD_URL), 2);
}

#[tokio::test]
async fn test_manifest_producer_runs_once_per_load() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let source = ManifestSource::from_async(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(crate::common::sample_manifest())
        }
    });
    let engine = SnippetEngine::builder(source).base("https://cdn.example.com/content").fetcher(site()).build();

    let (a, b) = tokio::join!(engine.list_all(), engine.get_html("intro"));
    assert_eq!(a.unwrap().len(), 3);
    assert!(b.unwrap().contains("<h1>Introduction</h1>"));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    engine.invalidate();
    engine.list_all().await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
