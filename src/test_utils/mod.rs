//! Test utilities for mark-down
//!
//! Helpers shared by unit and integration tests:
//! - [`init_test_logging`] - one-time `tracing` setup writing to the test output
//! - [`LogCapture`] - collects formatted `tracing` output for assertions
//! - [`MockFetcher`] - an in-memory [`Fetcher`] that counts requests per location
//! - [`SnippetFixture`] - writes a snippet directory with documents and a manifest
//!
//! Available to integration tests through the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use mark_down::test_utils::MockFetcher;
//! use std::sync::Arc;
//!
//! let fetcher = Arc::new(MockFetcher::new().with_document("/content/a.md", "# A"));
//! assert_eq!(fetcher.calls("/content/a.md"), 0);
//! ```

use dashmap::DashMap;
use futures::future::BoxFuture;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::fetch::{FetchError, Fetcher};
use crate::models::SnippetMeta;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// With `level` unset, logging is enabled only when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=mark_down=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// In-memory sink for `tracing` output.
///
/// [`LogCapture::set_default`] routes events on the current thread into the
/// buffer until the returned guard is dropped, so assertions can check which
/// warnings an operation emitted. Pair it with a current-thread runtime.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a subscriber at `level` writing into this buffer.
    #[must_use = "events are captured only while the guard is alive"]
    pub fn set_default(&self, level: Level) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything captured so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory fetcher serving registered documents.
///
/// Unknown locations fail with a 404 [`FetchError::Status`]. Every request is
/// counted, hit or miss, so tests can assert how often the engine touched
/// the "network".
#[derive(Debug, Default)]
pub struct MockFetcher {
    documents: DashMap<String, String>,
    calls: DashMap<String, usize>,
    total: AtomicUsize,
    delay: Option<Duration>,
}

impl MockFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` under `location`.
    #[must_use]
    pub fn with_document(self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }

    /// Suspend every request for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Register or replace a document.
    pub fn insert(&self, location: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(location.into(), text.into());
    }

    /// Remove a document so later requests fail with 404.
    pub fn remove(&self, location: &str) {
        self.documents.remove(location);
    }

    /// Number of requests made for `location`.
    #[must_use]
    pub fn calls(&self, location: &str) -> usize {
        self.calls.get(location).map_or(0, |count| *count)
    }

    /// Number of requests made for any location.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(async move {
            *self.calls.entry(location.to_string()).or_insert(0) += 1;
            self.total.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.documents.get(location).map(|text| text.value().clone()).ok_or_else(|| FetchError::Status {
                location: location.to_string(),
                status: 404,
            })
        })
    }
}

/// A snippet directory on disk.
///
/// Documents are written relative to `root`; [`SnippetFixture::write_manifest`]
/// writes a `snippets-index.json` next to them.
pub struct SnippetFixture {
    pub root: PathBuf,
}

impl SnippetFixture {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Write a document, creating parent directories.
    pub fn write_document(&self, relative: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write `entries` as the manifest and return its path.
    pub fn write_manifest(&self, entries: &[SnippetMeta]) -> anyhow::Result<PathBuf> {
        let path = self.manifest_path();
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, serde_json::to_string_pretty(entries)?)?;
        Ok(path)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(crate::constants::DEFAULT_MANIFEST_NAME)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }
}
