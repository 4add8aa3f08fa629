//! Retrieval of manifests and snippet documents.
//!
//! The engine never touches the network or the filesystem directly. Every
//! read goes through a [`Fetcher`], which maps a location string to the text
//! behind it. Three implementations are provided:
//!
//! - [`HttpFetcher`] - `http://` and `https://` URLs via `reqwest`
//! - [`FileFetcher`] - plain filesystem paths and `file://` URLs via `tokio::fs`
//! - [`DefaultFetcher`] - dispatches on the location's scheme
//!
//! Fetchers are shared across concurrent requests and must be `Send + Sync`.

use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::utils::paths::is_absolute_url;

/// Failure to retrieve a location.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Request for '{location}' failed with HTTP status {status}")]
    Status {
        location: String,
        status: u16,
    },

    /// The request could not be completed.
    #[error("Request for '{location}' failed")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// The file could not be read.
    #[error("Failed to read '{location}'")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// No fetcher handles the location's scheme.
    #[error("Unsupported location '{location}': only http(s), file URLs and filesystem paths can be fetched")]
    UnsupportedScheme {
        location: String,
    },
}

impl FetchError {
    /// The location that failed.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::Status {
                location,
                ..
            }
            | Self::Http {
                location,
                ..
            }
            | Self::Io {
                location,
                ..
            }
            | Self::UnsupportedScheme {
                location,
            } => location,
        }
    }

    /// Whether the failure means the location does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status {
                status,
                ..
            } => *status == 404,
            Self::Io {
                source,
                ..
            } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Text retrieval capability injected into the engine.
pub trait Fetcher: Send + Sync {
    /// Fetch the full text behind `location`.
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        (**self).fetch(location)
    }
}

/// Fetches `http://` and `https://` URLs.
///
/// Protocol-relative locations (`//host/path`) are fetched over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, headers, TLS settings).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
        }
    }

    /// Build a client that gives up on requests after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails when the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    async fn get(&self, location: &str) -> Result<String, FetchError> {
        let url = if location.starts_with("//") {
            format!("https:{location}")
        } else {
            location.to_string()
        };

        debug!("Fetching {}", url);

        let http_error = |source| FetchError::Http {
            location: location.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(http_error)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.get(location))
    }
}

/// Reads filesystem paths and `file://` URLs.
///
/// Relative paths resolve against `root` when one is set, otherwise against
/// the process working directory.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn to_path(&self, location: &str) -> Result<PathBuf, FetchError> {
        if location.starts_with("file:") {
            return url::Url::parse(location)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| FetchError::UnsupportedScheme {
                    location: location.to_string(),
                });
        }

        let path = PathBuf::from(location);
        Ok(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        })
    }

    async fn read(&self, location: &str) -> Result<String, FetchError> {
        let path = self.to_path(location)?;
        debug!("Reading {}", path.display());
        tokio::fs::read_to_string(&path).await.map_err(|source| FetchError::Io {
            location: location.to_string(),
            source,
        })
    }
}

impl Fetcher for FileFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.read(location))
    }
}

/// Routes each location to the HTTP or file fetcher by scheme.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parts(http: HttpFetcher, file: FileFetcher) -> Self {
        Self {
            http,
            file,
        }
    }
}

/// How a location is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Http,
    File,
    Unsupported,
}

/// Classify a location by its scheme.
#[must_use]
pub fn location_kind(location: &str) -> LocationKind {
    if location.starts_with("//") {
        return LocationKind::Http;
    }
    if !is_absolute_url(location) {
        return LocationKind::File;
    }
    let scheme = location.split(':').next().unwrap_or_default().to_ascii_lowercase();
    match scheme.as_str() {
        "http" | "https" => LocationKind::Http,
        "file" => LocationKind::File,
        _ => LocationKind::Unsupported,
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        match location_kind(location) {
            LocationKind::Http => self.http.fetch(location),
            LocationKind::File => self.file.fetch(location),
            LocationKind::Unsupported => Box::pin(async move {
                Err(FetchError::UnsupportedScheme {
                    location: location.to_string(),
                })
            }),
        }
    }
}
