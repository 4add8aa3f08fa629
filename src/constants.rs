//! Global constants used throughout the mark-down codebase.
//!
//! File names, default locations and environment variables shared by the
//! engine, the manifest builder and the command-line interface.

use std::time::Duration;

/// File name of a generated manifest.
pub const DEFAULT_MANIFEST_NAME: &str = "snippets-index.json";

/// Directory scanned by `mark-down build` when none is given.
pub const DEFAULT_SOURCE_DIR: &str = "content/snippets";

/// Group assigned by the builder to documents at the top of the source directory.
pub const ROOT_GROUP: &str = "root";

/// Project configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "mark-down.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "MARK_DOWN_CONFIG";

/// Timeout applied to HTTP fetches made by the command-line interface.
pub fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}
