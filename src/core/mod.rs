//! Core types and error handling for mark-down.
//!
//! - [`error`] - [`SnippetError`] and user-facing [`ErrorContext`] reporting

pub mod error;

pub use error::{Cause, ErrorContext, SnippetError, cause, user_friendly_error};

/// Result alias used across the library.
pub type Result<T, E = SnippetError> = std::result::Result<T, E>;
