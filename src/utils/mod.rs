//! Utilities shared by the engine and the command-line interface
//!
//! # Modules
//!
//! - [`fs`] - Atomic file writes for generated manifests
//! - [`paths`] - Resolution of document locations against manifests and bases

pub mod fs;
pub mod paths;

pub use fs::{atomic_write, ensure_dir};
pub use paths::{is_absolute_url, normalize_separators, resolve_document_path};
