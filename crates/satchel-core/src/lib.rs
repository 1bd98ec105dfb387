//! Satchel Core Library
//!
//! This crate provides the configuration, error taxonomy, and the small string
//! helpers (random names, slugs) shared by every satchel component.

pub mod config;
pub mod error;
pub mod random;
pub mod slug;

// Re-export commonly used types
pub use config::{ToolsConfig, DEFAULT_MAX_JSON_BYTES, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{ErrorMetadata, LogLevel, ToolsError, ToolsResult};
pub use random::{random_string, RANDOM_STRING_ALPHABET};
pub use slug::slugify;
