//! Satchel Storage Library
//!
//! Flat-file persistence for uploads: directory creation and streaming part
//! data into files under a caller-chosen directory. Names are used as given;
//! choosing safe names is the caller's job (see `satchel_core::random_string`).

pub mod error;
pub mod local;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use local::{ensure_dir, LocalDirectory};
