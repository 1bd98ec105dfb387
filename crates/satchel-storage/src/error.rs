use std::io;
use std::path::PathBuf;

use satchel_core::ToolsError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create file {}: {source}", .path.display())]
    CreateFileFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;


impl From<StorageError> for ToolsError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::CreateDirFailed { path, source }
            | StorageError::CreateFileFailed { path, source }
            | StorageError::WriteFailed { path, source } => ToolsError::Filesystem { path, source },
        }
    }
}
