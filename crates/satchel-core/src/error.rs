//! Error types module
//!
//! Every failure surfaced by satchel is a `ToolsError`. The variants form a
//! fixed taxonomy: callers match on the variant, and the `Display` text of the
//! JSON variants is the user-facing message handlers return to clients.

use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FILE_TYPE_NOT_ALLOWED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    /// `limit` is unset when the ceiling was enforced by the HTTP framework
    /// rather than by the upload configuration
    #[error("{}", upload_too_large_message(.limit))]
    UploadTooLarge { limit: Option<u64> },

    #[error("invalid multipart form: {0}")]
    MalformedMultipart(String),

    #[error("file type not allowed: {content_type}")]
    FileTypeNotAllowed { content_type: String },

    #[error("no files were submitted")]
    NoFilesSubmitted,

    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}", syntax_message(.offset))]
    JsonSyntax { offset: Option<u64> },

    #[error("{}", type_mismatch_message(.field, .offset))]
    JsonTypeMismatch { field: Option<String>, offset: u64 },

    #[error("request body contains unknown field \"{field}\"")]
    JsonUnknownField { field: String },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body must not be empty")]
    JsonEmptyBody,

    #[error("request body must not be larger than {limit} bytes")]
    JsonTooLarge { limit: usize },

    #[error("body must only contain a single JSON object")]
    JsonTrailingData,

    #[error("failed to encode JSON: {0}")]
    JsonEncode(#[from] serde_json::Error),

    #[error("remote request failed: {0}")]
    RemoteRequest(String),

    #[error("empty string")]
    EmptyString,

    #[error("after removing characters, the string is empty")]
    EmptyAfterNormalization,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type used across satchel crates
pub type ToolsResult<T> = Result<T, ToolsError>;

fn upload_too_large_message(limit: &Option<u64>) -> String {
    match limit {
        Some(limit) => format!("the uploaded file is too big (limit: {} bytes)", limit),
        None => "the uploaded file is too big".to_string(),
    }
}

fn syntax_message(offset: &Option<u64>) -> String {
    match offset {
        Some(offset) => format!(
            "request body contains badly-formed JSON (at character {})",
            offset
        ),
        None => "request body contains badly-formed JSON".to_string(),
    }
}

fn type_mismatch_message(field: &Option<String>, offset: &u64) -> String {
    match field {
        Some(field) => format!(
            "request body contains an invalid value for the \"{}\" field",
            field
        ),
        None => format!(
            "request body contains an invalid value (at character {})",
            offset
        ),
    }
}

impl ToolsError {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ToolsError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn static_metadata(err: &ToolsError) -> (u16, &'static str, LogLevel) {
    match err {
        ToolsError::UploadTooLarge { .. } => (413, "UPLOAD_TOO_LARGE", LogLevel::Debug),
        ToolsError::MalformedMultipart(_) => (400, "MALFORMED_MULTIPART", LogLevel::Debug),
        ToolsError::FileTypeNotAllowed { .. } => (415, "FILE_TYPE_NOT_ALLOWED", LogLevel::Debug),
        ToolsError::NoFilesSubmitted => (400, "NO_FILES_SUBMITTED", LogLevel::Debug),
        ToolsError::Filesystem { .. } => (500, "FILESYSTEM_ERROR", LogLevel::Error),
        ToolsError::JsonSyntax { .. } => (400, "JSON_SYNTAX_ERROR", LogLevel::Debug),
        ToolsError::JsonTypeMismatch { .. } => (400, "JSON_TYPE_MISMATCH", LogLevel::Debug),
        ToolsError::JsonUnknownField { .. } => (400, "JSON_UNKNOWN_FIELD", LogLevel::Debug),
        ToolsError::BodyRead(_) => (400, "BODY_READ_ERROR", LogLevel::Debug),
        ToolsError::JsonEmptyBody => (400, "JSON_EMPTY_BODY", LogLevel::Debug),
        ToolsError::JsonTooLarge { .. } => (413, "JSON_TOO_LARGE", LogLevel::Debug),
        ToolsError::JsonTrailingData => (400, "JSON_TRAILING_DATA", LogLevel::Debug),
        ToolsError::JsonEncode(_) => (500, "JSON_ENCODE_ERROR", LogLevel::Error),
        ToolsError::RemoteRequest(_) => (502, "REMOTE_REQUEST_ERROR", LogLevel::Warn),
        ToolsError::EmptyString => (400, "EMPTY_STRING", LogLevel::Debug),
        ToolsError::EmptyAfterNormalization => {
            (400, "EMPTY_AFTER_NORMALIZATION", LogLevel::Debug)
        }
        ToolsError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl ErrorMetadata for ToolsError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            // Paths and OS error text stay in the logs
            ToolsError::Filesystem { .. } => "filesystem operation failed".to_string(),
            ToolsError::JsonEncode(_) | ToolsError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).2
    }
}
