//! Satchel HTTP Library
//!
//! Request/response helpers for axum applications:
//! - multipart upload processing (`upload`)
//! - JSON body decoding with classified errors and JSON responses (`json`)
//! - static file downloads (`download`)
//! - outbound JSON POSTs (`remote`)
//!
//! Every operation takes the caller's `ToolsConfig` (or an options value)
//! explicitly; nothing here keeps global state.

pub mod download;
pub mod error;
pub mod json;
pub mod remote;
pub mod upload;

// Re-export commonly used types
pub use download::download_static_file;
pub use error::HttpToolsError;
pub use json::{
    decode_json, error_json, read_json, write_json, ErrorJsonOptions, JsonResponse,
    JsonResponseOptions, ReadJson,
};
pub use remote::{push_json, PushOptions};
pub use satchel_core::{random_string, slugify, ToolsConfig, ToolsError};
pub use satchel_storage::ensure_dir;
pub use upload::{
    upload_body_limit, upload_files, upload_one, PartialUpload, UploadOptions, UploadedFile,
};
