//! Multipart upload processing
//!
//! The whole multipart body is spooled to anonymous temporary files first, so
//! the byte ceiling is enforced before anything lands in the destination
//! directory. Each spooled file part is then sniffed, checked against the
//! allow-list and copied into place, in arrival order.

use std::io::SeekFrom;
use std::path::Path;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use satchel_core::{random_string, ToolsConfig, ToolsError, ToolsResult};
use satchel_processing::{detect_content_type, ContentTypeValidator, SNIFF_LEN};
use satchel_storage::LocalDirectory;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::HttpToolsError;

/// Length of generated file names, extension excluded
const RENAMED_FILE_LEN: usize = 25;

/// A file persisted by [`upload_files`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub new_file_name: String,
    pub original_file_name: String,
    /// Bytes written to disk
    pub file_size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Replace the client file name with a random one, keeping the extension
    pub rename: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self { rename: true }
    }
}

/// An upload that stopped early.
///
/// `written` holds the files persisted before `source` occurred; they are left
/// on disk.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct PartialUpload {
    pub written: Vec<UploadedFile>,
    #[source]
    pub source: ToolsError,
}

impl PartialUpload {
    fn new(written: Vec<UploadedFile>, source: impl Into<ToolsError>) -> Self {
        Self {
            written,
            source: source.into(),
        }
    }
}

impl IntoResponse for PartialUpload {
    fn into_response(self) -> Response {
        HttpToolsError(self.source).into_response()
    }
}

struct SpooledPart {
    original_file_name: String,
    file: File,
}

/// Body limit layer for upload routes.
///
/// axum's `Multipart` extractor applies its own 2 MB `DefaultBodyLimit`, which
/// is hit long before the default upload ceiling. This layer lifts it so that
/// `max_upload_bytes`, enforced while spooling, is the only ceiling. Routes
/// calling [`upload_files`] or [`upload_one`] should carry it:
///
/// ```ignore
/// Router::new()
///     .route("/upload", post(handler))
///     .layer(upload_body_limit());
/// ```
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::disable()
}

/// Persist every file part of `multipart` into `upload_dir`.
///
/// Non-file fields are read (they count toward the byte ceiling) and dropped.
/// Client file names are reduced to their final path component. The route
/// must lift axum's default body limit, see [`upload_body_limit`]; a body
/// rejected by that limit fails with `UploadTooLarge { limit: None }`.
#[tracing::instrument(skip_all, fields(rename = options.rename))]
pub async fn upload_files(
    config: &ToolsConfig,
    mut multipart: Multipart,
    upload_dir: impl AsRef<Path>,
    options: &UploadOptions,
) -> Result<Vec<UploadedFile>, PartialUpload> {
    let directory = LocalDirectory::open(upload_dir.as_ref())
        .await
        .map_err(|e| PartialUpload::new(Vec::new(), e))?;

    let limit = config.upload_limit();
    let parts = spool_parts(&mut multipart, limit)
        .await
        .map_err(|e| PartialUpload::new(Vec::new(), e))?;

    let validator = ContentTypeValidator::from_config(config);
    let mut written = Vec::with_capacity(parts.len());

    for part in parts {
        match store_part(&directory, &validator, part, options).await {
            Ok(uploaded) => written.push(uploaded),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    written = written.len(),
                    "Upload stopped early"
                );
                return Err(PartialUpload::new(written, e));
            }
        }
    }

    tracing::info!(
        upload_dir = %directory.path().display(),
        file_count = written.len(),
        "Upload complete"
    );

    Ok(written)
}

/// Persist the first file part of `multipart`.
///
/// Same body limit requirements as [`upload_files`].
pub async fn upload_one(
    config: &ToolsConfig,
    multipart: Multipart,
    upload_dir: impl AsRef<Path>,
    options: &UploadOptions,
) -> ToolsResult<UploadedFile> {
    let files = upload_files(config, multipart, upload_dir, options)
        .await
        .map_err(|partial| partial.source)?;

    files
        .into_iter()
        .next()
        .ok_or(ToolsError::NoFilesSubmitted)
}

async fn spool_parts(multipart: &mut Multipart, limit: u64) -> ToolsResult<Vec<SpooledPart>> {
    let mut parts = Vec::new();
    let mut total: u64 = 0;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        // Parts without a file name are plain form fields
        let original_file_name = match field.file_name().filter(|name| !name.is_empty()) {
            Some(name) => Some(base_name(name)?.to_string()),
            None => None,
        };

        let mut spool = match original_file_name {
            Some(_) => Some(open_spool()?),
            None => None,
        };

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            total += chunk.len() as u64;
            if total > limit {
                tracing::debug!(limit = limit, "Multipart body exceeds upload limit");
                return Err(ToolsError::UploadTooLarge { limit: Some(limit) });
            }
            if let Some(file) = spool.as_mut() {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ToolsError::filesystem(std::env::temp_dir(), e))?;
            }
        }

        if let (Some(original_file_name), Some(mut file)) = (original_file_name, spool) {
            file.flush()
                .await
                .map_err(|e| ToolsError::filesystem(std::env::temp_dir(), e))?;
            parts.push(SpooledPart {
                original_file_name,
                file,
            });
        }
    }

    Ok(parts)
}

fn open_spool() -> ToolsResult<File> {
    tempfile::tempfile()
        .map(File::from_std)
        .map_err(|e| ToolsError::filesystem(std::env::temp_dir(), e))
}

fn multipart_error(err: MultipartError) -> ToolsError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        // Enforced by a body limit layer, not by `max_upload_bytes`
        ToolsError::UploadTooLarge { limit: None }
    } else {
        ToolsError::MalformedMultipart(err.body_text())
    }
}

async fn store_part(
    directory: &LocalDirectory,
    validator: &ContentTypeValidator,
    part: SpooledPart,
    options: &UploadOptions,
) -> ToolsResult<UploadedFile> {
    let SpooledPart {
        original_file_name,
        mut file,
    } = part;
    let spool_path = std::env::temp_dir();

    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| ToolsError::filesystem(&spool_path, e))?;

    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(|e| ToolsError::filesystem(&spool_path, e))?;

    let content_type = detect_content_type(&head);
    validator.validate(content_type)?;

    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| ToolsError::filesystem(&spool_path, e))?;

    let new_file_name = if options.rename {
        format!(
            "{}{}",
            random_string(RENAMED_FILE_LEN),
            file_extension(&original_file_name)
        )
    } else {
        original_file_name.clone()
    };

    let file_size_bytes = directory.write_from_reader(&new_file_name, &mut file).await?;

    tracing::debug!(
        original_file_name = %original_file_name,
        new_file_name = %new_file_name,
        content_type = %content_type,
        size_bytes = file_size_bytes,
        "Stored uploaded file"
    );

    Ok(UploadedFile {
        new_file_name,
        original_file_name,
        file_size_bytes,
    })
}

/// Final path component of a client file name, split on `/` and `\\`.
fn base_name(name: &str) -> ToolsResult<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    if base.is_empty() || base == "." || base == ".." {
        return Err(ToolsError::MalformedMultipart(format!(
            "invalid file name: {:?}",
            name
        )));
    }
    Ok(base)
}

/// Extension of the last path element, dot included (`"a/b.tar.gz"` -> `".gz"`).
fn file_extension(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.rfind('.').map(|idx| &base[idx..]).unwrap_or("")
}
