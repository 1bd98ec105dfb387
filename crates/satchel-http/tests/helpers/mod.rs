#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use axum_test::multipart::Part;
use axum_test::TestServer;
use satchel_core::ErrorMetadata;
use satchel_http::{
    upload_body_limit, upload_files, upload_one, write_json, HttpToolsError, JsonResponse, JsonResponseOptions,
    ToolsConfig, UploadOptions, UploadedFile,
};
use tempfile::TempDir;

/// Minimal 1x1 PNG
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 dimensions
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE,
    0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
    0x08, 0xD7, 0x63, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01,
    0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
    0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82, // IEND chunk
];

pub fn png_part(file_name: &str) -> Part {
    Part::bytes(bytes::Bytes::from_static(PNG_1X1))
        .file_name(file_name)
        .mime_type("image/png")
}

pub fn text_part(file_name: &str, content: &str) -> Part {
    Part::bytes(bytes::Bytes::from(content.to_string()))
        .file_name(file_name)
        .mime_type("text/plain")
}

#[derive(Clone)]
struct UploadState {
    config: ToolsConfig,
    upload_dir: PathBuf,
    options: UploadOptions,
}

/// Upload test application with its own scratch directory
pub struct UploadApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl UploadApp {
    /// Names of the files currently in the upload directory, sorted
    pub fn stored_files(&self) -> Vec<String> {
        list_dir(&self.upload_dir)
    }
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

async fn upload_handler(State(state): State<Arc<UploadState>>, multipart: Multipart) -> Response {
    let result = upload_files(&state.config, multipart, &state.upload_dir, &state.options).await;
    let (status, body) = match result {
        Ok(files) => (StatusCode::CREATED, JsonResponse::ok("uploaded", files)),
        Err(partial) => {
            let status = StatusCode::from_u16(partial.source.http_status_code()).unwrap();
            let body = JsonResponse {
                error: true,
                message: partial.source.to_string(),
                data: Some(partial.written),
            };
            (status, body)
        }
    };
    write_json(status, &body, &JsonResponseOptions::default()).unwrap()
}

async fn upload_one_handler(
    State(state): State<Arc<UploadState>>,
    multipart: Multipart,
) -> Result<Json<UploadedFile>, HttpToolsError> {
    let file = upload_one(&state.config, multipart, &state.upload_dir, &state.options).await?;
    Ok(Json(file))
}

/// Setup an upload application writing into a fresh temp directory.
///
/// `/upload` runs `upload_files` and answers with the `JsonResponse` envelope
/// (`data` carries the written files, also on failure); `/upload-one` runs
/// `upload_one`.
pub fn setup_upload_app(config: ToolsConfig, options: UploadOptions) -> UploadApp {
    setup_upload_app_with_body_limit(config, options, upload_body_limit())
}

/// Same as [`setup_upload_app`] with an explicit axum body limit layer
pub fn setup_upload_app_with_body_limit(
    config: ToolsConfig,
    options: UploadOptions,
    body_limit: DefaultBodyLimit,
) -> UploadApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let upload_dir = temp_dir.path().join("uploads");

    let state = Arc::new(UploadState {
        config,
        upload_dir: upload_dir.clone(),
        options,
    });

    let app = Router::new()
        .route("/upload", post(upload_handler))
        .route("/upload-one", post(upload_one_handler))
        .layer(body_limit)
        .with_state(state);

    let server = TestServer::new(app).expect("Failed to create test server");

    UploadApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}
