use std::path::Path;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::HeaderValue;
use axum::response::Response;
use satchel_core::{ToolsError, ToolsResult};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Serve `base_dir/file_name` as an attachment the browser saves as
/// `display_name`.
///
/// Range, conditional requests and `Content-Length` are handled by
/// `ServeFile`; a missing file yields its 404 response.
///
/// `"` and `\` in `display_name` are backslash-escaped inside the quoted
/// filename, so such names do not appear verbatim in the header.
pub async fn download_static_file(
    request: Request,
    base_dir: impl AsRef<Path>,
    file_name: &str,
    display_name: &str,
) -> ToolsResult<Response> {
    let path = base_dir.as_ref().join(file_name);

    let disposition = format!(
        "attachment; filename=\"{}\"",
        display_name.replace('\\', "\\\\").replace('"', "\\\"")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ToolsError::Internal(format!("invalid download name: {}", e)))?;

    let response = ServeFile::new(&path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    let mut response = response.map(Body::new);
    response
        .headers_mut()
        .insert(CONTENT_DISPOSITION, disposition);

    tracing::debug!(
        path = %path.display(),
        status = response.status().as_u16(),
        "Served static file"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    fn get() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_download_sets_disposition() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("report.bin"), b"0123456789").unwrap();

        let response = download_static_file(get(), temp.path(), "report.bin", "Report 2024.pdf")
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"Report 2024.pdf\""
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let temp = TempDir::new().unwrap();
        let response = download_static_file(get(), temp.path(), "nope.txt", "nope.txt")
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_display_name_quotes_are_escaped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"a").unwrap();

        let response = download_static_file(get(), temp.path(), "a.txt", "say \"hi\".txt")
            .await
            .unwrap();
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"say \\\"hi\\\".txt\""
        );
    }

    #[tokio::test]
    async fn test_control_characters_are_rejected() {
        let temp = TempDir::new().unwrap();
        let err = download_static_file(get(), temp.path(), "a.txt", "bad\nname")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolsError::Internal(_)));
    }
}
