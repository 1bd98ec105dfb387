//! JSON request decoding and JSON responses
//!
//! `read_json` maps every decoding failure onto one of the `ToolsError` JSON
//! categories, whose `Display` text is safe to return to clients as-is.

use std::fmt::Display;

use axum::body::Body;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use http_body_util::LengthLimitError;
use satchel_core::{ToolsConfig, ToolsError, ToolsResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::HttpToolsError;

/// Response envelope: `{"error": ..., "message": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonResponseOptions {
    /// Extra response headers. `Content-Type` is always replaced with
    /// `application/json`.
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub struct ErrorJsonOptions {
    pub status: StatusCode,
}

impl Default for ErrorJsonOptions {
    fn default() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
        }
    }
}

/// Read at most `config.max_json_bytes` of `body` and decode it as one JSON
/// value.
///
/// No field is required by the toolkit itself: `{}` decodes into any target
/// whose fields are `Option` or `#[serde(default)]`. A required field in `T`
/// that is absent fails as `JsonTypeMismatch` naming that field.
pub async fn read_json<T: DeserializeOwned>(config: &ToolsConfig, body: Body) -> ToolsResult<T> {
    let limit = config.json_limit();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| body_error(e, limit))?;

    decode_json(&bytes, config.allow_unknown_json_fields)
}

fn body_error(err: axum::Error, limit: usize) -> ToolsError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return ToolsError::JsonTooLarge { limit };
        }
        source = cause.source();
    }
    ToolsError::BodyRead(err.to_string())
}

/// Decode exactly one JSON value from `input`.
///
/// With `allow_unknown_fields` unset, an object key that `T` does not consume
/// is reported as `JsonUnknownField`, ahead of any later error.
pub fn decode_json<T: DeserializeOwned>(input: &[u8], allow_unknown_fields: bool) -> ToolsResult<T> {
    if input.iter().all(|b| is_json_whitespace(*b)) {
        return Err(ToolsError::JsonEmptyBody);
    }

    let mut unknown_field: Option<String> = None;
    let mut de = serde_json::Deserializer::from_slice(input);

    let result: Result<T, _> = {
        let mut on_ignored = |path: serde_ignored::Path<'_>| {
            if unknown_field.is_none() {
                unknown_field = Some(path.to_string());
            }
        };
        let tracked = serde_ignored::Deserializer::new(&mut de, &mut on_ignored);
        serde_path_to_error::deserialize(tracked)
    };

    if !allow_unknown_fields {
        if let Some(field) = unknown_field {
            return Err(ToolsError::JsonUnknownField { field });
        }
    }

    let value = result.map_err(|e| classify(e, input))?;

    if de.end().is_err() {
        return Err(ToolsError::JsonTrailingData);
    }

    Ok(value)
}

fn classify(err: serde_path_to_error::Error<serde_json::Error>, input: &[u8]) -> ToolsError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    let offset = byte_offset(input, inner.line(), inner.column());

    match inner.classify() {
        Category::Eof => ToolsError::JsonSyntax { offset: None },
        Category::Syntax => ToolsError::JsonSyntax {
            offset: Some(offset),
        },
        Category::Data => {
            let message = inner.to_string();
            if let Some(name) = backticked(&message, "unknown field ") {
                return ToolsError::JsonUnknownField {
                    field: join_path(&path, name),
                };
            }
            if let Some(name) = backticked(&message, "missing field ") {
                return ToolsError::JsonTypeMismatch {
                    field: Some(join_path(&path, name)),
                    offset,
                };
            }
            let field = (!is_root(&path)).then_some(path);
            ToolsError::JsonTypeMismatch { field, offset }
        }
        Category::Io => ToolsError::BodyRead(inner.to_string()),
    }
}

fn is_root(path: &str) -> bool {
    path.is_empty() || path == "."
}

fn join_path(path: &str, name: &str) -> String {
    if is_root(path) {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// `name` from a serde message such as "unknown field `name`, expected ..."
fn backticked<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    message
        .strip_prefix(prefix)?
        .strip_prefix('`')?
        .split('`')
        .next()
}

/// Convert serde_json's 1-based line/column into a byte offset into `input`.
fn byte_offset(input: &[u8], line: usize, column: usize) -> u64 {
    let line_start = if line <= 1 {
        0
    } else {
        input
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(idx, _)| idx + 1)
            .nth(line - 2)
            .unwrap_or(input.len())
    };
    (line_start + column) as u64
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Serialize `value` into a response with `status`.
///
/// `options.headers` are copied first, then `Content-Type: application/json`
/// is set, overriding any caller-supplied content type.
pub fn write_json<T>(status: StatusCode, value: &T, options: &JsonResponseOptions) -> ToolsResult<Response>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in options.headers.iter() {
        headers.append(name, value.clone());
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(response)
}

/// Render `error` as `{"error": true, "message": "<error>"}`.
pub fn error_json<E>(error: &E, options: &ErrorJsonOptions) -> ToolsResult<Response>
where
    E: Display + ?Sized,
{
    let payload: JsonResponse<()> = JsonResponse::failure(error.to_string());
    write_json(options.status, &payload, &JsonResponseOptions::default())
}

/// Extractor running [`read_json`] with the `ToolsConfig` held in router state.
///
/// Failures are rejected with the `error_json` envelope and the error's status.
#[derive(Debug, Clone, Copy)]
pub struct ReadJson<T>(pub T);

impl<T, S> FromRequest<S> for ReadJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    ToolsConfig: FromRef<S>,
{
    type Rejection = HttpToolsError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let config = ToolsConfig::from_ref(state);
        let value = read_json(&config, req.into_body()).await?;
        Ok(ReadJson(value))
    }
}
