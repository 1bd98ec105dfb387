use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use satchel_core::{ToolsError, ToolsResult};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Client to send with; a default `reqwest::Client` when unset
    pub client: Option<Client>,
}

/// POST `value` as JSON to `uri`.
///
/// Returns the response together with its status. Non-2xx statuses are not
/// errors; only encoding and transport failures are.
pub async fn push_json<T>(
    uri: &str,
    value: &T,
    options: &PushOptions,
) -> ToolsResult<(reqwest::Response, StatusCode)>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)
        .map_err(|e| ToolsError::RemoteRequest(format!("failed to encode payload: {}", e)))?;

    let client = options.client.clone().unwrap_or_default();
    let response = client
        .post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(uri = %uri, error = %e, "Remote JSON push failed");
            ToolsError::RemoteRequest(e.to_string())
        })?;

    let status = response.status();
    tracing::debug!(uri = %uri, status = status.as_u16(), "Pushed JSON to remote");

    Ok((response, status))
}
