use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use satchel_http::{push_json, PushOptions, ToolsError};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Event {
    kind: &'static str,
    id: u64,
}

async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let received: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({"content_type": content_type, "received": received}))
}

/// Start a local server and return its base URL
async fn spawn_remote() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/hook", post(echo))
        .route("/teapot", post(|| async { StatusCode::IM_A_TEAPOT }));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_push_json_posts_payload() {
    let base = spawn_remote().await;

    let event = Event {
        kind: "upload",
        id: 7,
    };
    let (response, status) = push_json(&format!("{}/hook", base), &event, &PushOptions::default())
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["received"], json!({"kind": "upload", "id": 7}));
}

#[tokio::test]
async fn test_push_json_with_custom_client() {
    let base = spawn_remote().await;
    let options = PushOptions {
        client: Some(reqwest::Client::new()),
    };

    let (_response, status) = push_json(&format!("{}/teapot", base), &json!({}), &options)
        .await
        .unwrap();

    // Non-2xx statuses are returned, not raised
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
}

#[tokio::test]
async fn test_push_json_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = push_json(
        &format!("http://{}/hook", addr),
        &json!({"a": 1}),
        &PushOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ToolsError::RemoteRequest(_)));
}
