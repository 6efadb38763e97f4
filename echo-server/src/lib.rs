use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::debug;

/// Description of a received request, returned by `/echo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Lowercase header names; repeated headers are joined with `, `.
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// The body parsed as JSON, when it is JSON.
    pub json: Option<Value>,
}

pub const TEXT_BODY: &str = "plain text body";

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", get(status))
        .route("/redirect/{hops}", get(redirect))
        .route("/text", get(text))
        .route("/duplicate-headers", get(duplicate_headers))
        .route("/delay/{millis}", get(delay))
        .route("/bytes/{len}", get(sized_body))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    debug!(method = %method, path = uri.path(), body_len = body.len(), "echo");
    let body = String::from_utf8_lossy(&body).into_owned();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: flatten_headers(&headers),
        json: serde_json::from_str(&body).ok(),
        body,
    })
}

fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        out.entry(name.as_str().to_string())
            .and_modify(|v| {
                v.push_str(", ");
                v.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    out
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn redirect(Path(hops): Path<u32>) -> impl IntoResponse {
    let location = match hops {
        0 => "/echo".to_string(),
        n => format!("/redirect/{}", n - 1),
    };
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

async fn text() -> &'static str {
    TEXT_BODY
}

async fn duplicate_headers() -> impl IntoResponse {
    (AppendHeaders([("x-dup", "one"), ("x-dup", "two")]), "dup")
}

/// Waits `millis` before answering with `TEXT_BODY`.
async fn delay(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    TEXT_BODY
}

/// A body of `len` bytes, all `b'x'`.
async fn sized_body(Path(len): Path<usize>) -> Vec<u8> {
    vec![b'x'; len]
}
