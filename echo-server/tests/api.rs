use axum::http::{self, Request, StatusCode};
use echo_server::{app, Echo, TEXT_BODY};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_get_reports_query_in_order() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/echo?b=2&a=one+two")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/echo");
    assert_eq!(
        echo.query,
        vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "one two".to_string())
        ]
    );
    assert!(echo.body.is_empty());
    assert!(echo.json.is_none());
}

#[tokio::test]
async fn echo_reflects_json_body_for_any_method() {
    for method in ["POST", "PUT", "PATCH", "DELETE"] {
        let resp = app()
            .oneshot(json_request(method, "/echo", r#"{"title":"x"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let echo: Echo = body_json(resp).await;
        assert_eq!(echo.method, method);
        assert_eq!(echo.body, r#"{"title":"x"}"#);
        assert_eq!(echo.json, Some(serde_json::json!({"title": "x"})));
        assert_eq!(echo.headers["content-type"], "application/json");
    }
}

#[tokio::test]
async fn echo_keeps_non_json_body_raw() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .body("a=1&b=2".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.body, "a=1&b=2");
    assert!(echo.json.is_none());
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code_with_empty_body() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/418").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_out_of_range_is_bad_request() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/42").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- redirect ---

#[tokio::test]
async fn redirect_counts_down_to_echo() {
    let resp = app()
        .oneshot(Request::builder().uri("/redirect/2").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[http::header::LOCATION], "/redirect/1");

    let resp = app()
        .oneshot(Request::builder().uri("/redirect/0").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.headers()[http::header::LOCATION], "/echo");
}

// --- misc ---

#[tokio::test]
async fn text_is_plain() {
    let resp = app()
        .oneshot(Request::builder().uri("/text").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[http::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, TEXT_BODY.as_bytes());
}

#[tokio::test]
async fn duplicate_headers_are_both_sent() {
    let resp = app()
        .oneshot(Request::builder().uri("/duplicate-headers").body(String::new()).unwrap())
        .await
        .unwrap();

    let values: Vec<_> = resp.headers().get_all("x-dup").iter().collect();
    assert_eq!(values, vec!["one", "two"]);
}

#[tokio::test]
async fn delay_answers_after_waiting() {
    let started = std::time::Instant::now();
    let resp = app()
        .oneshot(Request::builder().uri("/delay/50").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    assert_eq!(body_bytes(resp).await, TEXT_BODY.as_bytes());
}

#[tokio::test]
async fn bytes_returns_requested_length() {
    let resp = app()
        .oneshot(Request::builder().uri("/bytes/1000").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(body.len(), 1000);
    assert!(body.iter().all(|&b| b == b'x'));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app()
        .oneshot(Request::builder().uri("/nope").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
