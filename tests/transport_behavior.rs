//! Behavior tests for the reqwest transport against a local HTTP server
//!
//! Each test binds an axum router to an ephemeral port and drives the real
//! network stack: header and body encoding, non-JSON bodies, timeouts and
//! connection failures.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use mercado_core::{
    ApiError, ClientConfig, Credential, HttpClient, NetworkErrorCode, Payload, PlatformClient,
    QueryParams, ReqwestHttpClient, RequestOptions,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server runs");
    });
    addr
}

fn client_for(addr: SocketAddr, config: impl FnOnce(ClientConfig) -> ClientConfig) -> PlatformClient {
    let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    PlatformClient::with_http_client(config(ClientConfig::new(format!("http://{addr}"))), transport)
}

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_owned())))
        .collect();
    Json(json!({ "headers": headers, "query": query }))
}

// =============================================================================
// Request encoding
// =============================================================================

#[tokio::test]
async fn auth_and_query_reach_the_server() {
    // Given: a server that echoes headers and the raw query string
    let addr = serve(Router::new().route("/sites/MLA/search", get(echo))).await;
    let client = client_for(addr, |config| config.with_max_retries(0));
    let credential = Credential::with_access_token("APP_USR-123");

    // When: a search is issued with mixed parameters
    let envelope = client
        .request(
            "/sites/MLA/search",
            RequestOptions::get()
                .params(
                    QueryParams::new()
                        .with("q", "zapatillas running")
                        .with("limit", 5)
                        .with("attributes", json!(["id", "price"]))
                        .with("offset", Value::Null),
                )
                .auth(&credential),
        )
        .await
        .expect("echo succeeds");

    // Then: bearer, content type and encoded query arrive intact
    let body = envelope.data.as_json().expect("json echo");
    assert_eq!(body["headers"]["authorization"], "Bearer APP_USR-123");
    assert_eq!(body["headers"]["content-type"], "application/json");
    assert_eq!(body["query"], "q=zapatillas%20running&limit=5&attributes=id%2Cprice");
}

#[tokio::test]
async fn post_body_is_sent_as_json() {
    let addr = serve(Router::new().route(
        "/v1/payments",
        post(|Json(body): Json<Value>| async move { (StatusCode::CREATED, Json(body)) }),
    ))
    .await;
    let client = client_for(addr, |config| config.with_max_retries(0));

    let envelope = client
        .request(
            "/v1/payments",
            RequestOptions::post().body(json!({"transaction_amount": 10.5, "installments": 1})),
        )
        .await
        .expect("created");

    assert_eq!(envelope.status, 201);
    assert_eq!(
        envelope.data,
        Payload::Json(json!({"transaction_amount": 10.5, "installments": 1}))
    );
}

// =============================================================================
// Response decoding
// =============================================================================

#[tokio::test]
async fn non_json_body_is_returned_as_raw_text() {
    let addr = serve(Router::new().route("/health", get(|| async { "pong" }))).await;
    let client = client_for(addr, |config| config);

    let envelope = client
        .request("/health", RequestOptions::get())
        .await
        .expect("plain text is still a success");

    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.data, Payload::Raw(String::from("pong")));
    assert!(envelope
        .header("Content-Type")
        .is_some_and(|value| value.starts_with("text/plain")));
}

#[tokio::test]
async fn error_status_carries_body_and_headers() {
    let addr = serve(Router::new().route(
        "/items/MLA404",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                [("x-request-id", "req-42")],
                Json(json!({"message": "Item with id MLA404 not found", "error": "not_found"})),
            )
        }),
    ))
    .await;
    let client = client_for(addr, |config| config);

    let error = client
        .request("/items/MLA404", RequestOptions::get())
        .await
        .expect_err("404");

    match error {
        ApiError::Status {
            status,
            data,
            headers,
        } => {
            assert_eq!(status, 404);
            assert_eq!(data.as_json().map(|body| &body["error"]), Some(&json!("not_found")));
            assert_eq!(headers.get("x-request-id").map(String::as_str), Some("req-42"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

// =============================================================================
// Failures and recovery
// =============================================================================

#[tokio::test]
async fn slow_server_triggers_timeout() {
    let addr = serve(Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    ))
    .await;
    let client = client_for(addr, |config| {
        config
            .with_timeout(Duration::from_millis(100))
            .with_max_retries(0)
    });

    let started = Instant::now();
    let error = client
        .request("/slow", RequestOptions::get())
        .await
        .expect_err("deadline passes");

    assert!(matches!(error, ApiError::Timeout { .. }), "got {error:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn closed_port_maps_to_connection_refused() {
    // Given: a port that was bound and released
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = client_for(addr, |config| config.with_max_retries(0));

    // When: the client connects
    let error = client
        .request("/users/me", RequestOptions::get())
        .await
        .expect_err("nothing listens");

    // Then: a connection-refused network error
    assert_eq!(
        error.network_code(),
        Some(NetworkErrorCode::ConnectionRefused),
        "got {error:?}"
    );
}

#[tokio::test]
async fn service_unavailable_then_success_recovers() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/v1/payments/7",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"message": "busy"})))
                } else {
                    (StatusCode::OK, Json(json!({"id": 7, "status": "approved"})))
                }
            }),
        )
        .with_state(hits.clone());
    let addr = serve(router).await;
    let client = client_for(addr, |config| {
        config
            .with_max_retries(2)
            .with_base_delay(Duration::from_millis(20))
    });

    let envelope = client
        .request("/v1/payments/7", RequestOptions::get())
        .await
        .expect("second attempt succeeds");

    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.data.as_json().map(|body| &body["status"]), Some(&json!("approved")));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
