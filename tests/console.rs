//! End-to-end sends against a live local server.
//!
//! Starts an axum app on a random port and drives the controller with the
//! real reqwest transport, so redirects, content types and transport
//! failures are exercised over actual HTTP.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::RawQuery;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use indexmap::IndexMap;
use serde_json::{json, Value};

use tryit_console::discovery::parse_openapi_value;
use tryit_console::{
    BodyDescriptor, ConsoleController, ConsoleError, ConsoleOptions, ConsoleState, HttpMethod,
    NetworkErrorKind, OperationDescriptor, ParameterDescriptor, RequestExecutor, ReqwestTransport,
    ResponseBody, ResponseRecord, SchemeKind, SecurityScheme, SendInput, SendOutcome,
};

async fn echo(
    method: Method,
    uri: Uri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}

fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/items/{id}", any(echo))
        .route("/pets/{pet_id}", any(echo))
        .route(
            "/redirect",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/echo")]) }),
        )
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))) }),
        )
        .route("/text", get(|| async { "plain text" }))
        .route(
            "/broken",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{not json").into_response() }),
        )
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        )
}

/// Serve the app on a random port and return its base URL
async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    format!("http://{}", addr)
}

fn controller(options: ConsoleOptions) -> ConsoleController<ReqwestTransport> {
    controller_with_timeout(options, Duration::from_secs(5))
}

fn controller_with_timeout(
    options: ConsoleOptions,
    timeout: Duration,
) -> ConsoleController<ReqwestTransport> {
    let transport = ReqwestTransport::new(timeout).unwrap();
    ConsoleController::new(RequestExecutor::new(transport), options)
}

fn operation(method: HttpMethod, base: &str, path: &str) -> OperationDescriptor {
    let mut op = OperationDescriptor::new(method, path);
    op.servers = vec![base.to_string()];
    op
}

async fn send_ok(
    controller: &ConsoleController<ReqwestTransport>,
    input: SendInput<'_>,
) -> ResponseRecord {
    match controller.send(input).await {
        Some(SendOutcome::Success(record)) => record,
        other => panic!("expected success, got {:?}", other),
    }
}

// --- request shaping ---

#[tokio::test]
async fn post_carries_path_query_headers_and_body() {
    let base = start_server().await;
    let mut op = operation(HttpMethod::POST, &base, "/items/{id}");
    op.parameters = vec![
        ParameterDescriptor::path("id", "42"),
        ParameterDescriptor::query("verbose", "true"),
    ];
    op.body = Some(BodyDescriptor::json());
    op.security = vec!["bearerAuth".to_string()];

    let mut additional_headers = IndexMap::new();
    additional_headers.insert("X-Trace".to_string(), "abc".to_string());
    let console = controller(ConsoleOptions {
        additional_headers,
        security_schemes: vec![SecurityScheme::new("bearerAuth", SchemeKind::Bearer).with_token("t0k")],
    });

    let record = send_ok(&console, SendInput::new(&op).body(r#"{ "name": "Rex" }"#)).await;

    assert!(record.ok);
    assert_eq!(record.status, 200);
    assert_eq!(record.url, format!("{}/items/42?verbose=true", base));
    let echoed = record.body.as_json().unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/items/42");
    assert_eq!(echoed["query"], "verbose=true");
    assert_eq!(echoed["body"], r#"{"name":"Rex"}"#);
    assert_eq!(echoed["headers"]["authorization"], "Bearer t0k");
    assert_eq!(echoed["headers"]["content-type"], "application/json");
    assert_eq!(echoed["headers"]["x-trace"], "abc");
    assert!(record.curl.starts_with(&format!("curl -X POST '{}/items/42?verbose=true'", base)));
    assert!(record.curl.contains("-d '{\"name\":\"Rex\"}'"));
}

#[tokio::test]
async fn get_moves_body_into_query() {
    let base = start_server().await;
    let mut op = operation(HttpMethod::GET, &base, "/echo");
    op.body = Some(BodyDescriptor::json());
    op.parameters = vec![ParameterDescriptor::query("page", "2")];
    let console = controller(ConsoleOptions::default());

    let record = send_ok(&console, SendInput::new(&op).body(r#"{"filter": {"tag": "a b"}}"#)).await;

    let echoed = record.body.as_json().unwrap();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["query"], "filter%5Btag%5D=a%20b&page=2");
    assert_eq!(echoed["body"], "");
    assert!(!record.curl.contains(" -d "));
}

// --- response normalization ---

#[tokio::test]
async fn redirect_is_reported_not_followed() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/redirect");
    let console = controller(ConsoleOptions::default());

    let record = send_ok(&console, SendInput::new(&op)).await;

    assert_eq!(record.status, 302);
    assert_eq!(record.status_text, "Found");
    assert!(record.redirected);
    assert!(!record.ok);
    assert_eq!(record.header("location"), Some("/echo"));
    assert_eq!(record.url, format!("{}/redirect", base));
}

#[tokio::test]
async fn error_status_is_a_record_with_parsed_body() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/missing");
    let console = controller(ConsoleOptions::default());

    let record = send_ok(&console, SendInput::new(&op)).await;

    assert!(!record.ok);
    assert_eq!(record.status, 404);
    assert_eq!(record.body, ResponseBody::Json(json!({"error": "not found"})));
    assert!(record.payload_error.is_none());
}

#[tokio::test]
async fn plain_text_body_stays_text() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/text");
    let console = controller(ConsoleOptions::default());

    let record = send_ok(&console, SendInput::new(&op)).await;

    assert_eq!(record.body, ResponseBody::Text("plain text".to_string()));
    assert!(record.header("content-type").unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn malformed_json_surfaces_payload_error() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/broken");
    let console = controller(ConsoleOptions::default());

    let record = send_ok(&console, SendInput::new(&op)).await;

    assert!(record.ok);
    assert_eq!(record.body, ResponseBody::Text("{not json".to_string()));
    let error = record.payload_error.unwrap();
    assert_eq!(error.content_type, "application/json");
}

#[tokio::test]
async fn no_content_is_empty_body() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/empty");
    let console = controller(ConsoleOptions::default());

    let record = send_ok(&console, SendInput::new(&op)).await;

    assert_eq!(record.status, 204);
    assert_eq!(record.body, ResponseBody::Empty);
}

// --- failures ---

#[tokio::test]
async fn connection_refused_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let op = operation(HttpMethod::GET, &format!("http://127.0.0.1:{}", port), "/echo");
    let console = controller(ConsoleOptions::default());

    match console.send(SendInput::new(&op)).await {
        Some(SendOutcome::Failure(ConsoleError::Network(e))) => {
            assert_eq!(e.kind, NetworkErrorKind::Connect)
        }
        other => panic!("expected connect failure, got {:?}", other),
    }
    assert!(!console.is_busy());
}

#[tokio::test]
async fn slow_server_hits_transport_timeout() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/slow");
    let console = controller_with_timeout(ConsoleOptions::default(), Duration::from_millis(200));

    match console.send(SendInput::new(&op)).await {
        Some(SendOutcome::Failure(ConsoleError::Network(e))) => {
            assert_eq!(e.kind, NetworkErrorKind::Timeout)
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(!console.is_busy());
}

#[tokio::test]
async fn abandoned_send_clears_busy() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/slow");
    let console = controller(ConsoleOptions::default());

    let elapsed = tokio::time::timeout(Duration::from_millis(100), console.send(SendInput::new(&op))).await;

    assert!(elapsed.is_err());
    assert!(!console.is_busy());
    match console.state() {
        ConsoleState::Settled { seq: 1, outcome } => {
            assert_eq!(outcome.error(), Some(&ConsoleError::Cancelled))
        }
        other => panic!("expected cancelled state, got {:?}", other),
    }
}

#[tokio::test]
async fn subscriber_sees_sending_then_settled() {
    let base = start_server().await;
    let op = operation(HttpMethod::GET, &base, "/echo");
    let console = controller(ConsoleOptions::default());
    let mut states = console.subscribe();

    send_ok(&console, SendInput::new(&op)).await;

    assert_eq!(states.recv().await, Some(ConsoleState::Idle));
    assert_eq!(states.recv().await, Some(ConsoleState::Sending { seq: 1 }));
    match states.recv().await {
        Some(ConsoleState::Settled { seq: 1, outcome }) => assert!(outcome.record().is_some()),
        other => panic!("expected settled state, got {:?}", other),
    }
}

// --- loaded document ---

#[tokio::test]
async fn operation_from_document_round_trips() {
    let base = start_server().await;
    let document = parse_openapi_value(&json!({
        "openapi": "3.0.0",
        "servers": [{"url": base}],
        "components": {
            "securitySchemes": {
                "keyAuth": {"type": "apiKey", "in": "header", "name": "X-Api-Key"}
            }
        },
        "security": [{"keyAuth": []}],
        "paths": {
            "/pets/{petId}": {
                "get": {
                    "operationId": "getPet",
                    "parameters": [
                        {"name": "petId", "in": "path", "required": true},
                        {"name": "fields", "in": "query", "schema": {"default": "name"}}
                    ]
                }
            }
        }
    }))
    .unwrap();

    let mut op = document.find_operation("getPet").unwrap().clone();
    op.parameter_mut("petId").unwrap().value = "7".to_string();
    let schemes = document.schemes_with_tokens(|id| (id == "keyAuth").then_some("secret"));
    let console = controller(ConsoleOptions {
        additional_headers: IndexMap::new(),
        security_schemes: schemes,
    });

    let record = send_ok(&console, SendInput::new(&op)).await;

    let echoed = record.body.as_json().unwrap();
    assert_eq!(echoed["path"], "/pets/7");
    assert_eq!(echoed["query"], "fields=name");
    assert_eq!(echoed["headers"]["x-api-key"], "secret");
}
