use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use twisterlang::codec;
use twisterlang::daemon::{build_router, AppState};

fn app(token: &str) -> axum::Router {
    build_router(AppState {
        token: token.to_string(),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_and_auth() {
    let app = app("token");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/envelopes", None, json!({"payload": {"k": "v"}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/envelopes")
                .header("content-type", "application/json")
                .header("x-api-key", "token")
                .body(Body::from(json!({"payload": {"k": "v"}}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn build_route_returns_envelope_and_transport_text() {
    let app = app("token");

    let response = app
        .clone()
        .oneshot(post_json(
            "/envelopes",
            Some("token"),
            json!({"toolName": "create_browser_tool", "args": {"target_url": "https://example.com"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    let envelope = &value["envelope"];
    assert_eq!(envelope["version"], json!("1.0"));
    assert!(envelope["correlationId"].is_string());
    assert_eq!(
        envelope["payload"],
        json!({"toolName": "create_browser_tool", "args": {"target_url": "https://example.com"}})
    );

    let encoded = value["encoded"].as_str().unwrap();
    let decoded = codec::decode_from_text(encoded).unwrap();
    assert_eq!(&decoded, envelope);
}

#[tokio::test]
async fn build_route_rejects_unmatched_shapes() {
    let app = app("token");

    let response = app
        .clone()
        .oneshot(post_json("/envelopes", Some("token"), json!({"other": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await;
    assert!(value["error"].as_str().unwrap().contains("invalid arguments"));

    let response = app
        .clone()
        .oneshot(post_json("/envelopes", Some("token"), json!(42)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn decode_route_round_trips_and_flags_validity() {
    let app = app("token");

    let envelope = codec::build(codec::BuildRequest::Payload {
        payload: json!({"k": "v"}),
        version: None,
        correlation_id: Some("daemon-id".to_string()),
    })
    .unwrap();
    let encoded = codec::encode_to_text(&envelope).unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/envelopes/decode",
            Some("token"),
            json!({"text": encoded}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response).await;
    assert_eq!(value["message"], envelope.to_value());
    assert_eq!(value["valid"], json!(true));

    let response = app
        .clone()
        .oneshot(post_json(
            "/envelopes/decode",
            Some("token"),
            json!({"text": "%%% not transport text %%%"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await;
    assert!(value["error"].as_str().unwrap().contains("decode error"));
}

#[tokio::test]
async fn empty_token_leaves_routes_open() {
    let app = app("");

    let response = app
        .clone()
        .oneshot(post_json("/envelopes", None, json!({"payload": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
