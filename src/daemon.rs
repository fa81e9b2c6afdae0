use std::future::Future;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::codec::{self, BuildRequest};
use crate::error::{Result, TwisterLangError};

#[derive(Clone)]
pub struct AppState {
    pub token: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct BuildResponse {
    envelope: Value,
    encoded: String,
}

#[derive(Deserialize)]
struct DecodeRequest {
    text: String,
}

#[derive(Serialize)]
struct DecodeResponse {
    message: Value,
    valid: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/envelopes", post(build_envelope))
        .route("/envelopes/decode", post(decode_envelope))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn build_envelope(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if let Err(err) = authorize(&headers, &state.token) {
        return err.into_response();
    }

    let envelope = match BuildRequest::from_value(body).and_then(codec::build) {
        Ok(envelope) => envelope,
        Err(err) => return error_response(err),
    };
    match codec::encode_to_text(&envelope) {
        Ok(encoded) => (
            StatusCode::OK,
            Json(BuildResponse {
                envelope: envelope.to_value(),
                encoded,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

async fn decode_envelope(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DecodeRequest>,
) -> impl IntoResponse {
    if let Err(err) = authorize(&headers, &state.token) {
        return err.into_response();
    }

    match codec::decode_from_text(&body.text) {
        Ok(message) => {
            let valid = codec::validate(&message);
            (StatusCode::OK, Json(DecodeResponse { message, valid })).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: TwisterLangError) -> Response {
    let status = match err {
        TwisterLangError::InvalidArguments(_)
        | TwisterLangError::Decode(_)
        | TwisterLangError::Parse(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn authorize(
    headers: &HeaderMap,
    token: &str,
) -> std::result::Result<(), (StatusCode, Json<ErrorResponse>)> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let api_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let bearer = header.strip_prefix("Bearer ").unwrap_or("");

    if bearer == token || api_key == token {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
            }),
        ))
    }
}

pub async fn run(host: &str, port: u16, token: &str) -> Result<()> {
    run_with_shutdown(host, port, token, std::future::pending::<()>()).await
}

pub async fn run_with_shutdown<F>(host: &str, port: u16, token: &str, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState {
        token: token.to_string(),
    };
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TwisterLangError::Runtime(e.to_string()))?;
    info!("twisterlangd listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| TwisterLangError::Runtime(e.to_string()))?;

    Ok(())
}
