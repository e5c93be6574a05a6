//! HTTP surface for the recommendation service.
//!
//! Routes:
//! - `POST /api/gifts/find-gifts`: questionnaire in, ranked gifts out
//! - `POST /api/gifts/feedback`: rate a past search
//! - `GET /api/stats`: usage counters
//! - `GET /api/dashboard/summary`: the caller's recent activity
//! - `GET /health`: liveness
//!
//! The caller is identified by the `X-User-Id` header. Errors are JSON
//! bodies of the form `{"error": "..."}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{GiftError, Result};
use crate::history::{Feedback, HistoryError};
use crate::profile::ProfileRequest;
use crate::recommend::GiftService;

/// Header carrying the caller's user id, when known.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
struct AppState {
    service: GiftService,
}

/// Build the application router.
pub fn router(service: GiftService) -> Router {
    let state = AppState { service };
    Router::new()
        .route("/health", get(health))
        .route("/api/gifts/find-gifts", post(find_gifts))
        .route("/api/gifts/feedback", post(feedback))
        .route("/api/stats", get(stats))
        .route("/api/dashboard/summary", get(dashboard_summary))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, service: GiftService) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GiftError::Server(format!("failed to bind {addr}: {e}")))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "GiftGenius listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GiftError::Server(e.to_string()))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn find_gifts(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<ProfileRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match state.service.find_gifts(&request, user_id(&headers)).await {
        Ok(recommendation) => (StatusCode::OK, Json(recommendation)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Feedback as posted. The user id may come in the body when the
/// `X-User-Id` header is absent; the header wins when both are present.
#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    #[serde(default, alias = "userId")]
    user_id: Option<i64>,
    #[serde(default, alias = "searchId")]
    search_id: Option<i64>,
    rating: u8,
    satisfied: bool,
    #[serde(default)]
    comments: Option<String>,
}

async fn feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<FeedbackRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let Some(user_id) = user_id(&headers).or(request.user_id) else {
        return bad_request(format!("{USER_ID_HEADER} header or user_id is required"));
    };
    let feedback = Feedback {
        user_id,
        search_id: request.search_id,
        rating: request.rating,
        satisfied: request.satisfied,
        comments: request.comments,
    };

    match state.service.record_feedback(feedback).await {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "feedback recorded",
                "id": id
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn stats(State(state): State<AppState>) -> Response {
    match state.service.statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn dashboard_summary(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(user_id) = user_id(&headers) else {
        return bad_request(format!("{USER_ID_HEADER} header is required"));
    };
    match state.service.user_summary(user_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

fn user_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

/// Map a service error to a status code. Internal details are logged,
/// not returned.
fn error_response(err: GiftError) -> Response {
    let (status, message) = match &err {
        GiftError::InvalidProfile(_) | GiftError::History(HistoryError::InvalidFeedback(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        GiftError::History(HistoryError::Disabled) => {
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_owned(),
            )
        }
    };
    (status, Json(serde_json::json!({"error": message}))).into_response()
}
