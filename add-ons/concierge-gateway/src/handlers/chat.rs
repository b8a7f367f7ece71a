//! Chat endpoints: answer one message within a conversation, or end the conversation.
//!
//! The conversation is identified by `sessionId` in the body, else the `x-session-id`
//! header, else a fresh v4 uuid. The effective id is echoed in the `x-session-id` response header.

use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use concierge_core::ResolvedAnswer;

pub const SESSION_HEADER: &str = "x-session-id";

/// Body of `POST /chat`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /chat – resolves the message; unmatched messages go to the fallback responder.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(target: "concierge::gateway", error = %rejection, "Unreadable chat body");
            ChatRequest::default()
        }
    };
    let Some(message) = req.message.filter(|m| !m.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Message is required" })),
        )
            .into_response();
    };

    let session_id = session_id(req.session_id.as_deref(), &headers);
    tracing::info!(
        target: "concierge::gateway",
        session_id = %session_id,
        chars = message.chars().count(),
        "Chat request received"
    );

    let (status, answer) = match state.concierge.answer(&session_id, &message).await {
        Ok(answer) => (StatusCode::OK, answer),
        Err(e) => {
            tracing::error!(target: "concierge::gateway", session_id = %session_id, error = %e, "Chat request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, ResolvedAnswer::service_unavailable())
        }
    };

    let mut response = (status, Json(answer)).into_response();
    match HeaderValue::from_str(&session_id) {
        Ok(value) => {
            response.headers_mut().insert(SESSION_HEADER, value);
        }
        Err(_) => tracing::warn!(target: "concierge::gateway", "Session id not representable as a header"),
    }
    response
}

/// DELETE /chat/session/:session_id – forgets the conversation (pending follow-ups included).
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> StatusCode {
    let existed = state.concierge.sessions().end(&session_id);
    tracing::info!(target: "concierge::gateway", session_id = %session_id, existed, "Session ended");
    StatusCode::NO_CONTENT
}

/// Body id, then header id, then a new uuid. Blank ids count as absent.
pub fn session_id(from_body: Option<&str>, headers: &HeaderMap) -> String {
    let from_header = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());
    from_body
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .or_else(|| from_header.map(str::trim).filter(|id| !id.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_id_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(session_id(Some("from-body"), &headers), "from-body");
        assert_eq!(session_id(Some("  "), &headers), "from-header");
        assert_eq!(session_id(None, &headers), "from-header");
    }

    #[test]
    fn missing_id_is_generated() {
        let a = session_id(None, &HeaderMap::new());
        let b = session_id(None, &HeaderMap::new());
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
