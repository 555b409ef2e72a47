//! HTTP handlers: health check and action dispatch.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use serde::Serialize;
use serde_json::Value;

use domain::User;

use super::state::AppState;
use crate::dispatch::{ActionRequest, Verb};
use crate::service::UserService;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint - verifies database connectivity.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.uow.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                error: Some(e.user_message()),
            }),
        )
            .into_response(),
    }
}

/// `/users` with no action segment.
pub async fn dispatch_root(
    State(state): State<AppState>,
    method: Method,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    dispatch(&state, method, String::new(), credentials, query, body).await
}

/// `/users/<action>[/<id>]`.
pub async fn dispatch_path(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    dispatch(&state, method, path, credentials, query, body).await
}

async fn dispatch(
    state: &AppState,
    method: Method,
    path: String,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    query: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let Some(verb) = Verb::from_method(&method) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    let identity = identify(state, credentials).await;
    let request = ActionRequest {
        verb,
        path,
        body: parse_body(&body),
        query,
    };

    state.dispatcher.dispatch(&identity, request).await.into_response()
}

/// Resolve Basic credentials to a stored user; anything else is anonymous.
async fn identify(state: &AppState, credentials: Option<TypedHeader<Authorization<Basic>>>) -> User {
    let Some(TypedHeader(Authorization(basic))) = credentials else {
        return User::anonymous();
    };

    match state
        .dispatcher
        .users()
        .authenticate(basic.username(), basic.password())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(email = basic.username(), "Credentials rejected");
            User::anonymous()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Authentication failed");
            User::anonymous()
        }
    }
}

/// Lenient JSON body: empty or malformed input counts as no body.
fn parse_body(bytes: &Bytes) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed request body");
            None
        }
    }
}
