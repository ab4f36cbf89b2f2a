use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::access_token;
use crate::auth::{AuthService, error::AuthError};
use crate::store::SessionRecord;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionInfo {
    pub id: String,
    pub client: String,
    pub created_at: String,
}

impl From<SessionRecord> for SessionInfo {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.id.to_string(),
            client: record.client,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/user/sessions",
    responses(
        (status = 200, description = "Outstanding sessions of the token subject", body = [SessionInfo]),
        (status = 401, description = "Missing, invalid, or expired access token", body = String),
        (status = 404, description = "Token subject no longer exists", body = String)
    ),
    tag = "user"
)]
pub async fn sessions(
    Extension(service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(token) = access_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response();
    };

    match service.list_sessions(&token).await {
        Ok(records) => {
            let sessions: Vec<SessionInfo> = records.into_iter().map(SessionInfo::from).collect();
            Json(sessions).into_response()
        }
        Err(err @ (AuthError::TokenExpired | AuthError::TokenInvalid)) => {
            (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
        }
        Err(err @ AuthError::UserNotFound) => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Err(err) => {
            error!("Failed to list sessions: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()).into_response()
        }
    }
}
