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

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/v1/user/me",
    responses(
        (status = 200, description = "Token subject", body = MeResponse),
        (status = 401, description = "Missing, invalid, or expired access token", body = String),
        (status = 404, description = "Token subject no longer exists", body = String)
    ),
    tag = "user"
)]
pub async fn me(
    Extension(service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(token) = access_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response();
    };

    match service.whoami(&token).await {
        Ok(user) => Json(MeResponse {
            username: user.username,
        })
        .into_response(),
        Err(err @ (AuthError::TokenExpired | AuthError::TokenInvalid)) => {
            (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
        }
        Err(err @ AuthError::UserNotFound) => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Err(err) => {
            error!("Failed to resolve token subject: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()).into_response()
        }
    }
}
