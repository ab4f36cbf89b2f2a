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

use super::{client_from, valid_username};
use crate::api::cookies::grant_cookies;
use crate::auth::{AuthService, error::AuthError};

// No Debug on purpose: the password must never reach logs.
#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GrantResponse {
    pub user: String,
    pub session: String,
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, credentials set as cookies", body = GrantResponse),
        (status = 400, description = "Missing or invalid payload", body = String),
        (status = 404, description = "User not found or password doesn't match", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_username(&request.username) || request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid username or password".to_string())
            .into_response();
    }

    let client = client_from(&headers);

    match service
        .login(&request.username, &request.password, &client)
        .await
    {
        Ok(grant) => {
            let Ok(cookies) = grant_cookies(service.config(), &grant) else {
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                    .into_response();
            };
            let body = GrantResponse {
                user: grant.username,
                session: grant.session_id.to_string(),
            };
            (StatusCode::OK, cookies, Json(body)).into_response()
        }
        Err(err @ AuthError::InvalidCredentials) => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Err(err) => {
            error!("Login failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()).into_response()
        }
    }
}
