use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::{client_from, cookie_value, login::GrantResponse};
use crate::api::cookies::{REFRESH_COOKIE, SESSION_COOKIE, grant_cookies};
use crate::auth::{AuthService, error::AuthError};

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    responses(
        (status = 200, description = "Rotated credentials set as cookies", body = GrantResponse),
        (status = 401, description = "Session id or refresh token cookie missing", body = String),
        (status = 403, description = "Unknown session or refresh token mismatch", body = String),
        (status = 404, description = "Session owner no longer exists", body = String)
    ),
    tag = "auth"
)]
pub async fn refresh(
    Extension(service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(sessid) = cookie_value(&headers, SESSION_COOKIE) else {
        return (
            StatusCode::UNAUTHORIZED,
            "Unauthorized, session id isn't set".to_string(),
        )
            .into_response();
    };
    let Some(refresh_tag) = cookie_value(&headers, REFRESH_COOKIE) else {
        return (
            StatusCode::UNAUTHORIZED,
            "Unauthorized, refresh token not found".to_string(),
        )
            .into_response();
    };
    let Ok(session_id) = sessid.parse::<Uuid>() else {
        return (
            StatusCode::UNAUTHORIZED,
            "Unauthorized, session id is malformed".to_string(),
        )
            .into_response();
    };

    let client = client_from(&headers);

    match service.refresh(session_id, &refresh_tag, &client).await {
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
        Err(err @ (AuthError::SessionNotFound | AuthError::RefreshMismatch)) => {
            (StatusCode::FORBIDDEN, format!("Forbidden, {err}")).into_response()
        }
        Err(err @ AuthError::UserNotFound) => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Err(err) => {
            error!("Refresh failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()).into_response()
        }
    }
}
