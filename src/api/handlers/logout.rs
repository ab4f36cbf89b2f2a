use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::cookie_value;
use crate::api::cookies::{SESSION_COOKIE, clear_cookies};
use crate::auth::AuthService;

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session revoked and cookies cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(session_id) = cookie_value(&headers, SESSION_COOKIE)
        .and_then(|sessid| sessid.parse::<Uuid>().ok())
    {
        if let Err(err) = service.logout(session_id).await {
            error!("Failed to delete session: {err}");
        }
    }

    // Always clear the cookies, even if the session record was missing.
    match clear_cookies(service.config()) {
        Ok(cookies) => (StatusCode::NO_CONTENT, cookies).into_response(),
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}
