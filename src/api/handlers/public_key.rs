use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::auth::AuthService;

/// Public verification key in SPKI PEM form, so independent services can
/// validate access tokens without calling back here. No authentication.
#[utoipa::path(
    get,
    path = "/v1/auth/public-key",
    responses(
        (status = 200, description = "RS256 public key, PEM encoded", body = String)
    ),
    tag = "auth"
)]
pub async fn public_key(Extension(service): Extension<Arc<AuthService>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-pem-file"),
    );
    (headers, service.keys().public_pem().to_string())
}
