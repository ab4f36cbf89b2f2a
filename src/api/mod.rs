//! HTTP surface: route wiring, middleware layers, and process serve loop.
//! All lifecycle decisions live in [`crate::auth`]; this module only frames
//! requests and responses.

use anyhow::{Context, Result};
use axum::{
    Extension, Json, Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, debug_span, info};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{AuthConfig, AuthService, keys::KeyMaterial, password};
use crate::store::{PgSessionStore, PgUserStore, UserStore};

pub mod cookies;
pub mod handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::login,
        handlers::refresh::refresh,
        handlers::logout::logout,
        handlers::public_key::public_key,
        handlers::me::me,
        handlers::sessions::sessions,
    ),
    components(schemas(
        handlers::login::LoginRequest,
        handlers::login::GrantResponse,
        handlers::me::MeResponse,
        handlers::sessions::SessionInfo,
    )),
    tags(
        (name = "auth", description = "Session and token lifecycle"),
        (name = "user", description = "Token-authenticated user queries"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Build the application router. Takes the already-constructed service so
/// tests can drive the same wiring over in-memory stores.
#[must_use]
pub fn router(service: Arc<AuthService>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        // credentials mode: echo the caller's origin instead of `*`
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(|| async { Json(json!({"hello": "world"})) }))
        .route("/health", get(handlers::health::health))
        .route("/v1/auth/login", post(handlers::login::login))
        .route("/v1/auth/refresh", post(handlers::refresh::refresh))
        .route("/v1/auth/logout", post(handlers::logout::logout))
        .route("/v1/auth/public-key", get(handlers::public_key::public_key))
        .route("/v1/user/me", get(handlers::me::me))
        .route("/v1/user/sessions", get(handlers::sessions::sessions))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(service)),
        )
}

/// Connect the stores, bootstrap the first user if needed, and serve.
///
/// # Errors
/// Returns an error if the database or listener cannot be set up.
pub async fn new(port: u16, dsn: String, keys: KeyMaterial, config: AuthConfig) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    bootstrap_admin(users.as_ref()).await?;

    let sessions = Arc::new(PgSessionStore::new(pool));
    let service = Arc::new(AuthService::new(keys, config, users, sessions));

    let app = router(service);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// First-run convenience: an empty user table gets an `admin` account with a
/// random password, printed once to the log.
async fn bootstrap_admin(users: &dyn UserStore) -> Result<()> {
    if users.count().await? > 0 {
        return Ok(());
    }

    let password = password::random_password()?;
    let hash = password::hash_password(&password)?;
    users.insert("admin", &hash).await?;

    info!(
        "No users found, created one new - login: admin, password: {}",
        password
    );

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/health",
            "/v1/auth/login",
            "/v1/auth/refresh",
            "/v1/auth/logout",
            "/v1/auth/public-key",
            "/v1/user/me",
            "/v1/user/sessions",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing {expected} in OpenAPI paths"
            );
        }
    }
}
