use thiserror::Error;

/// Failure taxonomy for the session and token lifecycle.
///
/// Every failure is terminal for the current request; the transport layer
/// maps each kind to a status code. Messages stay opaque: no password or raw
/// refresh material ever appears here.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad username or bad password, intentionally indistinguishable so the
    /// login endpoint cannot be used to enumerate usernames.
    #[error("user not found or password doesn't match")]
    InvalidCredentials,

    /// No session with the presented id. Also returned when a concurrent
    /// renewal consumed the session first.
    #[error("session with supplied id not found")]
    SessionNotFound,

    /// The presented refresh tag does not match the stored commitment.
    #[error("session refresh token doesn't match supplied token")]
    RefreshMismatch,

    #[error("access token expired")]
    TokenExpired,

    /// Bad signature or malformed token.
    #[error("access token invalid")]
    TokenInvalid,

    /// A session points at a user that no longer exists. Data-integrity
    /// anomaly, reported rather than silently repaired.
    #[error("user not found")]
    UserNotFound,

    /// The persistence layer failed or timed out.
    #[error("session store unavailable")]
    Store(#[source] anyhow::Error),

    /// Signing or random generation failed.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}
