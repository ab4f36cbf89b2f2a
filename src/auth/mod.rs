//! Session lifecycle core: login, rotation-on-refresh, logout, and
//! stateless access-token checks.

pub mod error;
pub mod keys;
pub mod password;
pub mod refresh;
pub mod token;

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::store::{NewSession, SessionRecord, SessionStore, UserRecord, UserStore};
use error::AuthError;
use keys::KeyMaterial;
use refresh::RefreshCommitment;

const DEFAULT_ISSUER: &str = "auth.sesamo.dev";
const DEFAULT_JWT_TTL_SECONDS: i64 = 2 * 60 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_COOKIE_DOMAIN: &str = "localhost";

/// Lifecycle configuration, explicitly constructed and handed to the
/// service; there is no ambient global state.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    issuer: String,
    jwt_ttl_seconds: i64,
    session_ttl_seconds: i64,
    cookie_domain: String,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            jwt_ttl_seconds: DEFAULT_JWT_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_domain: DEFAULT_COOKIE_DOMAIN.to_string(),
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = issuer;
        self
    }

    /// Single source of truth for access-token lifetime: drives both the
    /// `exp` claim and the transport cookie.
    #[must_use]
    pub fn with_jwt_ttl_seconds(mut self, seconds: i64) -> Self {
        self.jwt_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_domain(mut self, domain: String) -> Self {
        self.cookie_domain = domain;
        self
    }

    /// Only mark cookies `Secure` when the service is served over HTTPS.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn cookie_domain(&self) -> &str {
        &self.cookie_domain
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn jwt_ttl_seconds(&self) -> i64 {
        self.jwt_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a successful login or renewal hands to the transport layer.
#[derive(Clone, Debug)]
pub struct Grant {
    pub username: String,
    pub session_id: Uuid,
    pub access_token: String,
    pub refresh_tag: String,
}

/// The login/refresh/logout state machine over the supplied stores.
pub struct AuthService {
    keys: KeyMaterial,
    config: AuthConfig,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        keys: KeyMaterial,
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            keys,
            config,
            users,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    /// Verify credentials and mint a new session with its token pair.
    ///
    /// A bad username and a bad password are deliberately the same failure.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client: &str,
    ) -> Result<Grant, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.mint(&user, client).await
    }

    /// Exchange a `(session id, refresh tag)` pair for a successor session.
    ///
    /// The old record is deleted before any successor credential exists; a
    /// lost delete race mints nothing and reports the session as gone, so
    /// one presented credential can never fan out into sibling sessions.
    pub async fn refresh(
        &self,
        session_id: Uuid,
        refresh_tag: &str,
        client: &str,
    ) -> Result<Grant, AuthError> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::SessionNotFound)?;

        let commitment =
            RefreshCommitment::decode(&session.refresh_commitment).map_err(AuthError::Internal)?;

        if !commitment.matches(refresh_tag) {
            return Err(AuthError::RefreshMismatch);
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::UserNotFound)?;

        // Point of no return: only the caller whose delete removed the row
        // proceeds to mint. Everyone else lost the race.
        let deleted = self
            .sessions
            .delete_by_id(session_id)
            .await
            .map_err(AuthError::Store)?;
        if !deleted {
            debug!(%session_id, "session already consumed by a concurrent refresh");
            return Err(AuthError::SessionNotFound);
        }

        self.mint(&user, client).await
    }

    /// Delete a session without minting a successor. Idempotent.
    pub async fn logout(&self, session_id: Uuid) -> Result<(), AuthError> {
        self.sessions
            .delete_by_id(session_id)
            .await
            .map_err(AuthError::Store)?;
        Ok(())
    }

    /// Stateless token check, then subject resolution.
    pub async fn whoami(&self, access_token: &str) -> Result<UserRecord, AuthError> {
        let claims = token::verify(&self.keys, &self.config.issuer, access_token)?;
        self.users
            .find_by_username(&claims.sub)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::UserNotFound)
    }

    /// All outstanding sessions owned by the token's subject.
    pub async fn list_sessions(&self, access_token: &str) -> Result<Vec<SessionRecord>, AuthError> {
        let user = self.whoami(access_token).await?;
        self.sessions
            .find_by_user(user.id)
            .await
            .map_err(AuthError::Store)
    }

    async fn mint(&self, user: &UserRecord, client: &str) -> Result<Grant, AuthError> {
        let access_token = token::sign(
            &self.keys,
            &self.config.issuer,
            &user.username,
            self.config.jwt_ttl_seconds,
        )?;

        let commitment = RefreshCommitment::generate().map_err(AuthError::Internal)?;
        let refresh_tag = commitment.tag().map_err(AuthError::Internal)?;

        let session_id = self
            .sessions
            .insert(NewSession {
                user_id: user.id,
                client: client.to_string(),
                refresh_commitment: commitment.encode(),
                ttl_seconds: self.config.session_ttl_seconds,
            })
            .await
            .map_err(AuthError::Store)?;

        debug!(%session_id, username = %user.username, "minted session");

        Ok(Grant {
            username: user.username.clone(),
            session_id,
            access_token,
            refresh_tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AuthConfig::new();
        assert_eq!(config.issuer(), "auth.sesamo.dev");
        assert_eq!(config.jwt_ttl_seconds(), 7200);
        assert_eq!(config.session_ttl_seconds(), 86400);
    }

    #[test]
    fn config_builders_override_defaults() {
        let config = AuthConfig::new()
            .with_issuer("auth.example.com".to_string())
            .with_jwt_ttl_seconds(600)
            .with_session_ttl_seconds(3600);
        assert_eq!(config.issuer(), "auth.example.com");
        assert_eq!(config.jwt_ttl_seconds(), 600);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }
}
