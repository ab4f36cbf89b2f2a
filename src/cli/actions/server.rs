use crate::api;
use crate::auth::{AuthConfig, keys::KeyMaterial};
use crate::cli::actions::Action;
use anyhow::{Context, Result, ensure};
use secrecy::SecretString;
use std::fs;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            private_key,
            public_key,
            issuer,
            jwt_duration,
            session_duration,
            cookie_domain,
            cookie_secure,
        } => {
            let parsed = Url::parse(&dsn).context("invalid database connection string")?;
            ensure!(
                parsed.scheme() == "postgres" || parsed.scheme() == "postgresql",
                "unsupported dsn scheme: {}",
                parsed.scheme()
            );

            let private_pem = SecretString::from(
                fs::read_to_string(&private_key)
                    .with_context(|| format!("failed to read private key at {private_key}"))?,
            );
            let public_pem = fs::read_to_string(&public_key)
                .with_context(|| format!("failed to read public key at {public_key}"))?;

            let keys = KeyMaterial::from_pem(&private_pem, &public_pem)?;

            let config = AuthConfig::new()
                .with_issuer(issuer)
                .with_jwt_ttl_seconds(jwt_duration)
                .with_session_ttl_seconds(session_duration)
                .with_cookie_domain(cookie_domain)
                .with_cookie_secure(cookie_secure);

            api::new(port, dsn, keys, config).await?;
        }
    }

    Ok(())
}
