//! RS256 access tokens: short-lived, self-contained, verifiable without a
//! store lookup.

use chrono::Utc;
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use super::{error::AuthError, keys::KeyMaterial};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer, fixed per deployment.
    pub iss: String,
    /// Subject: the username.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Sign an access token for `subject`, expiring `ttl_seconds` from now.
pub fn sign(
    keys: &KeyMaterial,
    issuer: &str,
    subject: &str,
    ttl_seconds: i64,
) -> Result<String, AuthError> {
    sign_at(keys, issuer, subject, ttl_seconds, Utc::now().timestamp())
}

/// Sign with an explicit clock, so expiry behavior is testable.
pub fn sign_at(
    keys: &KeyMaterial,
    issuer: &str,
    subject: &str,
    ttl_seconds: i64,
    now: i64,
) -> Result<String, AuthError> {
    let claims = Claims {
        iss: issuer.to_string(),
        sub: subject.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(&Header::new(Algorithm::RS256), &claims, keys.encoding())
        .map_err(|err| AuthError::Internal(anyhow::Error::new(err).context("token signing")))
}

/// Verify signature, issuer, and expiry against the public key only.
pub fn verify(keys: &KeyMaterial, issuer: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = 0;
    validation.set_issuer(&[issuer]);

    decode::<Claims>(token, keys.decoding(), &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    const PRIVATE_PEM: &str = include_str!("../../tests/data/rsa_test_key.pem");
    const PUBLIC_PEM: &str = include_str!("../../tests/data/rsa_test_pub.pem");
    const OTHER_PUBLIC_PEM: &str = include_str!("../../tests/data/rsa_test_pub2.pem");
    const ISSUER: &str = "auth.sesamo.dev";

    fn keys() -> KeyMaterial {
        KeyMaterial::from_pem(&SecretString::from(PRIVATE_PEM.to_string()), PUBLIC_PEM)
            .expect("test keys")
    }

    #[test]
    fn sign_verify_round_trip() {
        let keys = keys();
        let token = sign(&keys, ISSUER, "admin", 7200).expect("sign");
        let claims = verify(&keys, ISSUER, &token).expect("verify");
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 7200);
    }

    #[test]
    fn expired_token_fails_with_expired() {
        let keys = keys();
        // Simulated clock: issued an hour ago with a short TTL.
        let past = Utc::now().timestamp() - 3600;
        let token = sign_at(&keys, ISSUER, "admin", 60, past).expect("sign");
        match verify(&keys, ISSUER, &token) {
            Err(AuthError::TokenExpired) => {}
            other => panic!("expected TokenExpired, got {other:?}"),
        }
    }

    #[test]
    fn wrong_public_key_fails_with_invalid() {
        let keys = keys();
        let other = KeyMaterial::from_pem(
            &SecretString::from(PRIVATE_PEM.to_string()),
            OTHER_PUBLIC_PEM,
        )
        .expect("other keys");

        let token = sign(&keys, ISSUER, "admin", 7200).expect("sign");
        match verify(&other, ISSUER, &token) {
            Err(AuthError::TokenInvalid) => {}
            other => panic!("expected TokenInvalid, got {other:?}"),
        }
    }

    #[test]
    fn wrong_issuer_fails_with_invalid() {
        let keys = keys();
        let token = sign(&keys, "someone-else", "admin", 7200).expect("sign");
        match verify(&keys, ISSUER, &token) {
            Err(AuthError::TokenInvalid) => {}
            other => panic!("expected TokenInvalid, got {other:?}"),
        }
    }

    #[test]
    fn malformed_token_fails_with_invalid() {
        let keys = keys();
        match verify(&keys, ISSUER, "definitely.not.a-jwt") {
            Err(AuthError::TokenInvalid) => {}
            other => panic!("expected TokenInvalid, got {other:?}"),
        }
    }
}
