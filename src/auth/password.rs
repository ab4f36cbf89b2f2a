//! Password hashing and verification.
//!
//! The lifecycle core only consumes the boolean outcome; scheme, salt, and
//! timing safety are the concern of the `argon2` primitive.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};
use rand::rngs::OsRng;

/// Hash a plaintext password into a PHC string for storage.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Compare a plaintext candidate against a stored hash.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Random hex password for the bootstrap admin account.
pub fn random_password() -> Result<String> {
    use rand::RngCore;
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate random password")?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret").expect("hash");
        assert!(verify_password("secret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("secret", "not-a-phc-string"));
    }

    #[test]
    fn random_password_is_hex() {
        let password = random_password().expect("random");
        assert_eq!(password.len(), 24);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
