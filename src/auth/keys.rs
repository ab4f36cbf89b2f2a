//! Signing key material, loaded once at startup and passed by reference.

use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey};
use secrecy::{ExposeSecret, SecretString};

/// RS256 key pair plus the exportable public half.
///
/// Constructed explicitly from PEM input and shared behind an `Arc`; there
/// is no process-wide singleton. The private key never leaves this struct.
pub struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
    public_pem: String,
}

impl KeyMaterial {
    /// Parse a PKCS#1/PKCS#8 private key and an SPKI public key, both PEM.
    pub fn from_pem(private_pem: &SecretString, public_pem: &str) -> Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(private_pem.expose_secret().as_bytes())
            .context("failed to parse RSA private key PEM")?;
        let decoding = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .context("failed to parse RSA public key PEM")?;
        Ok(Self {
            encoding,
            decoding,
            public_pem: public_pem.to_string(),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Public key in standard importable (SPKI PEM) form, served to
    /// independent verifiers.
    #[must_use]
    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }
}
