//! Refresh commitments: opaque single-use renewal credentials.
//!
//! Each session stores a `(integrity key, secret)` pair; the client only
//! ever sees the keyed-integrity tag derived from it. Renewal recomputes the
//! tag from the stored pair and compares in constant time, so the raw secret
//! never travels in reusable form.

use anyhow::{Context, Result, anyhow};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SECRET_LEN: usize = 32;
const INTEGRITY_KEY_LEN: usize = 128;

type HmacSha256 = Hmac<Sha256>;

/// Server-held `(integrityKey, secret)` pair behind one refresh credential.
pub struct RefreshCommitment {
    integrity_key: Vec<u8>,
    secret: Vec<u8>,
}

impl RefreshCommitment {
    /// Draw a fresh commitment from the OS CSPRNG.
    pub fn generate() -> Result<Self> {
        let mut integrity_key = vec![0u8; INTEGRITY_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut integrity_key)
            .context("failed to generate refresh integrity key")?;

        let mut secret = vec![0u8; SECRET_LEN];
        OsRng
            .try_fill_bytes(&mut secret)
            .context("failed to generate refresh secret")?;

        Ok(Self {
            integrity_key,
            secret,
        })
    }

    /// The transport tag: `HMAC-SHA256(integrityKey, secret)`, base64url
    /// without padding. This is the only refresh material a client holds.
    pub fn tag(&self) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.integrity_key)
            .map_err(|err| anyhow!("invalid integrity key: {err}"))?;
        mac.update(&self.secret);
        Ok(Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes()))
    }

    /// Stored form: `hex(integrityKey) + "." + hex(secret)`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}.{}",
            hex::encode(&self.integrity_key),
            hex::encode(&self.secret)
        )
    }

    /// Parse a stored commitment back into its `(key, secret)` pair.
    pub fn decode(stored: &str) -> Result<Self> {
        let (key_hex, secret_hex) = stored
            .split_once('.')
            .ok_or_else(|| anyhow!("malformed refresh commitment"))?;
        let integrity_key = hex::decode(key_hex).context("commitment key is not hex")?;
        let secret = hex::decode(secret_hex).context("commitment secret is not hex")?;
        Ok(Self {
            integrity_key,
            secret,
        })
    }

    /// Constant-time check of a presented tag against this commitment.
    #[must_use]
    pub fn matches(&self, presented_tag: &str) -> bool {
        let Ok(expected) = self.tag() else {
            return false;
        };
        bool::from(expected.as_bytes().ct_eq(presented_tag.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_own_commitment() {
        let commitment = RefreshCommitment::generate().expect("generate");
        let tag = commitment.tag().expect("tag");
        assert!(commitment.matches(&tag));
    }

    #[test]
    fn encode_decode_preserves_tag() {
        let commitment = RefreshCommitment::generate().expect("generate");
        let stored = commitment.encode();
        let restored = RefreshCommitment::decode(&stored).expect("decode");
        assert_eq!(
            commitment.tag().expect("tag"),
            restored.tag().expect("tag")
        );
    }

    #[test]
    fn stored_form_is_dot_delimited_hex() {
        let commitment = RefreshCommitment::generate().expect("generate");
        let stored = commitment.encode();
        let (key_hex, secret_hex) = stored.split_once('.').expect("delimiter");
        assert_eq!(key_hex.len(), INTEGRITY_KEY_LEN * 2);
        assert_eq!(secret_hex.len(), SECRET_LEN * 2);
    }

    #[test]
    fn flipped_bit_in_tag_is_rejected() {
        let commitment = RefreshCommitment::generate().expect("generate");
        let tag = commitment.tag().expect("tag");
        let mut tampered = tag.into_bytes();
        // Swap the first character for a different base64url character.
        tampered[0] = if tampered[0] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).expect("utf8");
        assert!(!commitment.matches(&tampered));
    }

    #[test]
    fn distinct_commitments_have_distinct_tags() {
        let a = RefreshCommitment::generate().expect("generate");
        let b = RefreshCommitment::generate().expect("generate");
        assert_ne!(a.tag().expect("tag"), b.tag().expect("tag"));
    }

    #[test]
    fn decode_rejects_missing_delimiter() {
        assert!(RefreshCommitment::decode("deadbeef").is_err());
        assert!(RefreshCommitment::decode("xyz.123").is_err());
    }
}
