//! # Sesamo
//!
//! `sesamo` issues and renews credentials for authenticated clients. A
//! successful username/password login yields two credentials with different
//! jobs:
//!
//! - a short-lived **access token**: a self-contained RS256 JWT that any
//!   holder of the public key can verify without contacting this service,
//! - a longer-lived **refresh credential**: an opaque HMAC tag bound to a
//!   server-side session record, exchanged for a fresh access token and
//!   rotated (single-use) on every renewal.
//!
//! ## Sessions & rotation
//!
//! Each login creates one session record `{id, user, client, commitment}`.
//! The stored commitment is the `key.secret` pair the transported tag was
//! derived from; renewal recomputes the tag server-side and compares it in
//! constant time. The session row is deleted **before** a successor is
//! minted, and the delete's row count is the only synchronization primitive:
//! of N concurrent renewals presenting the same credential, exactly one
//! observes the delete and mints a successor.
//!
//! ## Storage
//!
//! Session ids are **`UUIDv7`** (time-ordered, index-friendly). The Postgres
//! backend lives in [`store::postgres`]; an in-memory backend with the same
//! contract backs the test suite. Bootstrap SQL is under `db/sql/`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "",
};

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result, ensure};
    use std::fs;
    use std::path::{Path, PathBuf};

    // Normalize SQL to avoid brittle formatting checks in schema tests.
    fn canonicalize_sql(sql: &str) -> String {
        sql.chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| ch.to_ascii_lowercase())
            .collect()
    }

    fn canonical_sql(path: &Path) -> Result<String> {
        let sql = fs::read_to_string(path)
            .with_context(|| format!("Failed to read SQL file at {}", path.display()))?;
        Ok(canonicalize_sql(&sql))
    }

    fn assert_contains(path: &Path, canonical: &str, needle: &str) -> Result<()> {
        ensure!(
            canonical.contains(needle),
            "Expected {needle} is missing in {}",
            path.display()
        );
        Ok(())
    }

    #[test]
    fn schema_sql_integrity() -> Result<()> {
        // The delete-on-refresh contract relies on sessions keyed by id and
        // owned by exactly one user.
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("db/sql/01_sesamo.sql");
        let canonical = canonical_sql(&path)?;
        assert_contains(&path, &canonical, "iduuidprimarykey")?;
        assert_contains(&path, &canonical, "usernametextnotnullunique")?;
        assert_contains(&path, &canonical, "refresh_commitmenttextnotnull")?;
        assert_contains(&path, &canonical, "referencesusers(id)ondeletecascade")
    }

    #[test]
    fn init_sql_includes_schema() -> Result<()> {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("db/sql/00_init.sql");
        let canonical = canonical_sql(&path)?;
        assert_contains(&path, &canonical, r"\ir01_sesamo.sql")
    }
}
