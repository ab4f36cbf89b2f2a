//! Persistence contracts for users and sessions.
//!
//! The orchestrator only ever talks to these traits. The Postgres backend
//! is the production implementation; the in-memory backend honors the same
//! contract and backs the test suite.
//!
//! `delete_by_id` is load-bearing: it must be atomic with respect to
//! concurrent deletes of the same id, with exactly one caller observing
//! `true`. It is the only signal the refresh flow has to detect a won race.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::{MemorySessionStore, MemoryUserStore};
pub use postgres::{PgSessionStore, PgUserStore};

/// Identity record. Read-mostly: the lifecycle core never updates users.
#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// One outstanding login.
#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Requesting agent, diagnostic only.
    pub client: String,
    /// `hex(integrityKey).hex(secret)` pair the refresh tag derives from.
    pub refresh_commitment: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Input for session creation; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewSession {
    pub user_id: Uuid,
    pub client: String,
    pub refresh_commitment: String,
    pub ttl_seconds: i64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn count(&self) -> Result<u64>;

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Uuid>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session and return its server-generated id.
    async fn insert(&self, session: NewSession) -> Result<Uuid>;

    /// Expired sessions are treated as absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionRecord>>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<SessionRecord>>;

    /// Remove a session; `true` only for the caller whose delete removed the
    /// record. Concurrent deletes of the same id see `false`.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;
}
