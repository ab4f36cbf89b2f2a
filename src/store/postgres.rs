//! Postgres store backends.
//!
//! Every statement runs inside a `db.query` span so query timing shows up in
//! traces. `DELETE` atomicity comes from Postgres row locking: of N
//! concurrent deletes of the same id, exactly one reports an affected row.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::{NewSession, SessionRecord, SessionStore, UserRecord, UserStore};

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let query = "SELECT id, username, password_hash FROM users WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by username")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = "SELECT id, username, password_hash FROM users WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn count(&self) -> Result<u64> {
        let query = "SELECT COUNT(*) AS count FROM users";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to count users")?;
        let count: i64 = row.get("count");
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Uuid> {
        let query = r"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert user")?;
        Ok(row.get("id"))
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn session_from_row(row: &sqlx::postgres::PgRow) -> SessionRecord {
    SessionRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        client: row.get("client"),
        refresh_commitment: row.get("refresh_commitment"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: NewSession) -> Result<Uuid> {
        // Ids are UUIDv7, generated here rather than by the database so the
        // contract matches the in-memory backend.
        let id = Uuid::now_v7();
        let query = r"
            INSERT INTO sessions (id, user_id, client, refresh_commitment, expires_at)
            VALUES ($1, $2, $3, $4, NOW() + ($5 * INTERVAL '1 second'))
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(session.user_id)
            .bind(&session.client)
            .bind(&session.refresh_commitment)
            .bind(session.ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert session")?;
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        // Expired rows are invisible; eviction itself is retention policy.
        let query = r"
            SELECT id, user_id, client, refresh_commitment, created_at, expires_at
            FROM sessions
            WHERE id = $1
              AND expires_at > NOW()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;
        Ok(row.as_ref().map(session_from_row))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<SessionRecord>> {
        let query = r"
            SELECT id, user_id, client, refresh_commitment, created_at, expires_at
            FROM sessions
            WHERE user_id = $1
              AND expires_at > NOW()
            ORDER BY created_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list sessions for user")?;
        Ok(rows.iter().map(session_from_row).collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let query = "DELETE FROM sessions WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;
        Ok(result.rows_affected() == 1)
    }
}
