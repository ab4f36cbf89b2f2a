//! In-memory store backends.
//!
//! Same contract as the Postgres backends, including the atomic
//! `delete_by_id` guarantee: removal happens under one mutex acquisition,
//! so exactly one of N racing deletes observes `true`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{NewSession, SessionRecord, SessionStore, UserRecord, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let users = self.users.lock().await;
        // Username matching is case-sensitive by contract.
        Ok(users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn count(&self) -> Result<u64> {
        let users = self.users.lock().await;
        Ok(users.len() as u64)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Uuid> {
        let mut users = self.users.lock().await;
        let id = Uuid::now_v7();
        users.insert(
            id,
            UserRecord {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(id)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<Uuid, SessionRecord>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: NewSession) -> Result<Uuid> {
        let mut sessions = self.sessions.lock().await;
        let id = Uuid::now_v7();
        let now = Utc::now();
        sessions.insert(
            id,
            SessionRecord {
                id,
                user_id: session.user_id,
                client: session.client,
                refresh_commitment: session.refresh_commitment,
                created_at: now,
                expires_at: now + Duration::seconds(session.ttl_seconds),
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(&id)
            .filter(|session| session.expires_at > Utc::now())
            .cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<SessionRecord>> {
        let sessions = self.sessions.lock().await;
        let now = Utc::now();
        let mut records: Vec<SessionRecord> = sessions
            .values()
            .filter(|session| session.user_id == user_id && session.expires_at > now)
            .cloned()
            .collect();
        records.sort_by_key(|session| session.created_at);
        Ok(records)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_session(user_id: Uuid) -> NewSession {
        NewSession {
            user_id,
            client: "test-agent".to_string(),
            refresh_commitment: "aa.bb".to_string(),
            ttl_seconds: 60,
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::now_v7();
        let id = store.insert(new_session(user_id)).await.expect("insert");
        let record = store.find_by_id(id).await.expect("find").expect("present");
        assert_eq!(record.user_id, user_id);
        assert_eq!(record.client, "test-agent");
    }

    #[tokio::test]
    async fn expired_session_is_absent() {
        let store = MemorySessionStore::new();
        let mut session = new_session(Uuid::now_v7());
        session.ttl_seconds = -1;
        let id = store.insert(session).await.expect("insert");
        assert!(store.find_by_id(id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let store = MemorySessionStore::new();
        let id = store
            .insert(new_session(Uuid::now_v7()))
            .await
            .expect("insert");
        assert!(store.delete_by_id(id).await.expect("delete"));
        assert!(!store.delete_by_id(id).await.expect("second delete"));
    }

    #[tokio::test]
    async fn concurrent_deletes_have_exactly_one_winner() {
        let store = Arc::new(MemorySessionStore::new());
        let id = store
            .insert(new_session(Uuid::now_v7()))
            .await
            .expect("insert");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(
                async move { store.delete_by_id(id).await },
            ));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.expect("join").expect("delete") {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn find_by_user_lists_only_that_user() {
        let store = MemorySessionStore::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        store.insert(new_session(alice)).await.expect("insert");
        store.insert(new_session(alice)).await.expect("insert");
        store.insert(new_session(bob)).await.expect("insert");

        let sessions = store.find_by_user(alice).await.expect("list");
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|session| session.user_id == alice));
    }

    #[tokio::test]
    async fn username_lookup_is_case_sensitive() {
        let store = MemoryUserStore::new();
        store.insert("Admin", "hash").await.expect("insert");
        assert!(store
            .find_by_username("Admin")
            .await
            .expect("find")
            .is_some());
        assert!(store
            .find_by_username("admin")
            .await
            .expect("find")
            .is_none());
    }
}
