use async_trait::async_trait;
use chrono::Utc;
use error_stack::Report;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Result, StoreError, UserStore};
use crate::schema::{InsertUser, User, UserId};

/// In-memory [`UserStore`] used by tests and local experiments.
///
/// Mirrors the semantics of [`PgUserStore`](super::PgUserStore): ids
/// are assigned on insert and usernames are unique.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user record, simulating deletion behind a live token.
    pub fn delete(&self, id: UserId) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.users.remove(&id.0).is_some()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.users.values().find(|u| u.name == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.users.get(&id.0).cloned())
    }

    async fn insert(&self, form: InsertUser<'_>) -> Result<User> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.users.values().any(|u| u.name == form.name) {
            return Err(Report::new(StoreError::NameTaken));
        }

        inner.next_id += 1;
        let user = User {
            id: UserId(inner.next_id),
            created_at: Utc::now().naive_utc(),
            name: form.name.to_owned(),
            email: form.email.to_owned(),
            password_hash: form.password_hash.to_owned(),
        };

        inner.users.insert(user.id.0, user.clone());
        Ok(user)
    }
}
