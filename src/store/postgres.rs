use async_trait::async_trait;
use error_stack::ResultExt;

use super::{Result, StoreError, UserStore};
use crate::database::{self, ErrorExt2};
use crate::schema::{InsertUser, User, UserId};

/// [`UserStore`] over the Postgres pool.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    db: database::Pool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(db: database::Pool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[tracing::instrument(skip_all, name = "store.find_by_username")]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut conn = self.db.get().await.change_context(StoreError::Unavailable)?;
        User::by_name(&mut conn, username)
            .await
            .change_context(StoreError::Unavailable)
    }

    #[tracing::instrument(skip_all, name = "store.find_by_id")]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let mut conn = self.db.get().await.change_context(StoreError::Unavailable)?;
        User::by_id(&mut conn, id)
            .await
            .change_context(StoreError::Unavailable)
    }

    #[tracing::instrument(skip_all, name = "store.insert")]
    async fn insert(&self, form: InsertUser<'_>) -> Result<User> {
        let mut conn = self.db.get().await.change_context(StoreError::Unavailable)?;
        User::insert(&mut conn, form).await.map_err(|report| {
            if report.is_unique_violation() {
                report.change_context(StoreError::NameTaken)
            } else {
                report.change_context(StoreError::Unavailable)
            }
        })
    }
}
