use async_trait::async_trait;
use error_stack::Report;
use thiserror::Error;

use crate::schema::{InsertUser, User, UserId};

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

pub type Result<T> = std::result::Result<T, Report<StoreError>>;

/// Errors surfaced by a [`UserStore`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another user already holds the requested username.
    #[error("username is already taken")]
    NameTaken,
    /// The store could not be reached or failed internally.
    #[error("credential store is unavailable")]
    Unavailable,
}

/// The credential store boundary consumed by the auth core.
///
/// The store owns user-record persistence and enforces username
/// uniqueness; the auth core only ever reads users and inserts new
/// ones at seed/signup time.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn insert(&self, form: InsertUser<'_>) -> Result<User>;
}
