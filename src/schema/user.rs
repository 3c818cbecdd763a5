use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use super::UserId;
use crate::database::{Connection, ErrorExt, Result};

/// A user record as stored in the credential store.
///
/// The password hash never leaves this type; anything crossing a
/// transport boundary goes through [`UserProfile`] instead.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub created_at: NaiveDateTime,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Form for inserting a new user row.
#[derive(Debug)]
pub struct InsertUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Public view of a [`User`] with the password hash stripped.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl User {
    #[must_use]
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

impl User {
    #[tracing::instrument(skip_all, name = "schema.users.by_id")]
    pub async fn by_id(conn: &mut Connection, id: UserId) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip_all, name = "schema.users.by_name")]
    pub async fn by_name(conn: &mut Connection, name: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE name = $1"#)
            .bind(name)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip_all, name = "schema.users.insert")]
    pub async fn insert(conn: &mut Connection, form: InsertUser<'_>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "users" (name, email, password_hash)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(form.name)
        .bind(form.email)
        .bind(form.password_hash)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}
