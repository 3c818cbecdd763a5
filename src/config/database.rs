use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;
use validator::Validate;

use crate::util::Sensitive;

/// Configuration for connecting to the Postgres database that holds
/// the user records.
#[derive(Debug, Deserialize, Validate)]
pub struct Database {
    /// Connection URL of the database.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_DB_URL` or `DATABASE_URL`
    pub url: Sensitive<String>,
    /// Minimum idle connections kept around so bursts of logins do
    /// not pay the connection setup cost.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_DB_MIN_IDLE`
    pub min_idle: Option<NonZeroU32>,
    /// Maximum amount of connections the pool may hold.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_DB_POOL_SIZE`
    #[serde(default = "Database::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// Forces database connections to be encrypted with TLS
    /// (if possible).
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_DB_ENFORCE_TLS`
    #[serde(default = "Database::default_enforce_tls")]
    pub enforce_tls: bool,
    /// How long the server waits for the database to acknowledge a
    /// connection before giving up.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_DB_TIMEOUT_SECS`
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: NonZeroU64,
}

impl Database {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.get())
    }

    // Required by serde
    pub(crate) const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    pub(crate) const fn default_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    pub(crate) const fn default_enforce_tls() -> bool {
        true
    }
}
