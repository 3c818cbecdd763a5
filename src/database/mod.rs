use error_stack::{Report, ResultExt};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use thiserror::Error;

use crate::config;

pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;
pub type Connection = sqlx::PgConnection;
pub type Result<T> = error_stack::Result<T, Error>;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
    /// An error caused by an invalid Postgres connection url.
    #[error("invalid connection url")]
    InvalidUrl,
    /// An error caused by an [`sqlx`] error.
    #[error("received a pool error: {0}")]
    Internal(sqlx::Error),
    /// The pool has no reliable connection to the database.
    #[error("unhealthy database pool")]
    UnhealthyPool,
    /// Pending migrations could not be applied.
    #[error("failed to run database migrations")]
    Migrate,
}

/// Converts a generic [`sqlx`] result into a [database error](Error).
pub trait ErrorExt<T> {
    fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn into_db_error(self) -> Result<T> {
        self.map_err(|e| Report::new(Error::Internal(e)))
    }
}

/// Convenience checks over `Report<Error>` so callers do not need to
/// spell out the downcasting dance.
pub trait ErrorExt2 {
    fn is_unhealthy(&self) -> bool;
    fn is_unique_violation(&self) -> bool;
}

impl ErrorExt2 for Report<Error> {
    fn is_unhealthy(&self) -> bool {
        self.downcast_ref::<Error>()
            .map(|v| matches!(v, Error::UnhealthyPool))
            .unwrap_or_default()
    }

    // Postgres reports a violated unique constraint as SQLSTATE 23505.
    fn is_unique_violation(&self) -> bool {
        self.downcast_ref::<Error>()
            .map(|v| match v {
                Error::Internal(sqlx::Error::Database(e)) => {
                    e.code().map(|c| c == "23505").unwrap_or_default()
                }
                _ => false,
            })
            .unwrap_or_default()
    }
}

/// A Postgres database connection pool.
///
/// Connections are established lazily; [`Pool::new`] still probes the
/// database once so a dead configuration is caught at startup rather
/// than on the first request.
#[derive(Clone)]
pub struct Pool {
    pool: sqlx::PgPool,
}

impl Pool {
    /// Creates and probes a pool from the database configuration.
    pub async fn new(cfg: &config::Database) -> Result<Self> {
        let mut pool_opts = PgPoolOptions::new()
            .acquire_timeout(cfg.timeout())
            .max_connections(cfg.pool_size.get());

        if let Some(min_idle) = cfg.min_idle {
            pool_opts = pool_opts.min_connections(min_idle.get());
        }

        let mut connect_opts =
            PgConnectOptions::from_str(cfg.url.as_str()).change_context(Error::InvalidUrl)?;

        if cfg.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Prefer);
        }

        let pool = Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
        };

        match pool.wait_until_healthy().await {
            Ok(..) => {}
            Err(err) if err.is_unhealthy() => {}
            Err(err) => return Err(err),
        }

        Ok(pool)
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pool.fmt(f)
    }
}

impl Pool {
    /// Gets the active connections of the pool.
    #[inline(always)]
    pub fn connections(&self) -> u32 {
        self.pool.size()
    }

    /// Checks if the pool holds at least one active connection.
    #[inline(always)]
    pub fn is_healthy(&self) -> bool {
        self.connections() > 0
    }

    /// It attempts to get an active database connection.
    #[tracing::instrument(name = "db.connect", skip(self))]
    pub async fn get(&self) -> Result<PoolConnection> {
        if let Some(inner) = self.pool.try_acquire() {
            Ok(inner)
        } else if !self.is_healthy() {
            Err(Error::UnhealthyPool.into())
        } else {
            let result = self.pool.acquire().await;
            result.map_err(|e| Report::new(Error::Internal(e)))
        }
    }

    /// Waits for a database connection to be successfully established
    /// until the configured timeout kicks in.
    #[tracing::instrument(skip(self))]
    pub async fn wait_until_healthy(&self) -> Result<()> {
        match self.pool.acquire().await {
            Ok(..) => Ok(()),
            Err(e @ sqlx::Error::PoolTimedOut) => Err(e).change_context(Error::UnhealthyPool),
            Err(err) => Err(Report::new(Error::Internal(err))),
        }
    }

    /// Applies any pending migrations embedded into the binary.
    #[tracing::instrument(skip_all, name = "db.migrate")]
    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("Running pending database migrations...");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .change_context(Error::Migrate)
    }
}
