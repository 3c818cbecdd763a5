use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthService, PasswordHasher, TokenService};
use crate::store::{PgUserStore, UserStore};
use crate::{config, database};

/// Shared state handed to both transports.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub auth: AuthService,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    /// Connects to the credential store, applies pending migrations
    /// and wires up the auth core.
    #[tracing::instrument(skip_all)]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let db = database::Pool::new(&cfg.db).await.change_context(AppError)?;
        db.run_migrations().await.change_context(AppError)?;

        let store = Arc::new(PgUserStore::new(db));
        Ok(Self::with_store(cfg, store))
    }

    /// Wires the auth core over an explicit store. Tests use this
    /// with the in-memory store.
    #[must_use]
    pub fn with_store(cfg: config::Server, store: Arc<dyn UserStore>) -> Self {
        let tokens = TokenService::new(cfg.jwt_secret.as_str());
        let auth = AuthService::new(store, PasswordHasher, tokens);

        Self {
            config: Arc::new(cfg),
            auth,
        }
    }
}
