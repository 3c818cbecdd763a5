use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use validator::Validate;

use super::{Database, ParseError};
use crate::util::{AttachFigmentError, Sensitive};

/// Top-level server configuration.
#[derive(Debug, Deserialize, Validate)]
pub struct Server {
    /// Address both transports bind on.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_IP`
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    /// Port of the HTTP/JSON transport.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_HTTP_PORT`
    #[serde(default = "Server::default_http_port")]
    pub http_port: u16,
    /// Port of the native gRPC transport.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_GRPC_PORT`
    #[serde(default = "Server::default_grpc_port")]
    pub grpc_port: u16,
    /// Amount of HTTP worker threads.
    #[serde(default = "Server::default_workers")]
    pub workers: usize,
    #[validate(nested)]
    pub db: Database,
    /// Key used to sign session tokens. Loaded once at startup and
    /// never rotated during the process lifetime.
    ///
    /// **Environment variables**:
    /// - `GATEHOUSE_JWT_SECRET`
    #[validate(length(min = 12, max = 1024, message = "Invalid JWT secret key"))]
    pub jwt_secret: Sensitive<String>,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate().change_context(ParseError)?;

        Ok(config)
    }

    #[must_use]
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.http_port)
    }

    #[must_use]
    pub fn grpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.grpc_port)
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "gatehouse.toml";

    /// Creates the default [`figment::Figment`] used to load server
    /// configuration. Split out of [`Server::load`] for testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::providers::{Env, Format, Toml};
        use figment::Figment;

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // The env provider splits keys on underscores, which
            // mangles the ones that contain one. Map those by hand.
            .merge(Env::prefixed("GATEHOUSE_").map(|v| match v.as_str() {
                "DB_URL" => "db.url".into(),
                "DB_MIN_IDLE" => "db.min_idle".into(),
                "DB_POOL_SIZE" => "db.pool_size".into(),
                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),
                "HTTP_PORT" => "http_port".into(),
                "GRPC_PORT" => "grpc_port".into(),
                "JWT_SECRET" => "jwt_secret".into(),
                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.url".into(),
                _ => v.into(),
            }))
    }

    /// Builds a configuration for tests that touches neither the
    /// filesystem nor the environment.
    #[doc(hidden)]
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            ip: Self::default_ip(),
            http_port: 0,
            grpc_port: 0,
            workers: 1,
            db: Database {
                url: Sensitive::new("postgres://localhost/gatehouse_tests".to_string()),
                min_idle: None,
                pool_size: Database::default_pool_size(),
                enforce_tls: false,
                timeout_secs: Database::default_timeout_secs(),
            },
            jwt_secret: Sensitive::new("gatehouse-test-signing-key".to_string()),
        }
    }

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_http_port() -> u16 {
        8080
    }

    const fn default_grpc_port() -> u16 {
        50051
    }

    const fn default_workers() -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::NonZeroU32;

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "hello world!");

            jail.set_env("GATEHOUSE_DB_MIN_IDLE", "3");
            jail.set_env("GATEHOUSE_DB_POOL_SIZE", "100");
            jail.set_env("GATEHOUSE_DB_ENFORCE_TLS", "false");
            jail.set_env("GATEHOUSE_DB_TIMEOUT_SECS", "30");

            jail.set_env("GATEHOUSE_HTTP_PORT", "8081");
            jail.set_env("GATEHOUSE_GRPC_PORT", "50052");
            jail.set_env("GATEHOUSE_JWT_SECRET", "0123456789abcdef");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.url.as_str(), "hello world!");
            assert_eq!(
                config.db.min_idle,
                Some(NonZeroU32::new(3).unwrap())
            );
            assert_eq!(config.db.pool_size, NonZeroU32::new(100).unwrap());
            assert!(!config.db.enforce_tls);
            assert_eq!(config.db.timeout_secs.get(), 30);

            assert_eq!(config.http_port, 8081);
            assert_eq!(config.grpc_port, 50052);
            assert_eq!(config.jwt_secret.as_str(), "0123456789abcdef");

            Ok(())
        });
    }

    #[test]
    fn rejects_a_short_jwt_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/app");
            jail.set_env("GATEHOUSE_JWT_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }

    #[test]
    fn defaults_fill_the_gaps() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/app");
            jail.set_env("GATEHOUSE_JWT_SECRET", "0123456789abcdef");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.http_port, 8080);
            assert_eq!(config.grpc_port, 50051);
            assert_eq!(config.db.pool_size.get(), 5);
            assert!(config.db.enforce_tls);

            Ok(())
        });
    }
}
