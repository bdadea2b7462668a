//! Connection settings and pool construction.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// `sqlite::memory:`, `sqlite://path/to/file.db?mode=rwc`, `postgres://...`
    pub url: String,
    pub max_conns: u32,
    pub min_conns: u32,
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
    /// Log every statement sqlx executes.
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_conns: 10,
            min_conns: 1,
            acquire_timeout: Duration::from_secs(5),
            sqlx_logging: false,
        }
    }
}

impl DbConfig {
    /// Single-connection in-memory SQLite, for tests and demos.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            max_conns: 1,
            ..Self::default()
        }
    }

    /// # Errors
    /// [`DbError::InvalidConfig`] for an empty url or an inverted pool range.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.url.trim().is_empty() {
            return Err(DbError::InvalidConfig("url must not be empty".to_owned()));
        }
        if self.max_conns == 0 {
            return Err(DbError::InvalidConfig("max_conns must be at least 1".to_owned()));
        }
        if self.min_conns > self.max_conns {
            return Err(DbError::InvalidConfig(format!(
                "min_conns ({}) exceeds max_conns ({})",
                self.min_conns, self.max_conns
            )));
        }
        Ok(())
    }

    /// The url with any password replaced, safe for logs.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.split_once('@') {
            Some((userinfo, host)) => {
                let user = userinfo.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:***@{host}")
            }
            None => self.url.clone(),
        }
    }
}

/// Opens a pool for `cfg`.
///
/// # Errors
/// Invalid config or a failed connection attempt.
pub async fn connect(cfg: &DbConfig) -> Result<DatabaseConnection, DbError> {
    cfg.validate()?;

    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_conns)
        .min_connections(cfg.min_conns)
        .acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(cfg.sqlx_logging);

    let db = Database::connect(opts).await?;
    info!(url = %cfg.redacted_url(), backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}
