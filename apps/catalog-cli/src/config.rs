use std::path::Path;

use serde::{Deserialize, Serialize};

use catalog::CatalogConfig;
use repokit::bootstrap::{ConfigError, LoggingConfig, load_layered};
use repokit::query::QueryLimits;
use repokit_db::DbConfig;

pub const ENV_PREFIX: &str = "REPOKIT__";

/// Effective configuration: defaults, then the YAML file, then `REPOKIT__*` env.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub logging: LoggingConfig,
    pub query: QueryLimits,
    pub catalog: CatalogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DbConfig {
                url: "sqlite://catalog.db?mode=rwc".to_owned(),
                ..DbConfig::default()
            },
            logging: LoggingConfig::default(),
            query: QueryLimits::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// # Errors
    /// Missing file, or layers that do not fit the config shape.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_layered(&Self::default(), path, ENV_PREFIX)
    }
}
