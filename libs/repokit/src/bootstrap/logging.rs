use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for every target not listed in `targets`.
    pub level: String,
    pub format: LogFormat,
    /// Per-target overrides, e.g. `sea_orm: warn`.
    pub targets: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
            targets: BTreeMap::new(),
        }
    }
}

fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Builds the directive string: `-v` raises the default level, `RUST_LOG`
/// (when set) wins over everything.
#[must_use]
pub fn build_filter(cfg: &LoggingConfig, verbosity: u8) -> EnvFilter {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !env.trim().is_empty()
    {
        return EnvFilter::new(env);
    }

    let mut directives = vec![level_for_verbosity(verbosity).unwrap_or(&cfg.level).to_owned()];
    directives.extend(cfg.targets.iter().map(|(target, level)| format!("{target}={level}")));
    EnvFilter::new(directives.join(","))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_logging(cfg: &LoggingConfig, verbosity: u8) {
    let filter = build_filter(cfg, verbosity);
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = match cfg.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
