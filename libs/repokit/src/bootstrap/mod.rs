//! Process bootstrap helpers for binaries: layered config loading and
//! tracing subscriber setup. Libraries never call these.

mod config;
mod logging;

pub use config::{ConfigError, load_layered};
pub use logging::{LogFormat, LoggingConfig, build_filter, init_logging};
