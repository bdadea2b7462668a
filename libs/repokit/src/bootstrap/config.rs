use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file '{path}' does not exist")]
    MissingFile { path: String },
    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Layers `defaults`, then the YAML file at `path` (if given), then
/// environment variables starting with `env_prefix`.
///
/// Env keys nest on `__`: with prefix `APP__`, `APP__DATABASE__URL` sets
/// `database.url`.
///
/// # Errors
/// [`ConfigError::MissingFile`] when `path` is given but absent, and
/// [`ConfigError::Extract`] when the merged layers do not fit `T`.
pub fn load_layered<T>(defaults: &T, path: Option<&Path>, env_prefix: &str) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let mut figment = Figment::new().merge(Serialized::defaults(defaults));
    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }
        debug!(path = %path.display(), "loading config file");
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed(env_prefix).split("__"));

    figment.extract().map_err(|e| ConfigError::Extract(Box::new(e)))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        port: u16,
        nested: Nested,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Nested {
        enabled: bool,
    }

    fn defaults() -> Sample {
        Sample {
            name: "base".to_owned(),
            port: 8080,
            nested: Nested::default(),
        }
    }

    #[test]
    fn defaults_only() {
        let cfg = load_layered(&defaults(), None, "REPOKIT_TEST_UNSET__").unwrap();
        assert_eq!(cfg, defaults());
    }

    #[test]
    fn yaml_overrides_defaults_partially() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: 9000\nnested:\n  enabled: true").unwrap();

        let cfg = load_layered(&defaults(), Some(file.path()), "REPOKIT_TEST_UNSET__").unwrap();
        assert_eq!(cfg.name, "base");
        assert_eq!(cfg.port, 9000);
        assert!(cfg.nested.enabled);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_layered(&defaults(), Some(Path::new("/definitely/not/here.yaml")), "X__")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn wrong_type_in_yaml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: not-a-number").unwrap();

        let err = load_layered(&defaults(), Some(file.path()), "REPOKIT_TEST_UNSET__").unwrap_err();
        assert!(matches!(err, ConfigError::Extract(_)));
    }
}
