use serde::{Deserialize, Serialize};

/// Catalog settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Locale used when the requested one has no row.
    pub default_locale: String,
    /// Run migrations during [`CatalogModule::init`](crate::CatalogModule::init).
    pub migrate_on_init: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_owned(),
            migrate_on_init: true,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: CatalogConfig = serde_json::from_str(r#"{"default_locale":"es"}"#).unwrap();
        assert_eq!(cfg.default_locale, "es");
        assert!(cfg.migrate_on_init);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<CatalogConfig>(r#"{"locale":"es"}"#).is_err());
    }
}
