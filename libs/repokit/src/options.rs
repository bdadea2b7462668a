//! Per-call options for repository reads.

use serde::{Deserialize, Serialize};

use repokit_query::{EntityField, FilterExpr, ListQuery, PaginatedRequest, Sort};

/// Post-load work: relations to attach and translation resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadOptions {
    /// Relation names to eager-load, e.g. `["instructor"]`.
    pub with: Vec<String>,
    pub locale: Option<String>,
    /// Attach every locale row instead of the best match for `locale`.
    pub include_all_translations: bool,
}

impl LoadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_relation(mut self, name: impl Into<String>) -> Self {
        self.with.push(name.into());
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn all_translations(mut self) -> Self {
        self.include_all_translations = true;
        self
    }

    #[must_use]
    pub fn wants(&self, relation: &str) -> bool {
        self.with.iter().any(|r| r.eq_ignore_ascii_case(relation))
    }

    /// Whether translation rows need to be fetched at all.
    #[must_use]
    pub fn wants_translations(&self) -> bool {
        self.include_all_translations || self.locale.is_some()
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.with.is_empty() && !self.wants_translations()
    }
}

/// Filter, order, cap and load options for `find_one`/`find_many`/`paginate`.
///
/// `limit` is ignored by `paginate`, which takes its window from the
/// request.
#[derive(Clone, Debug, PartialEq)]
pub struct FindOptions<F: EntityField> {
    pub filter: Option<FilterExpr<F>>,
    pub sort: Sort<F>,
    pub limit: Option<u64>,
    pub load: LoadOptions,
}

impl<F: EntityField> Default for FindOptions<F> {
    fn default() -> Self {
        Self {
            filter: None,
            sort: Sort::default(),
            limit: None,
            load: LoadOptions::default(),
        }
    }
}

impl<F: EntityField> FindOptions<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<FilterExpr<F>>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: impl Into<Sort<F>>) -> Self {
        self.sort = sort.into();
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn load(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Splits a decoded list request into its page window and find options.
    #[must_use]
    pub fn from_list_query(query: ListQuery<F>, load: LoadOptions) -> (PaginatedRequest, Self) {
        let options = Self {
            filter: query.filter,
            sort: query.sort,
            limit: None,
            load,
        };
        (query.pagination, options)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn relation_lookup_ignores_case() {
        let load = LoadOptions::new().with_relation("Instructor");
        assert!(load.wants("instructor"));
        assert!(!load.wants("students"));
        assert!(!load.is_plain());
    }

    #[test]
    fn load_options_wire_shape() {
        let load: LoadOptions =
            serde_json::from_str(r#"{"with":["instructor"],"locale":"es","includeAllTranslations":true}"#)
                .unwrap();
        assert_eq!(
            load,
            LoadOptions::new()
                .with_relation("instructor")
                .with_locale("es")
                .all_translations()
        );
        assert!(LoadOptions::default().is_plain());
    }
}
