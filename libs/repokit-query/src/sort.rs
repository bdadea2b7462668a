//! Ordered sort specifications.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::field::EntityField;
use crate::limits::QueryLimits;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc", alias = "ASC")]
    Asc,
    #[serde(rename = "desc", alias = "DESC")]
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullsOrder {
    #[serde(rename = "first", alias = "FIRST")]
    First,
    #[serde(rename = "last", alias = "LAST")]
    Last,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortField<F: EntityField> {
    pub field: F,
    pub order: SortOrder,
    pub nulls: Option<NullsOrder>,
}

impl<F: EntityField> SortField<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
            nulls: None,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
            nulls: None,
        }
    }

    #[must_use]
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

#[derive(Serialize, Deserialize)]
struct SortFieldWire {
    field: String,
    #[serde(default)]
    order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nulls: Option<NullsOrder>,
}

impl<F: EntityField> Serialize for SortField<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SortFieldWire {
            field: self.field.name().to_owned(),
            order: self.order,
            nulls: self.nulls,
        }
        .serialize(serializer)
    }
}

impl<'de, F: EntityField> Deserialize<'de> for SortField<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = SortFieldWire::deserialize(deserializer)?;
        let field = F::from_name(&wire.field)
            .ok_or_else(|| de::Error::custom(QueryError::UnknownField(wire.field.clone())))?;
        Ok(SortField {
            field,
            order: wire.order,
            nulls: wire.nulls,
        })
    }
}

/// Sort keys in priority order; later keys break ties of earlier ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort<F: EntityField>(Vec<SortField<F>>);

impl<F: EntityField> Default for Sort<F> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<F: EntityField> Sort<F> {
    pub fn new(fields: Vec<SortField<F>>) -> Self {
        Self(fields)
    }

    pub fn by(field: SortField<F>) -> Self {
        Self(vec![field])
    }

    #[must_use]
    pub fn then(mut self, field: SortField<F>) -> Self {
        self.0.push(field);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> &[SortField<F>] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortField<F>> {
        self.0.iter()
    }

    pub fn contains(&self, field: F) -> bool {
        self.0.iter().any(|s| s.field == field)
    }

    /// # Errors
    ///
    /// [`QueryError::TooComplex`] when more keys than allowed are given.
    pub fn validate_limits(&self, limits: &QueryLimits) -> QueryResult<()> {
        if self.0.len() > limits.max_sort_fields {
            return Err(QueryError::TooComplex(format!(
                "{} sort fields exceed {}",
                self.0.len(),
                limits.max_sort_fields
            )));
        }
        Ok(())
    }

    /// Parses a single sort object or an array of them.
    ///
    /// # Errors
    ///
    /// [`QueryError::Malformed`] on invalid JSON or unknown fields.
    pub fn from_json(raw: &str) -> QueryResult<Self> {
        serde_json::from_str(raw).map_err(|e| QueryError::malformed("sort", e))
    }
}

impl<'a, F: EntityField> IntoIterator for &'a Sort<F> {
    type Item = &'a SortField<F>;
    type IntoIter = std::slice::Iter<'a, SortField<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<F: EntityField> From<SortField<F>> for Sort<F> {
    fn from(field: SortField<F>) -> Self {
        Sort::by(field)
    }
}

impl<F: EntityField> Serialize for Sort<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, F: EntityField> Deserialize<'de> for Sort<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.is_array() {
            serde_json::from_value::<Vec<SortField<F>>>(raw)
                .map(Sort)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value::<SortField<F>>(raw)
                .map(Sort::by)
                .map_err(de::Error::custom)
        }
    }
}
