//! Literal values carried by filter conditions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QueryError, QueryResult};
use crate::field::FieldKind;

/// A single JSON literal. `null` is not a scalar; absence is modelled by
/// `Option<FilterValue>` on the condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    fn describe(&self) -> String {
        match self {
            Scalar::Bool(b) => format!("bool {b}"),
            Scalar::Int(i) => format!("integer {i}"),
            Scalar::Float(x) => format!("number {x}"),
            Scalar::String(s) => format!("string '{s}'"),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)] // i64 filter literals beyond 2^53 lose precision like JSON does
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        self.as_str().and_then(|s| Uuid::parse_str(s).ok())
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    /// Checks that this literal can be bound to a column of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TypeMismatch`] when it cannot.
    pub fn check_kind(&self, field: &str, kind: FieldKind) -> QueryResult<()> {
        let ok = match kind {
            FieldKind::String | FieldKind::StringArray => self.as_str().is_some(),
            FieldKind::I64 => self.as_i64().is_some(),
            FieldKind::F64 => self.as_f64().is_some(),
            FieldKind::Bool => self.as_bool().is_some(),
            FieldKind::Uuid => self.as_uuid().is_some(),
            FieldKind::DateTimeUtc => self.as_datetime().is_some(),
            FieldKind::Date => self.as_date().is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(QueryError::TypeMismatch {
                field: field.to_owned(),
                expected: kind,
                got: self.describe(),
            })
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<Uuid> for Scalar {
    fn from(v: Uuid) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(v: DateTime<Utc>) -> Self {
        Scalar::String(v.to_rfc3339())
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::String(v.format("%Y-%m-%d").to_string())
    }
}

/// Right-hand side of a condition: one literal or a list of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl FilterValue {
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        FilterValue::List(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            FilterValue::Scalar(s) => Some(s),
            FilterValue::List(_) => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            FilterValue::List(items) => Some(items),
            FilterValue::Scalar(_) => None,
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(v: Scalar) -> Self {
        FilterValue::Scalar(v)
    }
}

macro_rules! scalar_filter_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(v: $ty) -> Self {
                    FilterValue::Scalar(Scalar::from(v))
                }
            }
        )+
    };
}

scalar_filter_value!(bool, i64, i32, f64, &str, String, Uuid, DateTime<Utc>, NaiveDate);
