//! Boolean filter trees over a typed field set.
//!
//! Conditions are validated when they are built, so a `FilterExpr` that
//! exists is always executable: the operator matches the value shape and
//! every literal fits the field's [`FieldKind`].

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::field::{EntityField, FieldKind};
use crate::limits::QueryLimits;
use crate::value::{FilterValue, Scalar};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    Ilike,
    IsNull,
    IsNotNull,
    Between,
    ArrayContains,
    ArrayContained,
    ArrayOverlaps,
}

/// What a condition's `value` must look like for a given operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueShape {
    Absent,
    Scalar,
    List,
    Pair,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Absent => f.write_str("no value"),
            ValueShape::Scalar => f.write_str("a scalar value"),
            ValueShape::List => f.write_str("an array value"),
            ValueShape::Pair => f.write_str("an array of exactly two values"),
        }
    }
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 16] = [
        FilterOperator::Eq,
        FilterOperator::Ne,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::Like,
        FilterOperator::Ilike,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
        FilterOperator::Between,
        FilterOperator::ArrayContains,
        FilterOperator::ArrayContained,
        FilterOperator::ArrayOverlaps,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::Like => "like",
            FilterOperator::Ilike => "ilike",
            FilterOperator::IsNull => "isNull",
            FilterOperator::IsNotNull => "isNotNull",
            FilterOperator::Between => "between",
            FilterOperator::ArrayContains => "arrayContains",
            FilterOperator::ArrayContained => "arrayContained",
            FilterOperator::ArrayOverlaps => "arrayOverlaps",
        }
    }

    #[must_use]
    pub fn shape(self) -> ValueShape {
        match self {
            FilterOperator::IsNull | FilterOperator::IsNotNull => ValueShape::Absent,
            FilterOperator::In
            | FilterOperator::NotIn
            | FilterOperator::ArrayContains
            | FilterOperator::ArrayContained
            | FilterOperator::ArrayOverlaps => ValueShape::List,
            FilterOperator::Between => ValueShape::Pair,
            FilterOperator::Eq
            | FilterOperator::Ne
            | FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Lt
            | FilterOperator::Lte
            | FilterOperator::Like
            | FilterOperator::Ilike => ValueShape::Scalar,
        }
    }

    #[must_use]
    pub fn is_array_op(self) -> bool {
        matches!(
            self,
            FilterOperator::ArrayContains
                | FilterOperator::ArrayContained
                | FilterOperator::ArrayOverlaps
        )
    }

    fn supports(self, kind: FieldKind) -> bool {
        match self {
            FilterOperator::IsNull | FilterOperator::IsNotNull => true,
            FilterOperator::ArrayContains
            | FilterOperator::ArrayContained
            | FilterOperator::ArrayOverlaps => kind == FieldKind::StringArray,
            FilterOperator::Like | FilterOperator::Ilike => kind == FieldKind::String,
            FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Lt
            | FilterOperator::Lte
            | FilterOperator::Between => kind.is_orderable(),
            FilterOperator::Eq
            | FilterOperator::Ne
            | FilterOperator::In
            | FilterOperator::NotIn => kind != FieldKind::StringArray,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `field <operator> value`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCondition<F: EntityField> {
    field: F,
    operator: FilterOperator,
    value: Option<FilterValue>,
}

impl<F: EntityField> FilterCondition<F> {
    /// Builds a condition, checking the value shape against the operator and
    /// every literal against the field kind.
    ///
    /// # Errors
    ///
    /// [`QueryError::ValueShape`], [`QueryError::UnsupportedOperator`] or
    /// [`QueryError::TypeMismatch`] when the combination is not executable.
    pub fn new(field: F, operator: FilterOperator, value: Option<FilterValue>) -> QueryResult<Self> {
        let name = field.name();
        let kind = field.kind();
        let shape = operator.shape();

        let shape_err = || QueryError::ValueShape {
            field: name.to_owned(),
            operator,
            expected: shape,
        };

        let literals: &[Scalar] = match (shape, &value) {
            (ValueShape::Absent, None) => &[],
            (ValueShape::Scalar, Some(FilterValue::Scalar(s))) => std::slice::from_ref(s),
            (ValueShape::List, Some(FilterValue::List(items))) => items,
            (ValueShape::Pair, Some(FilterValue::List(items))) if items.len() == 2 => items,
            _ => return Err(shape_err()),
        };

        if !operator.supports(kind) {
            return Err(QueryError::UnsupportedOperator {
                field: name.to_owned(),
                operator,
                kind,
            });
        }

        for literal in literals {
            literal.check_kind(name, kind)?;
        }

        Ok(Self {
            field,
            operator,
            value,
        })
    }

    /// # Errors
    ///
    /// See [`FilterCondition::new`].
    pub fn eq(field: F, value: impl Into<FilterValue>) -> QueryResult<Self> {
        Self::new(field, FilterOperator::Eq, Some(value.into()))
    }

    /// # Errors
    ///
    /// See [`FilterCondition::new`].
    pub fn ne(field: F, value: impl Into<FilterValue>) -> QueryResult<Self> {
        Self::new(field, FilterOperator::Ne, Some(value.into()))
    }

    /// # Errors
    ///
    /// See [`FilterCondition::new`].
    pub fn like(field: F, pattern: impl Into<String>) -> QueryResult<Self> {
        Self::new(field, FilterOperator::Like, Some(FilterValue::from(pattern.into())))
    }

    /// # Errors
    ///
    /// See [`FilterCondition::new`].
    pub fn ilike(field: F, pattern: impl Into<String>) -> QueryResult<Self> {
        Self::new(field, FilterOperator::Ilike, Some(FilterValue::from(pattern.into())))
    }

    /// # Errors
    ///
    /// See [`FilterCondition::new`].
    pub fn is_in<I, T>(field: F, values: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::new(field, FilterOperator::In, Some(FilterValue::list(values)))
    }

    /// # Errors
    ///
    /// See [`FilterCondition::new`].
    pub fn between(field: F, low: impl Into<Scalar>, high: impl Into<Scalar>) -> QueryResult<Self> {
        Self::new(
            field,
            FilterOperator::Between,
            Some(FilterValue::List(vec![low.into(), high.into()])),
        )
    }

    #[must_use]
    pub fn is_null(field: F) -> Self {
        Self {
            field,
            operator: FilterOperator::IsNull,
            value: None,
        }
    }

    #[must_use]
    pub fn is_not_null(field: F) -> Self {
        Self {
            field,
            operator: FilterOperator::IsNotNull,
            value: None,
        }
    }

    pub fn field(&self) -> F {
        self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> Option<&FilterValue> {
        self.value.as_ref()
    }

    /// Literals of the condition in order; empty for `isNull`/`isNotNull`.
    pub fn literals(&self) -> &[Scalar] {
        match &self.value {
            None => &[],
            Some(FilterValue::Scalar(s)) => std::slice::from_ref(s),
            Some(FilterValue::List(items)) => items,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ConditionWire {
    field: String,
    operator: FilterOperator,
    #[serde(default)]
    value: Option<FilterValue>,
}

impl<F: EntityField> Serialize for FilterCondition<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConditionWire {
            field: self.field.name().to_owned(),
            operator: self.operator,
            value: self.value.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de, F: EntityField> Deserialize<'de> for FilterCondition<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = ConditionWire::deserialize(deserializer)?;
        let field = F::from_name(&wire.field)
            .ok_or_else(|| de::Error::custom(QueryError::UnknownField(wire.field.clone())))?;
        FilterCondition::new(field, wire.operator, wire.value).map_err(de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupOperator {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// AND/OR over one or more child expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterGroup<F: EntityField> {
    operator: GroupOperator,
    conditions: Vec<FilterExpr<F>>,
}

impl<F: EntityField> FilterGroup<F> {
    /// # Errors
    ///
    /// [`QueryError::EmptyGroup`] when `conditions` is empty.
    pub fn new(operator: GroupOperator, conditions: Vec<FilterExpr<F>>) -> QueryResult<Self> {
        if conditions.is_empty() {
            return Err(QueryError::EmptyGroup);
        }
        Ok(Self {
            operator,
            conditions,
        })
    }

    pub fn operator(&self) -> GroupOperator {
        self.operator
    }

    pub fn conditions(&self) -> &[FilterExpr<F>] {
        &self.conditions
    }
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct GroupWire<F: EntityField> {
    operator: GroupOperator,
    conditions: Vec<FilterExpr<F>>,
}

impl<F: EntityField> Serialize for FilterGroup<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GroupWire {
            operator: self.operator,
            conditions: self.conditions.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de, F: EntityField> Deserialize<'de> for FilterGroup<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = GroupWire::<F>::deserialize(deserializer)?;
        FilterGroup::new(wire.operator, wire.conditions).map_err(de::Error::custom)
    }
}

/// A filter tree. A bare condition is a one-node tree.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr<F: EntityField> {
    Condition(FilterCondition<F>),
    Group(FilterGroup<F>),
}

impl<F: EntityField> FilterExpr<F> {
    /// # Errors
    ///
    /// [`QueryError::EmptyGroup`] when `children` is empty.
    pub fn and(children: Vec<FilterExpr<F>>) -> QueryResult<Self> {
        FilterGroup::new(GroupOperator::And, children).map(FilterExpr::Group)
    }

    /// # Errors
    ///
    /// [`QueryError::EmptyGroup`] when `children` is empty.
    pub fn or(children: Vec<FilterExpr<F>>) -> QueryResult<Self> {
        FilterGroup::new(GroupOperator::Or, children).map(FilterExpr::Group)
    }

    /// Nesting depth; a bare condition has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            FilterExpr::Condition(_) => 1,
            FilterExpr::Group(g) => 1 + g.conditions.iter().map(Self::depth).max().unwrap_or(0),
        }
    }

    /// Number of leaf conditions.
    pub fn condition_count(&self) -> usize {
        match self {
            FilterExpr::Condition(_) => 1,
            FilterExpr::Group(g) => g.conditions.iter().map(Self::condition_count).sum(),
        }
    }

    /// Calls `visit` for every leaf condition, depth first.
    pub fn for_each_condition<'a>(&'a self, visit: &mut impl FnMut(&'a FilterCondition<F>)) {
        match self {
            FilterExpr::Condition(c) => visit(c),
            FilterExpr::Group(g) => {
                for child in &g.conditions {
                    child.for_each_condition(visit);
                }
            }
        }
    }

    /// # Errors
    ///
    /// [`QueryError::TooComplex`] when depth or leaf count exceed `limits`.
    pub fn validate_limits(&self, limits: &QueryLimits) -> QueryResult<()> {
        let depth = self.depth();
        if depth > limits.max_filter_depth {
            return Err(QueryError::TooComplex(format!(
                "filter depth {depth} exceeds {}",
                limits.max_filter_depth
            )));
        }
        let count = self.condition_count();
        if count > limits.max_conditions {
            return Err(QueryError::TooComplex(format!(
                "{count} filter conditions exceed {}",
                limits.max_conditions
            )));
        }
        Ok(())
    }

    /// Parses filter JSON.
    ///
    /// # Errors
    ///
    /// [`QueryError::Malformed`] with the underlying message, which names
    /// the unknown field or invalid combination.
    pub fn from_json(raw: &str) -> QueryResult<Self> {
        serde_json::from_str(raw).map_err(|e| QueryError::malformed("filter", e))
    }
}

impl<F: EntityField> From<FilterCondition<F>> for FilterExpr<F> {
    fn from(c: FilterCondition<F>) -> Self {
        FilterExpr::Condition(c)
    }
}

impl<F: EntityField> From<FilterGroup<F>> for FilterExpr<F> {
    fn from(g: FilterGroup<F>) -> Self {
        FilterExpr::Group(g)
    }
}

impl<F: EntityField> Serialize for FilterExpr<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterExpr::Condition(c) => c.serialize(serializer),
            FilterExpr::Group(g) => g.serialize(serializer),
        }
    }
}

impl<'de, F: EntityField> Deserialize<'de> for FilterExpr<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.get("conditions").is_some() {
            serde_json::from_value(raw)
                .map(FilterExpr::Group)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(raw)
                .map(FilterExpr::Condition)
                .map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    crate::entity_fields! {
        enum PersonField {
            Id => ("id", Uuid),
            Name => ("name", String),
            Age => ("age", I64),
            Active => ("active", Bool),
            Tags => ("tags", StringArray),
            CreatedAt => ("createdAt", DateTimeUtc),
        }
    }

    #[test]
    fn in_requires_an_array() {
        let err = FilterCondition::new(PersonField::Name, FilterOperator::In, Some("x".into())).unwrap_err();
        assert_eq!(
            err,
            QueryError::ValueShape {
                field: "name".to_owned(),
                operator: FilterOperator::In,
                expected: ValueShape::List,
            }
        );
    }

    #[test]
    fn is_null_rejects_a_value() {
        let err = FilterCondition::new(PersonField::Name, FilterOperator::IsNull, Some("x".into())).unwrap_err();
        assert!(matches!(err, QueryError::ValueShape { expected: ValueShape::Absent, .. }));
        assert!(FilterCondition::new(PersonField::Name, FilterOperator::IsNull, None).is_ok());
    }

    #[test]
    fn scalar_operators_reject_missing_or_list_values() {
        assert!(FilterCondition::new(PersonField::Age, FilterOperator::Gt, None).is_err());
        assert!(
            FilterCondition::new(PersonField::Age, FilterOperator::Eq, Some(FilterValue::list([1, 2]))).is_err()
        );
    }

    #[test]
    fn between_takes_exactly_two_values() {
        assert!(FilterCondition::between(PersonField::Age, 18, 30).is_ok());
        let three = FilterValue::list([1, 2, 3]);
        assert!(FilterCondition::new(PersonField::Age, FilterOperator::Between, Some(three)).is_err());
    }

    #[test]
    fn operators_are_checked_against_field_kind() {
        let err = FilterCondition::like(PersonField::Age, "%1%").unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperator { kind: FieldKind::I64, .. }));

        assert!(FilterCondition::new(PersonField::Active, FilterOperator::Gt, Some(true.into())).is_err());
        assert!(
            FilterCondition::new(PersonField::Tags, FilterOperator::ArrayOverlaps, Some(FilterValue::list(["a"])))
                .is_ok()
        );
        assert!(
            FilterCondition::new(PersonField::Name, FilterOperator::ArrayContains, Some(FilterValue::list(["a"])))
                .is_err()
        );
    }

    #[test]
    fn literals_are_checked_against_field_kind() {
        let err = FilterCondition::eq(PersonField::Age, "forty").unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { expected: FieldKind::I64, .. }));
        assert!(FilterCondition::is_in(PersonField::Id, ["not-a-uuid"]).is_err());
    }

    #[test]
    fn condition_json_round_trips() {
        let raw = json!({"field": "name", "operator": "ilike", "value": "%smith%"});
        let expr: FilterExpr<PersonField> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(expr, FilterExpr::Condition(FilterCondition::ilike(PersonField::Name, "%smith%").unwrap()));
        assert_eq!(serde_json::to_value(&expr).unwrap(), raw);
    }

    #[test]
    fn nested_group_json_round_trips() {
        let raw = json!({
            "operator": "OR",
            "conditions": [
                {"field": "age", "operator": "between", "value": [18, 30]},
                {
                    "operator": "AND",
                    "conditions": [
                        {"field": "active", "operator": "eq", "value": true},
                        {"field": "createdAt", "operator": "isNotNull", "value": null},
                        {"field": "name", "operator": "notIn", "value": ["a", "b"]}
                    ]
                }
            ]
        });
        let expr: FilterExpr<PersonField> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(expr.depth(), 3);
        assert_eq!(expr.condition_count(), 4);
        assert_eq!(serde_json::to_value(&expr).unwrap(), raw);
    }

    #[test]
    fn lowercase_group_operator_is_accepted() {
        let expr = FilterExpr::<PersonField>::from_json(
            r#"{"operator":"and","conditions":[{"field":"age","operator":"gte","value":1}]}"#,
        )
        .unwrap();
        let FilterExpr::Group(group) = expr else {
            panic!("expected a group");
        };
        assert_eq!(group.operator(), GroupOperator::And);
    }

    #[test]
    fn json_errors_name_the_problem() {
        let err = FilterExpr::<PersonField>::from_json(r#"{"field":"salary","operator":"eq","value":1}"#)
            .unwrap_err();
        assert!(err.to_string().contains("salary"), "{err}");

        let err = FilterExpr::<PersonField>::from_json(r#"{"operator":"AND","conditions":[]}"#).unwrap_err();
        assert!(err.to_string().contains("at least one condition"), "{err}");

        let err = FilterExpr::<PersonField>::from_json(r#"{"field":"name","operator":"in","value":"x"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("an array value"), "{err}");
    }

    #[test]
    fn every_operator_has_a_stable_wire_name() {
        for op in FilterOperator::ALL {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, json!(op.as_str()));
            let back: FilterOperator = serde_json::from_value(json).unwrap();
            assert_eq!(back, op);
        }
    }

    #[test]
    fn limits_reject_deep_trees() {
        let leaf: FilterExpr<PersonField> = FilterCondition::eq(PersonField::Age, 1).unwrap().into();
        let mut expr = leaf;
        for _ in 0..4 {
            expr = FilterExpr::and(vec![expr]).unwrap();
        }
        assert_eq!(expr.depth(), 5);
        assert!(expr.validate_limits(&QueryLimits::default()).is_ok());
        let strict = QueryLimits::default().with_max_filter_depth(3);
        assert!(matches!(expr.validate_limits(&strict), Err(QueryError::TooComplex(_))));
    }
}
