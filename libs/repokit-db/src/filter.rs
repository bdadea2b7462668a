//! Filter tree to `sea_orm::Condition` compiler.

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, DbBackend, EntityName};

use repokit::RepoError;
use repokit::RepoResult;
use repokit_query::{
    EntityField, FieldKind, FilterCondition, FilterExpr, FilterOperator, GroupOperator, Scalar,
};

/// Compiles `expr` into a condition. `column` maps each field onto its column.
///
/// `AND` groups become `Condition::all`, `OR` groups `Condition::any`.
///
/// # Errors
/// [`RepoError::Validation`] when an operator has no rendition on `backend`.
pub fn filter_to_condition<F, C>(
    expr: &FilterExpr<F>,
    backend: DbBackend,
    column: &impl Fn(F) -> C,
) -> RepoResult<Condition>
where
    F: EntityField,
    C: ColumnTrait,
{
    Ok(match expr {
        FilterExpr::Condition(c) => Condition::all().add(condition_expr(c, backend, column)?),
        FilterExpr::Group(group) => {
            let mut cond = match group.operator() {
                GroupOperator::And => Condition::all(),
                GroupOperator::Or => Condition::any(),
            };
            for child in group.conditions() {
                cond = cond.add(filter_to_condition(child, backend, column)?);
            }
            cond
        }
    })
}

pub(crate) fn col_expr<C: ColumnTrait>(col: C) -> Expr {
    Expr::col((col.entity_name(), col))
}

/* ---------- coercion ---------- */

fn coerce(field: &str, kind: FieldKind, v: &Scalar) -> RepoResult<sea_orm::Value> {
    let mismatch = || RepoError::invalid_field(field, format!("value does not fit a {kind} column"));
    Ok(match kind {
        FieldKind::String | FieldKind::StringArray => {
            sea_orm::Value::String(Some(Box::new(v.as_str().ok_or_else(mismatch)?.to_owned())))
        }
        FieldKind::I64 => sea_orm::Value::BigInt(Some(v.as_i64().ok_or_else(mismatch)?)),
        FieldKind::F64 => sea_orm::Value::Double(Some(v.as_f64().ok_or_else(mismatch)?)),
        FieldKind::Bool => sea_orm::Value::Bool(Some(v.as_bool().ok_or_else(mismatch)?)),
        FieldKind::Uuid => sea_orm::Value::Uuid(Some(Box::new(v.as_uuid().ok_or_else(mismatch)?))),
        FieldKind::DateTimeUtc => {
            sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(v.as_datetime().ok_or_else(mismatch)?)))
        }
        FieldKind::Date => sea_orm::Value::ChronoDate(Some(Box::new(v.as_date().ok_or_else(mismatch)?))),
    })
}

fn coerce_all(field: &str, kind: FieldKind, items: &[Scalar]) -> RepoResult<Vec<sea_orm::Value>> {
    items.iter().map(|v| coerce(field, kind, v)).collect()
}

fn first<F: EntityField>(c: &FilterCondition<F>) -> RepoResult<sea_orm::Value> {
    let lit = c
        .literals()
        .first()
        .ok_or_else(|| RepoError::invalid_field(c.field().name(), "missing value"))?;
    coerce(c.field().name(), c.field().kind(), lit)
}

/* ---------- conditions ---------- */

fn condition_expr<F, C>(
    c: &FilterCondition<F>,
    backend: DbBackend,
    column: &impl Fn(F) -> C,
) -> RepoResult<SimpleExpr>
where
    F: EntityField,
    C: ColumnTrait,
{
    let field = c.field();
    let col = column(field);
    let name = field.name();
    let kind = field.kind();

    Ok(match c.operator() {
        FilterOperator::Eq => col_expr(col).eq(first(c)?),
        FilterOperator::Ne => col_expr(col).ne(first(c)?),
        FilterOperator::Gt => col_expr(col).gt(first(c)?),
        FilterOperator::Gte => col_expr(col).gte(first(c)?),
        FilterOperator::Lt => col_expr(col).lt(first(c)?),
        FilterOperator::Lte => col_expr(col).lte(first(c)?),
        FilterOperator::In => {
            let values = coerce_all(name, kind, c.literals())?;
            if values.is_empty() {
                Expr::cust("1=0")
            } else {
                col_expr(col).is_in(values)
            }
        }
        FilterOperator::NotIn => {
            let values = coerce_all(name, kind, c.literals())?;
            if values.is_empty() {
                Expr::cust("1=1")
            } else {
                col_expr(col).is_not_in(values)
            }
        }
        FilterOperator::Like => col_expr(col).like(pattern(c)?),
        // LOWER on both sides keeps the semantics identical across backends.
        FilterOperator::Ilike => {
            Expr::expr(Func::lower(col_expr(col))).like(pattern(c)?.to_lowercase())
        }
        FilterOperator::IsNull => col_expr(col).is_null(),
        FilterOperator::IsNotNull => col_expr(col).is_not_null(),
        FilterOperator::Between => {
            let [low, high] = c.literals() else {
                return Err(RepoError::invalid_field(name, "between takes exactly two values"));
            };
            col_expr(col).between(coerce(name, kind, low)?, coerce(name, kind, high)?)
        }
        op @ (FilterOperator::ArrayContains
        | FilterOperator::ArrayContained
        | FilterOperator::ArrayOverlaps) => array_expr(op, col, name, c.literals(), backend)?,
    })
}

fn pattern<F: EntityField>(c: &FilterCondition<F>) -> RepoResult<String> {
    c.literals()
        .first()
        .and_then(Scalar::as_str)
        .map(str::to_owned)
        .ok_or_else(|| RepoError::invalid_field(c.field().name(), "expected a string pattern"))
}

/* ---------- array operators over JSON array columns ---------- */

fn array_expr<C: ColumnTrait>(
    op: FilterOperator,
    col: C,
    field: &str,
    items: &[Scalar],
    backend: DbBackend,
) -> RepoResult<SimpleExpr> {
    let table = <C::EntityName as Default>::default();
    let qualified = format!("\"{}\".\"{}\"", table.table_name(), col.as_str());
    let elements = match backend {
        DbBackend::Sqlite => format!("json_each({qualified})"),
        DbBackend::Postgres => format!("jsonb_array_elements_text({qualified}) AS elem(value)"),
        DbBackend::MySql => {
            return Err(RepoError::invalid_field(
                field,
                format!("{op} is not supported on MySQL"),
            ));
        }
    };

    let mut values: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let s = item
            .as_str()
            .ok_or_else(|| RepoError::invalid_field(field, "array elements must be strings"))?;
        if !values.iter().any(|v| v == s) {
            values.push(s.to_owned());
        }
    }

    if values.is_empty() {
        return Ok(match op {
            FilterOperator::ArrayContains => Expr::cust("1=1"),
            FilterOperator::ArrayOverlaps => Expr::cust("1=0"),
            _ => Expr::cust(format!("NOT EXISTS (SELECT 1 FROM {elements})")),
        });
    }

    let marks = placeholders(backend, values.len());
    let sql = match op {
        FilterOperator::ArrayContains => format!(
            "(SELECT COUNT(DISTINCT value) FROM {elements} WHERE value IN ({marks})) = {}",
            values.len()
        ),
        FilterOperator::ArrayContained => {
            format!("NOT EXISTS (SELECT 1 FROM {elements} WHERE value NOT IN ({marks}))")
        }
        _ => format!("EXISTS (SELECT 1 FROM {elements} WHERE value IN ({marks}))"),
    };
    Ok(Expr::cust_with_values(sql, values))
}

/// Custom SQL is only rewritten for the backend's own marker: `$N` on
/// Postgres, `?` elsewhere.
fn placeholders(backend: DbBackend, n: usize) -> String {
    match backend {
        DbBackend::Postgres => (1..=n).map(|i| format!("${i}")).collect::<Vec<_>>().join(", "),
        _ => vec!["?"; n].join(", "),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_entity::{LessonField, lesson};
    use sea_orm::{EntityTrait, QueryFilter, QueryTrait};

    fn sql(expr: &FilterExpr<LessonField>, backend: DbBackend) -> String {
        let cond = filter_to_condition(expr, backend, &lesson::column_for).unwrap();
        lesson::Entity::find().filter(cond).build(backend).to_string()
    }

    fn cond(c: repokit_query::QueryResult<FilterCondition<LessonField>>) -> FilterExpr<LessonField> {
        FilterExpr::Condition(c.unwrap())
    }

    #[test]
    fn scalar_comparison() {
        let out = sql(&cond(FilterCondition::eq(LessonField::Level, "beginner")), DbBackend::Sqlite);
        assert!(out.contains(r#""lessons"."level" = 'beginner'"#), "{out}");
    }

    #[test]
    fn ilike_lowers_both_sides() {
        let out = sql(&cond(FilterCondition::ilike(LessonField::Title, "%SaLsA%")), DbBackend::Postgres);
        assert!(out.contains(r#"LOWER("lessons"."title") LIKE '%salsa%'"#), "{out}");
    }

    #[test]
    fn groups_nest_with_and_or() {
        let expr = FilterExpr::and(vec![
            cond(FilterCondition::between(LessonField::PriceCents, 100, 200)),
            FilterExpr::or(vec![
                FilterCondition::is_null(LessonField::Title).into(),
                cond(FilterCondition::ne(LessonField::Level, "advanced")),
            ])
            .unwrap(),
        ])
        .unwrap();
        let out = sql(&expr, DbBackend::Sqlite);
        assert!(out.contains(r#""lessons"."price_cents" BETWEEN 100 AND 200"#), "{out}");
        assert!(
            out.contains(r#"("lessons"."title" IS NULL OR "lessons"."level" <> 'advanced')"#),
            "{out}"
        );
    }

    #[test]
    fn empty_in_lists_are_constant() {
        let none: Vec<&str> = Vec::new();
        let out = sql(&cond(FilterCondition::is_in(LessonField::Level, none.clone())), DbBackend::Sqlite);
        assert!(out.contains("1=0"), "{out}");

        let not_in = FilterCondition::new(LessonField::Level, FilterOperator::NotIn, Some(repokit_query::FilterValue::list(none)));
        let out = sql(&cond(not_in), DbBackend::Sqlite);
        assert!(out.contains("1=1"), "{out}");
    }

    #[test]
    fn array_operators_per_backend() {
        let overlaps = cond(
            FilterCondition::new(
                LessonField::Tags,
                FilterOperator::ArrayOverlaps,
                Some(repokit_query::FilterValue::list(["salsa", "bachata"])),
            )
            ,
        );

        let lite = sql(&overlaps, DbBackend::Sqlite);
        assert!(lite.contains(r#"json_each("lessons"."tags")"#), "{lite}");
        let pg = sql(&overlaps, DbBackend::Postgres);
        assert!(pg.contains(r#"jsonb_array_elements_text("lessons"."tags")"#), "{pg}");

        let err = filter_to_condition(&overlaps, DbBackend::MySql, &lesson::column_for).unwrap_err();
        assert!(matches!(err, RepoError::Validation { .. }));
    }

    #[test]
    fn array_values_are_bound_on_every_backend() {
        let contains = cond(FilterCondition::new(
            LessonField::Tags,
            FilterOperator::ArrayContains,
            Some(repokit_query::FilterValue::list(["salsa", "bachata"])),
        ));
        let expected = vec![
            sea_orm::Value::String(Some(Box::new("salsa".to_owned()))),
            sea_orm::Value::String(Some(Box::new("bachata".to_owned()))),
        ];

        for (backend, marker) in [(DbBackend::Sqlite, "IN (?, ?)"), (DbBackend::Postgres, "IN ($1, $2)")] {
            let condition = filter_to_condition(&contains, backend, &lesson::column_for).unwrap();
            let stmt = lesson::Entity::find().filter(condition).build(backend);
            assert!(stmt.sql.contains(marker), "{}", stmt.sql);
            let bound = stmt.values.map(|v| v.0).unwrap_or_default();
            assert_eq!(bound, expected, "{}", stmt.sql);
        }

        let inlined = sql(&contains, DbBackend::Postgres);
        assert!(inlined.contains("IN ('salsa', 'bachata')"), "{inlined}");
    }
}
