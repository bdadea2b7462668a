use sea_orm::sea_query::NullOrdering;
use sea_orm::{ColumnTrait, Order, QueryOrder};

use repokit_query::{EntityField, NullsOrder, Sort, SortOrder};

fn order(o: SortOrder) -> Order {
    match o {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// Appends `ORDER BY` terms in list order. Earlier fields take precedence.
pub fn apply_sort<Q, F, C>(mut query: Q, sort: &Sort<F>, column: &impl Fn(F) -> C) -> Q
where
    Q: QueryOrder,
    F: EntityField,
    C: ColumnTrait,
{
    for sf in sort {
        let col = column(sf.field);
        query = match sf.nulls {
            None => query.order_by(col, order(sf.order)),
            Some(NullsOrder::First) => query.order_by_with_nulls(col, order(sf.order), NullOrdering::First),
            Some(NullsOrder::Last) => query.order_by_with_nulls(col, order(sf.order), NullOrdering::Last),
        };
    }
    query
}

/// [`apply_sort`] plus `id ASC` last, unless the sort already orders by id.
/// Keeps page windows stable when the requested keys tie.
pub fn apply_sort_with_tiebreaker<Q, F, C>(
    query: Q,
    sort: &Sort<F>,
    column: &impl Fn(F) -> C,
    id_column: C,
) -> Q
where
    Q: QueryOrder,
    F: EntityField,
    C: ColumnTrait,
{
    let has_id = sort.iter().any(|sf| column(sf.field).as_str() == id_column.as_str());
    let query = apply_sort(query, sort, column);
    if has_id {
        query
    } else {
        query.order_by(id_column, Order::Asc)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_entity::{LessonField, lesson};
    use repokit_query::SortField;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    fn sql(sort: &Sort<LessonField>) -> String {
        apply_sort_with_tiebreaker(lesson::Entity::find(), sort, &lesson::column_for, lesson::Column::Id)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn list_order_is_precedence_and_id_breaks_ties() {
        let sort = Sort::by(SortField::desc(LessonField::PriceCents)).then(SortField::asc(LessonField::Title));
        let out = sql(&sort);
        assert!(
            out.ends_with(r#"ORDER BY "lessons"."price_cents" DESC, "lessons"."title" ASC, "lessons"."id" ASC"#),
            "{out}"
        );
    }

    #[test]
    fn explicit_id_sort_is_not_duplicated() {
        let out = sql(&Sort::by(SortField::desc(LessonField::Id)));
        assert!(out.ends_with(r#"ORDER BY "lessons"."id" DESC"#), "{out}");
    }

    #[test]
    fn nulls_placement() {
        let out = sql(&Sort::by(SortField::asc(LessonField::StartsAt).nulls(NullsOrder::Last)));
        assert!(out.contains(r#""lessons"."starts_at" ASC NULLS LAST"#), "{out}");
    }

    #[test]
    fn empty_sort_only_orders_by_id() {
        let out = sql(&Sort::default());
        assert!(out.ends_with(r#"ORDER BY "lessons"."id" ASC"#), "{out}");
    }
}
