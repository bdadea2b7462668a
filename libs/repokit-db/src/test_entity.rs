//! Minimal entity for SQL rendering tests.

repokit_query::entity_fields! {
    pub enum LessonField {
        Id => ("id", Uuid),
        Title => ("title", String),
        Level => ("level", String),
        PriceCents => ("priceCents", I64),
        Tags => ("tags", StringArray),
        StartsAt => ("startsAt", DateTimeUtc),
    }
}

pub mod lesson {
    use sea_orm::entity::prelude::*;

    use super::LessonField;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "lessons")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub title: Option<String>,
        pub level: String,
        pub price_cents: i64,
        pub tags: Json,
        pub starts_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    pub fn column_for(field: LessonField) -> Column {
        match field {
            LessonField::Id => Column::Id,
            LessonField::Title => Column::Title,
            LessonField::Level => Column::Level,
            LessonField::PriceCents => Column::PriceCents,
            LessonField::Tags => Column::Tags,
            LessonField::StartsAt => Column::StartsAt,
        }
    }
}
