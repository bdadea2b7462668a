use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult,
    IntoActiveModel, ModelTrait,
};

use repokit::{Entity, RepoResult};

/// Ties a sea-orm entity to its domain type.
///
/// `to_domain` and `to_schema` are the only places that know the row shape;
/// everything else in [`SeaRepository`](crate::SeaRepository) is generic.
pub trait EntityMapping: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, ActiveModel = Self::ActiveModel, Column = Self::Column>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Column: ColumnTrait;
    type Domain: Entity;

    fn column(field: <Self::Domain as Entity>::Field) -> Self::Column;

    fn id_column() -> Self::Column;

    /// # Errors
    /// A row that cannot be represented in the domain (corrupt enum text,
    /// malformed JSON) is a data access error.
    fn to_domain(model: Self::Model) -> RepoResult<Self::Domain>;

    fn to_schema(domain: &Self::Domain) -> Self::ActiveModel;
}
