use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Select,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use repokit::{Entity, FindOptions, LoadOptions, Operation, RepoError, RepoResult, Repository};
use repokit_query::{PaginatedRequest, PaginatedResponse, QueryLimits};

use crate::error::classify;
use crate::filter::filter_to_condition;
use crate::mapping::EntityMapping;
use crate::sort::{apply_sort, apply_sort_with_tiebreaker};

type Field<M> = <<M as EntityMapping>::Domain as Entity>::Field;

/// Attaches relations and translations after the base rows are loaded.
#[async_trait]
pub trait Enricher<D: Send>: Send + Sync {
    /// Names accepted in [`LoadOptions::with`].
    fn relations(&self) -> &[&'static str];

    /// # Errors
    /// Whatever loading the related rows returns.
    async fn enrich(&self, items: &mut [D], load: &LoadOptions) -> RepoResult<()>;
}

/// Generic [`Repository`] over a sea-orm entity.
pub struct SeaRepository<M: EntityMapping> {
    db: DatabaseConnection,
    enricher: Option<Arc<dyn Enricher<M::Domain>>>,
    limits: QueryLimits,
    _mapping: PhantomData<fn() -> M>,
}

impl<M: EntityMapping> SeaRepository<M> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            enricher: None,
            limits: QueryLimits::default(),
            _mapping: PhantomData,
        }
    }

    #[must_use]
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher<M::Domain>>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn name() -> &'static str {
        <M::Domain as Entity>::NAME
    }

    fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    fn check_load(&self, load: &LoadOptions) -> RepoResult<()> {
        let known = self.enricher.as_ref().map_or(&[][..], |e| e.relations());
        match load
            .with
            .iter()
            .find(|name| !known.iter().any(|k| k.eq_ignore_ascii_case(name)))
        {
            Some(unknown) => Err(RepoError::invalid_field(
                "with",
                format!("unknown relation '{unknown}' for {}", Self::name()),
            )),
            None => Ok(()),
        }
    }

    /// Base select with the filter applied; shared by data and count queries.
    fn filtered(&self, options: &FindOptions<Field<M>>) -> RepoResult<Select<M::Entity>> {
        self.check_load(&options.load)?;
        options.sort.validate_limits(&self.limits)?;

        let mut select = M::Entity::find();
        if let Some(filter) = &options.filter {
            filter.validate_limits(&self.limits)?;
            select = select.filter(filter_to_condition(filter, self.backend(), &M::column)?);
        }
        Ok(select)
    }

    async fn finish(&self, models: Vec<M::Model>, load: &LoadOptions) -> RepoResult<Vec<M::Domain>> {
        let mut items = models
            .into_iter()
            .map(M::to_domain)
            .collect::<RepoResult<Vec<_>>>()?;
        if !items.is_empty()
            && !load.is_plain()
            && let Some(enricher) = &self.enricher
        {
            enricher.enrich(&mut items, load).await?;
        }
        Ok(items)
    }

    async fn finish_one(
        &self,
        model: Option<M::Model>,
        load: &LoadOptions,
    ) -> RepoResult<Option<M::Domain>> {
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(self.finish(vec![model], load).await?.pop())
    }

    async fn count_id(&self, id: Uuid, op: Operation) -> RepoResult<u64> {
        M::Entity::find()
            .filter(M::id_column().eq(id))
            .count(&self.db)
            .await
            .map_err(|e| classify(Self::name(), op, e))
    }
}

#[async_trait]
impl<M: EntityMapping> Repository<M::Domain> for SeaRepository<M> {
    #[instrument(skip_all, fields(entity = Self::name(), db.operation = "find_by_id", %id))]
    async fn find_by_id(&self, id: Uuid, load: &LoadOptions) -> RepoResult<Option<M::Domain>> {
        self.check_load(load)?;
        let model = M::Entity::find()
            .filter(M::id_column().eq(id))
            .one(&self.db)
            .await
            .map_err(|e| classify(Self::name(), Operation::Find, e))?;
        self.finish_one(model, load).await
    }

    #[instrument(skip_all, fields(entity = Self::name(), db.operation = "find_one"))]
    async fn find_one(&self, options: &FindOptions<Field<M>>) -> RepoResult<Option<M::Domain>> {
        let select = apply_sort(self.filtered(options)?, &options.sort, &M::column);
        let model = select
            .one(&self.db)
            .await
            .map_err(|e| classify(Self::name(), Operation::Find, e))?;
        self.finish_one(model, &options.load).await
    }

    #[instrument(skip_all, fields(entity = Self::name(), db.operation = "find_many"))]
    async fn find_many(&self, options: &FindOptions<Field<M>>) -> RepoResult<Vec<M::Domain>> {
        let mut select = apply_sort(self.filtered(options)?, &options.sort, &M::column);
        if let Some(limit) = options.limit {
            select = select.limit(limit);
        }
        let models = select
            .all(&self.db)
            .await
            .map_err(|e| classify(Self::name(), Operation::Find, e))?;
        debug!(rows = models.len(), "loaded");
        self.finish(models, &options.load).await
    }

    #[instrument(
        skip_all,
        fields(entity = Self::name(), db.operation = "paginate", page = request.page, limit = request.limit)
    )]
    async fn paginate(
        &self,
        request: &PaginatedRequest,
        options: &FindOptions<Field<M>>,
    ) -> RepoResult<PaginatedResponse<M::Domain>> {
        request.validate(&self.limits)?;
        let select = self.filtered(options)?;

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| classify(Self::name(), Operation::Count, e))?;
        if total <= request.offset() {
            return Ok(PaginatedResponse::new(Vec::new(), total, *request));
        }

        let models = apply_sort_with_tiebreaker(select, &options.sort, &M::column, M::id_column())
            .offset(request.offset())
            .limit(request.limit)
            .all(&self.db)
            .await
            .map_err(|e| classify(Self::name(), Operation::Find, e))?;
        let data = self.finish(models, &options.load).await?;
        debug!(total, rows = data.len(), "page loaded");
        Ok(PaginatedResponse::new(data, total, *request))
    }

    #[instrument(skip_all, fields(entity = Self::name(), db.operation = "save", id = %entity.id()))]
    async fn save(&self, mut entity: M::Domain) -> RepoResult<M::Domain> {
        entity.touch();
        let active = M::to_schema(&entity);

        if self.count_id(entity.id(), Operation::Update).await? > 0 {
            M::Entity::update(active)
                .exec(&self.db)
                .await
                .map_err(|e| classify(Self::name(), Operation::Update, e))?;
            debug!("updated");
        } else {
            M::Entity::insert(active)
                .exec_without_returning(&self.db)
                .await
                .map_err(|e| classify(Self::name(), Operation::Insert, e))?;
            debug!("inserted");
        }
        Ok(entity)
    }

    #[instrument(skip_all, fields(entity = Self::name(), db.operation = "delete", %id))]
    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let res = M::Entity::delete_many()
            .filter(M::id_column().eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| classify(Self::name(), Operation::Delete, e))?;
        if res.rows_affected == 0 {
            debug!("nothing to delete");
        }
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.count_id(id, Operation::Find).await? > 0)
    }
}
