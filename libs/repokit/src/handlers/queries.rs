use std::sync::Arc;

use tracing::{debug, instrument};

use repokit_query::{EntityField, FilterCondition, FilterValue, PaginatedRequest, PaginatedResponse};

use crate::entity::Entity;
use crate::error::{RepoError, RepoResult};
use crate::options::{FindOptions, LoadOptions};
use crate::repository::Repository;

/// Look up one entity by a single field value.
#[derive(Clone, Debug)]
pub struct GetByFieldQuery<F: EntityField> {
    pub field: F,
    pub value: FilterValue,
    pub load: LoadOptions,
}

impl<F: EntityField> GetByFieldQuery<F> {
    pub fn new(field: F, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            value: value.into(),
            load: LoadOptions::default(),
        }
    }

    #[must_use]
    pub fn load(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }
}

pub struct GetByFieldHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for GetByFieldHandler<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> GetByFieldHandler<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// The id field goes straight to `find_by_id`; any other field becomes a
    /// single `eq` condition for `find_one`.
    ///
    /// # Errors
    ///
    /// Validation errors for a value that does not fit the field, plus
    /// whatever the repository returns.
    #[instrument(skip_all, fields(entity = E::NAME, field = query.field.name()))]
    pub async fn execute(&self, query: GetByFieldQuery<E::Field>) -> RepoResult<Option<E>> {
        if query.field.is_id() {
            let id = query
                .value
                .as_scalar()
                .and_then(repokit_query::Scalar::as_uuid)
                .ok_or_else(|| RepoError::invalid_field(query.field.name(), "expected a UUID"))?;
            debug!(%id, "id fast path");
            return self.repo.find_by_id(id, &query.load).await;
        }

        let condition = FilterCondition::eq(query.field, query.value)?;
        let options = FindOptions::new().filter(condition).load(query.load);
        self.repo.find_one(&options).await
    }
}

#[derive(Clone, Debug)]
pub struct FindManyQuery<F: EntityField> {
    pub options: FindOptions<F>,
}

pub struct FindManyHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for FindManyHandler<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> FindManyHandler<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Whatever the repository returns.
    #[instrument(skip_all, fields(entity = E::NAME))]
    pub async fn execute(&self, query: FindManyQuery<E::Field>) -> RepoResult<Vec<E>> {
        self.repo.find_many(&query.options).await
    }
}

#[derive(Clone, Debug)]
pub struct GetPaginatedQuery<F: EntityField> {
    pub request: PaginatedRequest,
    pub options: FindOptions<F>,
}

pub struct GetPaginatedHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for GetPaginatedHandler<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> GetPaginatedHandler<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Whatever the repository returns.
    #[instrument(skip_all, fields(entity = E::NAME, page = query.request.page, limit = query.request.limit))]
    pub async fn execute(&self, query: GetPaginatedQuery<E::Field>) -> RepoResult<PaginatedResponse<E>> {
        self.repo.paginate(&query.request, &query.options).await
    }
}
