use async_trait::async_trait;
use uuid::Uuid;

use repokit_query::{PaginatedRequest, PaginatedResponse};

use crate::entity::Entity;
use crate::error::RepoResult;
use crate::options::{FindOptions, LoadOptions};

/// Storage port for one entity type.
///
/// Object safe: callers hold `Arc<dyn Repository<E>>` and the registry
/// stores repositories that way.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find_by_id(&self, id: Uuid, load: &LoadOptions) -> RepoResult<Option<E>>;

    /// First match of `options.filter`. Row choice is unspecified unless a sort is given.
    async fn find_one(&self, options: &FindOptions<E::Field>) -> RepoResult<Option<E>>;

    async fn find_many(&self, options: &FindOptions<E::Field>) -> RepoResult<Vec<E>>;

    /// `total` counts every row matching the filter, independent of the page window.
    async fn paginate(
        &self,
        request: &PaginatedRequest,
        options: &FindOptions<E::Field>,
    ) -> RepoResult<PaginatedResponse<E>>;

    /// Inserts or updates by id and returns the stored entity with `updated_at` refreshed.
    async fn save(&self, entity: E) -> RepoResult<E>;

    /// Removing a missing id succeeds.
    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.find_by_id(id, &LoadOptions::default()).await?.is_some())
    }
}
