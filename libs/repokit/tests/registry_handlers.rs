//! Repositories resolved from the registry drive the generic handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use repokit::handlers::{
    CreateCommand, DeleteCommand, EntityHandlers, GetByFieldQuery, GetPaginatedQuery, UpdateCommand,
};
use repokit::query::{PaginatedRequest, PaginatedResponse, entity_fields};
use repokit::{
    ApplyPatch, BaseEntity, Entity, FindOptions, LoadOptions, Patch, RepoResult, Repository,
    RepositoryRegistry,
};

entity_fields! {
    pub enum StudioField {
        Id => ("id", Uuid),
        City => ("city", String),
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Studio {
    base: BaseEntity,
    city: String,
    phone: Option<String>,
}

impl Entity for Studio {
    const NAME: &'static str = "studio";
    type Field = StudioField;

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }
}

struct StudioPatch {
    phone: Patch<String>,
}

impl ApplyPatch<Studio> for StudioPatch {
    fn apply(self, studio: &mut Studio) {
        self.phone.apply_to(&mut studio.phone);
    }
}

/// Ignores filters; good enough to exercise wiring and paging arithmetic.
#[derive(Default)]
struct MemoryStudios {
    rows: Mutex<BTreeMap<String, Studio>>,
}

impl MemoryStudios {
    fn ordered(&self) -> Vec<Studio> {
        self.rows.lock().values().cloned().collect()
    }
}

#[async_trait]
impl Repository<Studio> for MemoryStudios {
    async fn find_by_id(&self, id: Uuid, _load: &LoadOptions) -> RepoResult<Option<Studio>> {
        Ok(self.ordered().into_iter().find(|s| s.base.id == id))
    }

    async fn find_one(&self, _options: &FindOptions<StudioField>) -> RepoResult<Option<Studio>> {
        Ok(self.ordered().into_iter().next())
    }

    async fn find_many(&self, options: &FindOptions<StudioField>) -> RepoResult<Vec<Studio>> {
        let mut rows = self.ordered();
        if let Some(limit) = options.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(rows)
    }

    async fn paginate(
        &self,
        request: &PaginatedRequest,
        _options: &FindOptions<StudioField>,
    ) -> RepoResult<PaginatedResponse<Studio>> {
        let rows = self.ordered();
        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit).unwrap_or(usize::MAX))
            .collect();
        Ok(PaginatedResponse::new(page, total, *request))
    }

    async fn save(&self, mut entity: Studio) -> RepoResult<Studio> {
        entity.touch();
        let mut rows = self.rows.lock();
        rows.retain(|_, s| s.base.id != entity.base.id);
        rows.insert(format!("{}-{}", entity.city, entity.base.id), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.rows.lock().retain(|_, s| s.base.id != id);
        Ok(())
    }
}

fn studio(city: &str) -> Studio {
    Studio {
        base: BaseEntity::new(),
        city: city.to_owned(),
        phone: None,
    }
}

fn registry_with_studios() -> RepositoryRegistry {
    let registry = RepositoryRegistry::new();
    let repo: Arc<dyn Repository<Studio>> = Arc::new(MemoryStudios::default());
    registry.register(Studio::NAME, repo);
    registry
}

#[tokio::test]
async fn handlers_over_a_resolved_repository() {
    let registry = registry_with_studios();
    let repo = registry.get::<dyn Repository<Studio>>("Studio").unwrap();
    let handlers = EntityHandlers::new(&repo);

    let mut ids = Vec::new();
    for city in ["Lisbon", "Berlin", "Havana"] {
        let created = handlers
            .create
            .execute(CreateCommand { entity: studio(city) })
            .await
            .unwrap();
        ids.push(created.base.id);
    }

    let first = handlers
        .get_paginated
        .execute(GetPaginatedQuery {
            request: PaginatedRequest::new(1, 2).unwrap(),
            options: FindOptions::new(),
        })
        .await
        .unwrap();
    let second = handlers
        .get_paginated
        .execute(GetPaginatedQuery {
            request: PaginatedRequest::new(2, 2).unwrap(),
            options: FindOptions::new(),
        })
        .await
        .unwrap();

    assert_eq!(first.total, 3);
    assert_eq!(second.total, first.total);
    assert_eq!(first.total_pages, 2);
    assert_eq!(
        first.data.iter().chain(&second.data).map(|s| s.city.as_str()).collect::<Vec<_>>(),
        ["Berlin", "Havana", "Lisbon"]
    );

    let updated = handlers
        .update
        .execute(UpdateCommand {
            id: ids[0],
            patch: StudioPatch {
                phone: Patch::Set("+351 000".to_owned()),
            },
        })
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("+351 000"));
    assert_eq!(updated.city, "Lisbon");

    let fetched = handlers
        .get_by_field
        .execute(GetByFieldQuery::new(StudioField::Id, ids[0]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, updated);

    handlers.delete.execute(DeleteCommand { id: ids[0] }).await.unwrap();
    assert!(handlers.delete.execute(DeleteCommand { id: ids[0] }).await.unwrap_err().is_not_found());
    assert!(!repo.exists(ids[0]).await.unwrap());
}

#[tokio::test]
async fn registry_lookup_with_the_wrong_type_fails() {
    let registry = registry_with_studios();
    assert!(registry.has("STUDIO"));
    assert!(registry.get::<dyn Repository<Studio>>("coach").is_err());
    assert!(registry.get::<String>("studio").is_err());
}
