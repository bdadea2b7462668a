use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use repokit::handlers::EntityHandlers;
use repokit::query::QueryLimits;
use repokit::{Entity, Repository, RepositoryRegistry};
use repokit_db::SeaRepository;

use crate::config::CatalogConfig;
use crate::contract::model::{Course, CourseTranslation, Instructor};
use crate::domain::enricher::CourseEnricher;
use crate::infra::storage::mapper::{CourseMapping, CourseTranslationMapping, InstructorMapping};
use crate::infra::storage::migrations::Migrator;

/// Handler bundles for every catalog entity.
#[derive(Clone)]
pub struct CatalogServices {
    pub instructors: EntityHandlers<Instructor>,
    pub courses: EntityHandlers<Course>,
    pub course_translations: EntityHandlers<CourseTranslation>,
}

pub struct CatalogModule;

impl CatalogModule {
    /// # Errors
    /// Migration failures.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running catalog database migrations");
        Migrator::up(db, None).await?;
        info!("Catalog database migrations completed");
        Ok(())
    }

    /// Same as [`Self::init_with_limits`] with default query limits.
    ///
    /// # Errors
    /// Migration failures when `migrate_on_init` is set.
    pub async fn init(
        db: &DatabaseConnection,
        registry: &Arc<RepositoryRegistry>,
        config: &CatalogConfig,
    ) -> anyhow::Result<CatalogServices> {
        Self::init_with_limits(db, registry, config, QueryLimits::default()).await
    }

    /// Builds the repositories, registers them by entity name and returns
    /// their handlers.
    ///
    /// # Errors
    /// Migration failures when `migrate_on_init` is set.
    pub async fn init_with_limits(
        db: &DatabaseConnection,
        registry: &Arc<RepositoryRegistry>,
        config: &CatalogConfig,
        limits: QueryLimits,
    ) -> anyhow::Result<CatalogServices> {
        info!(default_locale = %config.default_locale, "Initializing catalog module");
        if config.migrate_on_init {
            Self::migrate(db).await?;
        }

        let instructors: Arc<dyn Repository<Instructor>> = Arc::new(
            SeaRepository::<InstructorMapping>::new(db.clone()).with_limits(limits),
        );
        let translations: Arc<dyn Repository<CourseTranslation>> = Arc::new(
            SeaRepository::<CourseTranslationMapping>::new(db.clone()).with_limits(limits),
        );
        let enricher = CourseEnricher::new(Arc::clone(registry), config.default_locale.clone());
        let courses: Arc<dyn Repository<Course>> = Arc::new(
            SeaRepository::<CourseMapping>::new(db.clone())
                .with_limits(limits)
                .with_enricher(Arc::new(enricher)),
        );

        registry.register(Instructor::NAME, Arc::clone(&instructors));
        registry.register(CourseTranslation::NAME, Arc::clone(&translations));
        registry.register(Course::NAME, Arc::clone(&courses));

        info!(repositories = ?registry.names(), "Catalog module initialized");
        Ok(CatalogServices {
            instructors: EntityHandlers::new(&instructors),
            courses: EntityHandlers::new(&courses),
            course_translations: EntityHandlers::new(&translations),
        })
    }
}
