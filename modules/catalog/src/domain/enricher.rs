//! Relation and translation loading for courses.
//!
//! Related repositories are resolved from the registry on every call, so the
//! enricher can be built before they are registered.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use repokit::query::FilterCondition;
use repokit::{
    Entity, FindOptions, LoadOptions, Operation, RepoError, RepoResult, Repository,
    RepositoryRegistry, Translatable, Translations,
};
use repokit_db::Enricher;

use crate::contract::model::{
    Course, CourseTranslation, CourseTranslationField, Instructor, InstructorField,
};

pub const INSTRUCTOR_RELATION: &str = "instructor";

pub struct CourseEnricher {
    registry: Arc<RepositoryRegistry>,
    default_locale: String,
}

impl CourseEnricher {
    #[must_use]
    pub fn new(registry: Arc<RepositoryRegistry>, default_locale: impl Into<String>) -> Self {
        Self {
            registry,
            default_locale: default_locale.into(),
        }
    }

    fn repo<E: Entity>(&self) -> RepoResult<Arc<dyn Repository<E>>> {
        self.registry
            .get::<dyn Repository<E>>(E::NAME)
            .map_err(|e| RepoError::data_access(Course::NAME, Operation::Load, e))
    }

    async fn attach_instructors(&self, items: &mut [Course]) -> RepoResult<()> {
        let ids: BTreeSet<Uuid> = items.iter().map(|c| c.instructor_id).collect();
        let filter = FilterCondition::is_in(InstructorField::Id, ids)?;
        let found = self
            .repo::<Instructor>()?
            .find_many(&FindOptions::new().filter(filter))
            .await?;
        debug!(count = found.len(), "instructors loaded");

        let by_id: HashMap<Uuid, Instructor> = found.into_iter().map(|i| (i.base.id, i)).collect();
        for course in items {
            course.instructor = by_id.get(&course.instructor_id).cloned();
        }
        Ok(())
    }

    async fn attach_translations(&self, items: &mut [Course], load: &LoadOptions) -> RepoResult<()> {
        let ids: BTreeSet<Uuid> = items.iter().map(|c| c.base.id).collect();
        let filter = FilterCondition::is_in(CourseTranslationField::CourseId, ids)?;
        let rows = self
            .repo::<CourseTranslation>()?
            .find_many(&FindOptions::new().filter(filter))
            .await?;
        debug!(count = rows.len(), "course translations loaded");

        let mut by_course: HashMap<Uuid, Vec<CourseTranslation>> = HashMap::new();
        for row in rows {
            by_course.entry(row.course_id).or_default().push(row);
        }
        let fallback = Some(self.default_locale.as_str());
        for course in items {
            let rows = by_course.remove(&course.base.id).unwrap_or_default();
            course.set_translations(Translations::resolve(rows, load, fallback));
        }
        Ok(())
    }
}

#[async_trait]
impl Enricher<Course> for CourseEnricher {
    fn relations(&self) -> &[&'static str] {
        &[INSTRUCTOR_RELATION]
    }

    async fn enrich(&self, items: &mut [Course], load: &LoadOptions) -> RepoResult<()> {
        if load.wants(INSTRUCTOR_RELATION) {
            self.attach_instructors(items).await?;
        }
        if load.wants_translations() {
            self.attach_translations(items, load).await?;
        }
        Ok(())
    }
}
