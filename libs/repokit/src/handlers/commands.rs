use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{Operation, RepoError, RepoResult};
use crate::options::LoadOptions;
use crate::patch::ApplyPatch;
use crate::repository::Repository;

#[derive(Clone, Debug)]
pub struct CreateCommand<E> {
    pub entity: E,
}

pub struct CreateHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for CreateHandler<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> CreateHandler<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// [`RepoError::Conflict`] when the id is already taken, plus repository errors.
    #[instrument(skip_all, fields(entity = E::NAME, id = %cmd.entity.id()))]
    pub async fn execute(&self, cmd: CreateCommand<E>) -> RepoResult<E> {
        let id = cmd.entity.id();
        if self.repo.exists(id).await? {
            return Err(RepoError::conflict(
                E::NAME,
                Operation::Insert,
                format!("id {id} already exists"),
            ));
        }
        let saved = self.repo.save(cmd.entity).await?;
        info!("created");
        Ok(saved)
    }
}

#[derive(Clone, Debug)]
pub struct UpdateCommand<P> {
    pub id: Uuid,
    pub patch: P,
}

pub struct UpdateHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for UpdateHandler<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> UpdateHandler<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// Loads, applies only the fields present in the patch, saves.
    ///
    /// # Errors
    ///
    /// [`RepoError::NotFound`] for an unknown id, plus repository errors.
    #[instrument(skip_all, fields(entity = E::NAME, id = %cmd.id))]
    pub async fn execute<P: ApplyPatch<E>>(&self, cmd: UpdateCommand<P>) -> RepoResult<E> {
        let mut entity = self
            .repo
            .find_by_id(cmd.id, &LoadOptions::default())
            .await?
            .ok_or_else(|| RepoError::not_found(E::NAME, cmd.id))?;
        cmd.patch.apply(&mut entity);
        let saved = self.repo.save(entity).await?;
        info!("updated");
        Ok(saved)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DeleteCommand {
    pub id: Uuid,
}

pub struct DeleteHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for DeleteHandler<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<E: Entity> DeleteHandler<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    /// Unlike [`Repository::delete`], a missing id is an error here.
    ///
    /// # Errors
    ///
    /// [`RepoError::NotFound`] for an unknown id; [`RepoError::Conflict`]
    /// when the row is still referenced.
    #[instrument(skip_all, fields(entity = E::NAME, id = %cmd.id))]
    pub async fn execute(&self, cmd: DeleteCommand) -> RepoResult<()> {
        if !self.repo.exists(cmd.id).await? {
            return Err(RepoError::not_found(E::NAME, cmd.id));
        }
        self.repo.delete(cmd.id).await?;
        info!("deleted");
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::entity::BaseEntity;
    use crate::handlers::test_repo::{Call, Note, NotePatch, RecordingRepo};
    use crate::patch::Patch;

    #[tokio::test]
    async fn create_rejects_taken_id() {
        let repo = Arc::new(RecordingRepo::default());
        let existing = repo.seed("taken");
        let handler = CreateHandler::<Note>::new(repo.clone());

        let err = handler
            .execute(CreateCommand { entity: existing })
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let fresh = Note {
            base: BaseEntity::new(),
            text: "fresh".to_owned(),
            tag: None,
        };
        let created = handler.execute(CreateCommand { entity: fresh.clone() }).await.unwrap();
        assert_eq!(created.text, "fresh");
        assert!(repo.row(fresh.base.id).is_some());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let repo = Arc::new(RecordingRepo::default());
        let note = repo.seed("before");
        let handler = UpdateHandler::<Note>::new(repo.clone());

        let updated = handler
            .execute(UpdateCommand {
                id: note.base.id,
                patch: NotePatch {
                    text: None,
                    tag: Patch::Clear,
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.text, "before");
        assert_eq!(updated.tag, None);
        assert!(updated.base.updated_at > note.base.updated_at);
        assert_eq!(updated.base.created_at, note.base.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let repo = Arc::new(RecordingRepo::default());
        let handler = UpdateHandler::<Note>::new(repo.clone());

        let err = handler
            .execute(UpdateCommand {
                id: Uuid::new_v4(),
                patch: NotePatch::default(),
            })
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!repo.calls().iter().any(|c| matches!(c, Call::Save(_))));
    }

    #[tokio::test]
    async fn delete_checks_existence_first() {
        let repo = Arc::new(RecordingRepo::default());
        let note = repo.seed("doomed");
        let handler = DeleteHandler::<Note>::new(repo.clone());

        handler.execute(DeleteCommand { id: note.base.id }).await.unwrap();
        assert!(repo.row(note.base.id).is_none());

        let err = handler.execute(DeleteCommand { id: note.base.id }).await.unwrap_err();
        assert!(err.is_not_found());
        let deletes = repo.calls().iter().filter(|c| matches!(c, Call::Delete(_))).count();
        assert_eq!(deletes, 1);
    }
}
