//! Recording repository for handler tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use repokit_query::{PaginatedRequest, PaginatedResponse};

use crate::entity::{BaseEntity, Entity};
use crate::error::RepoResult;
use crate::options::{FindOptions, LoadOptions};
use crate::patch::{ApplyPatch, Patch};
use crate::repository::Repository;

repokit_query::entity_fields! {
    pub enum NoteField {
        Id => ("id", Uuid),
        Text => ("text", String),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub base: BaseEntity,
    pub text: String,
    pub tag: Option<String>,
}

impl Entity for Note {
    const NAME: &'static str = "note";
    type Field = NoteField;

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }
}

#[derive(Default)]
pub struct NotePatch {
    pub text: Option<String>,
    pub tag: Patch<String>,
}

impl ApplyPatch<Note> for NotePatch {
    fn apply(self, note: &mut Note) {
        if let Some(text) = self.text {
            note.text = text;
        }
        self.tag.apply_to(&mut note.tag);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    FindById(Uuid, LoadOptions),
    FindOne(FindOptions<NoteField>),
    FindMany(FindOptions<NoteField>),
    Paginate(PaginatedRequest, FindOptions<NoteField>),
    Save(Uuid),
    Delete(Uuid),
}

#[derive(Default)]
pub struct RecordingRepo {
    calls: Mutex<Vec<Call>>,
    rows: Mutex<HashMap<Uuid, Note>>,
}

impl RecordingRepo {
    pub fn seed(&self, text: &str) -> Note {
        let note = Note {
            base: BaseEntity::new(),
            text: text.to_owned(),
            tag: Some("draft".to_owned()),
        };
        self.rows.lock().insert(note.base.id, note.clone());
        note
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn row(&self, id: Uuid) -> Option<Note> {
        self.rows.lock().get(&id).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Repository<Note> for RecordingRepo {
    async fn find_by_id(&self, id: Uuid, load: &LoadOptions) -> RepoResult<Option<Note>> {
        self.record(Call::FindById(id, load.clone()));
        Ok(self.row(id))
    }

    async fn find_one(&self, options: &FindOptions<NoteField>) -> RepoResult<Option<Note>> {
        self.record(Call::FindOne(options.clone()));
        Ok(None)
    }

    async fn find_many(&self, options: &FindOptions<NoteField>) -> RepoResult<Vec<Note>> {
        self.record(Call::FindMany(options.clone()));
        Ok(Vec::new())
    }

    async fn paginate(
        &self,
        request: &PaginatedRequest,
        options: &FindOptions<NoteField>,
    ) -> RepoResult<PaginatedResponse<Note>> {
        self.record(Call::Paginate(*request, options.clone()));
        Ok(PaginatedResponse::empty(*request))
    }

    async fn save(&self, mut entity: Note) -> RepoResult<Note> {
        self.record(Call::Save(entity.id()));
        entity.touch();
        self.rows.lock().insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.record(Call::Delete(id));
        self.rows.lock().remove(&id);
        Ok(())
    }
}
