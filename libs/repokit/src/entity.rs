use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repokit_query::EntityField;

/// Identity and timestamps shared by every persisted entity.
///
/// `id` and `created_at` never change after construction. `updated_at` only
/// moves forward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEntity {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaseEntity {
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds identity from stored values.
    #[must_use]
    pub fn restore(id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            updated_at,
        }
    }

    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

impl Default for BaseEntity {
    fn default() -> Self {
        Self::new()
    }
}

/// A domain entity a [`Repository`](crate::Repository) can store.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Lower-case entity name; doubles as the registry key.
    const NAME: &'static str;

    type Field: EntityField;

    fn base(&self) -> &BaseEntity;

    fn base_mut(&mut self) -> &mut BaseEntity;

    fn id(&self) -> Uuid {
        self.base().id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.base().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.base().updated_at
    }

    fn touch(&mut self) {
        self.base_mut().touch();
    }
}
