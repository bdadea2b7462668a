//! Partial updates that tell "leave alone" apart from "clear".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Change to one nullable field.
///
/// In JSON a missing key is `Unchanged` (needs `#[serde(default)]` on the
/// field), `null` is `Clear` and any other value is `Set`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Unchanged => {}
            Patch::Clear => *target = None,
            Patch::Set(v) => *target = Some(v),
        }
    }

    /// `None` = unchanged, `Some(None)` = clear.
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Unchanged => None,
            Patch::Clear => Some(None),
            Patch::Set(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Unchanged | Patch::Clear => serializer.serialize_none(),
            Patch::Set(v) => serializer.serialize_some(v),
        }
    }
}

/// Applies a patch struct to an entity. Fields absent from the patch are left as they are.
pub trait ApplyPatch<E>: Send {
    fn apply(self, entity: &mut E);
}
