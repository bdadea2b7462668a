use std::fmt;
use std::hash::Hash;

/// Storage type of a filterable field. Drives value validation and coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
    /// JSON array of strings (`jsonb` on Postgres, JSON text on SQLite).
    StringArray,
}

impl FieldKind {
    /// Whether `gt`/`lt`/`between` make sense for this kind.
    #[must_use]
    pub fn is_orderable(self) -> bool {
        !matches!(self, FieldKind::Bool | FieldKind::StringArray)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::String => "String",
            FieldKind::I64 => "I64",
            FieldKind::F64 => "F64",
            FieldKind::Bool => "Bool",
            FieldKind::Uuid => "Uuid",
            FieldKind::DateTimeUtc => "DateTimeUtc",
            FieldKind::Date => "Date",
            FieldKind::StringArray => "StringArray",
        };
        f.write_str(s)
    }
}

/// The closed set of columns an entity exposes to filters and sorts.
///
/// Implemented by a plain enum per entity, usually through
/// [`entity_fields!`](crate::entity_fields). `name` is the wire name
/// (camelCase, as it appears in filter JSON).
pub trait EntityField: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    const FIELDS: &'static [Self];

    fn name(&self) -> &'static str;

    fn kind(&self) -> FieldKind;

    fn from_name(name: &str) -> Option<Self> {
        Self::FIELDS
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    fn is_id(&self) -> bool {
        self.name() == "id"
    }
}

/// Declares a field enum and its [`EntityField`] impl.
///
/// ```
/// repokit_query::entity_fields! {
///     pub enum PetField {
///         Id => ("id", Uuid),
///         Name => ("name", String),
///     }
/// }
/// use repokit_query::EntityField;
/// assert_eq!(PetField::from_name("NAME"), Some(PetField::Name));
/// ```
#[macro_export]
macro_rules! entity_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => ($wire:literal, $kind:ident) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $variant ),+
        }

        impl $crate::EntityField for $name {
            const FIELDS: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }

            fn kind(&self) -> $crate::FieldKind {
                match self {
                    $( $name::$variant => $crate::FieldKind::$kind ),+
                }
            }
        }
    };
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    crate::entity_fields! {
        enum TestField {
            Id => ("id", Uuid),
            DisplayName => ("displayName", String),
            Tags => ("tags", StringArray),
        }
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(TestField::from_name("displayname"), Some(TestField::DisplayName));
        assert_eq!(TestField::from_name("ID"), Some(TestField::Id));
        assert_eq!(TestField::from_name("display_name"), None);
    }

    #[test]
    fn id_detection_uses_wire_name() {
        assert!(TestField::Id.is_id());
        assert!(!TestField::DisplayName.is_id());
    }

    #[test]
    fn orderable_kinds() {
        assert!(FieldKind::DateTimeUtc.is_orderable());
        assert!(!FieldKind::Bool.is_orderable());
        assert_eq!(TestField::Tags.kind().to_string(), "StringArray");
    }
}
