//! Catalog domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repokit::query::entity_fields;
use repokit::{BaseEntity, Entity, Translatable, TranslationRow, Translations};

entity_fields! {
    pub enum InstructorField {
        Id => ("id", Uuid),
        Name => ("name", String),
        Bio => ("bio", String),
        CreatedAt => ("createdAt", DateTimeUtc),
    }
}

entity_fields! {
    pub enum CourseField {
        Id => ("id", Uuid),
        InstructorId => ("instructorId", Uuid),
        Level => ("level", String),
        PriceCents => ("priceCents", I64),
        Tags => ("tags", StringArray),
        PublishedAt => ("publishedAt", DateTimeUtc),
        CreatedAt => ("createdAt", DateTimeUtc),
    }
}

entity_fields! {
    pub enum CourseTranslationField {
        Id => ("id", Uuid),
        CourseId => ("courseId", Uuid),
        Locale => ("locale", String),
        Title => ("title", String),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instructor {
    pub base: BaseEntity,
    pub name: String,
    pub bio: Option<String>,
}

impl Instructor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseEntity::new(),
            name: name.into(),
            bio: None,
        }
    }

    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }
}

impl Entity for Instructor {
    const NAME: &'static str = "instructor";
    type Field = InstructorField;

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown course level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for CourseLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            other => Err(UnknownLevel(other.to_owned())),
        }
    }
}

/// Title and description of a course in one locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseTranslation {
    pub base: BaseEntity,
    pub course_id: Uuid,
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
}

impl CourseTranslation {
    #[must_use]
    pub fn new(course_id: Uuid, locale: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            base: BaseEntity::new(),
            course_id,
            locale: locale.into(),
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for CourseTranslation {
    const NAME: &'static str = "course_translation";
    type Field = CourseTranslationField;

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }
}

impl TranslationRow for CourseTranslation {
    fn locale(&self) -> &str {
        &self.locale
    }
}

/// A course offered by one instructor.
///
/// `i18n` and `instructor` are filled only when requested through
/// [`repokit::LoadOptions`]; they are never written back on save.
#[derive(Clone, Debug, PartialEq)]
pub struct Course {
    pub base: BaseEntity,
    pub instructor_id: Uuid,
    pub level: CourseLevel,
    pub price_cents: i64,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub i18n: Translations<CourseTranslation>,
    pub instructor: Option<Instructor>,
}

impl Course {
    #[must_use]
    pub fn new(instructor_id: Uuid, level: CourseLevel, price_cents: i64) -> Self {
        Self {
            base: BaseEntity::new(),
            instructor_id,
            level,
            price_cents,
            tags: Vec::new(),
            published_at: None,
            i18n: Translations::default(),
            instructor: None,
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }
}

impl Entity for Course {
    const NAME: &'static str = "course";
    type Field = CourseField;

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }
}

impl Translatable for Course {
    type Translation = CourseTranslation;

    fn translations(&self) -> &Translations<CourseTranslation> {
        &self.i18n
    }

    fn set_translations(&mut self, translations: Translations<CourseTranslation>) {
        self.i18n = translations;
    }
}
