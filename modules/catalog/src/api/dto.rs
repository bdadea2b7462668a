//! Response shapes. Only the fields listed here leave the service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use repokit::Translatable;

use crate::contract::model::{Course, CourseLevel, CourseTranslation, Instructor};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDto {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Instructor> for InstructorDto {
    fn from(i: Instructor) -> Self {
        Self {
            id: i.base.id,
            name: i.name,
            bio: i.bio,
            created_at: i.base.created_at,
            updated_at: i.base.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTranslationDto {
    pub locale: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&CourseTranslation> for CourseTranslationDto {
    fn from(t: &CourseTranslation) -> Self {
        Self {
            locale: t.locale.clone(),
            title: t.title.clone(),
            description: t.description.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub level: CourseLevel,
    pub price_cents: i64,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Locale of `title`/`description`; differs from the requested one on fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<CourseTranslationDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<InstructorDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseDto {
    /// Texts come from the row for `locale` if one was loaded, else from the
    /// resolved row. Missing texts are left out.
    #[must_use]
    pub fn from_course(course: Course, locale: Option<&str>) -> Self {
        let text = locale
            .and_then(|l| course.get_translation(l))
            .or(course.i18n.translation.as_ref())
            .map(CourseTranslationDto::from);
        let translations = course
            .i18n
            .translations
            .as_ref()
            .map(|rows| rows.iter().map(CourseTranslationDto::from).collect());

        Self {
            id: course.base.id,
            instructor_id: course.instructor_id,
            level: course.level,
            price_cents: course.price_cents,
            tags: course.tags,
            published_at: course.published_at,
            locale: text.as_ref().map(|t| t.locale.clone()),
            title: text.as_ref().map(|t| t.title.clone()),
            description: text.and_then(|t| t.description),
            translations,
            instructor: course.instructor.map(InstructorDto::from),
            created_at: course.base.created_at,
            updated_at: course.base.updated_at,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use repokit::Translations;

    fn course() -> Course {
        Course::new(Uuid::new_v4(), CourseLevel::Beginner, 1500).with_tags(["salsa"])
    }

    #[test]
    fn untranslated_course_omits_texts() {
        let json = serde_json::to_value(CourseDto::from_course(course(), Some("es"))).unwrap();
        assert!(json.get("title").is_none());
        assert!(json.get("description").is_none());
        assert!(json.get("translations").is_none());
        assert_eq!(json["level"], "beginner");
        assert_eq!(json["priceCents"], 1500);
    }

    #[test]
    fn requested_locale_wins_over_resolved_row() {
        let mut c = course();
        let id = c.base.id;
        c.i18n = Translations::all(vec![
            CourseTranslation::new(id, "en", "Salsa basics"),
            CourseTranslation::new(id, "es", "Salsa basica").with_description("Primeros pasos"),
        ]);
        let dto = CourseDto::from_course(c, Some("es"));
        assert_eq!(dto.title.as_deref(), Some("Salsa basica"));
        assert_eq!(dto.description.as_deref(), Some("Primeros pasos"));
        assert_eq!(dto.translations.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn fallback_row_reports_its_own_locale() {
        let mut c = course();
        let id = c.base.id;
        c.i18n = Translations::resolved(Some(CourseTranslation::new(id, "en", "Salsa basics")));
        let dto = CourseDto::from_course(c, Some("fr"));
        assert_eq!(dto.title.as_deref(), Some("Salsa basics"));
        assert_eq!(dto.locale.as_deref(), Some("en"));
    }

    #[test]
    fn instructor_dto_hides_nothing_it_lists() {
        let dto = InstructorDto::from(Instructor::new("Ana"));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["name"], "Ana");
        assert!(json.get("bio").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
