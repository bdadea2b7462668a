//! Row to domain mappings.

use sea_orm::ActiveValue::Set;

use repokit::{BaseEntity, Entity, Operation, RepoError, RepoResult, Translations};
use repokit_db::EntityMapping;

use super::entity::{course, course_translation, instructor};
use crate::contract::model::{
    Course, CourseField, CourseLevel, CourseTranslation, CourseTranslationField, Instructor,
    InstructorField,
};

pub struct InstructorMapping;

impl EntityMapping for InstructorMapping {
    type Entity = instructor::Entity;
    type Model = instructor::Model;
    type ActiveModel = instructor::ActiveModel;
    type Column = instructor::Column;
    type Domain = Instructor;

    fn column(field: InstructorField) -> instructor::Column {
        match field {
            InstructorField::Id => instructor::Column::Id,
            InstructorField::Name => instructor::Column::Name,
            InstructorField::Bio => instructor::Column::Bio,
            InstructorField::CreatedAt => instructor::Column::CreatedAt,
        }
    }

    fn id_column() -> instructor::Column {
        instructor::Column::Id
    }

    fn to_domain(m: instructor::Model) -> RepoResult<Instructor> {
        Ok(Instructor {
            base: BaseEntity::restore(m.id, m.created_at, m.updated_at),
            name: m.name,
            bio: m.bio,
        })
    }

    fn to_schema(i: &Instructor) -> instructor::ActiveModel {
        instructor::ActiveModel {
            id: Set(i.base.id),
            name: Set(i.name.clone()),
            bio: Set(i.bio.clone()),
            created_at: Set(i.base.created_at),
            updated_at: Set(i.base.updated_at),
        }
    }
}

pub struct CourseMapping;

impl EntityMapping for CourseMapping {
    type Entity = course::Entity;
    type Model = course::Model;
    type ActiveModel = course::ActiveModel;
    type Column = course::Column;
    type Domain = Course;

    fn column(field: CourseField) -> course::Column {
        match field {
            CourseField::Id => course::Column::Id,
            CourseField::InstructorId => course::Column::InstructorId,
            CourseField::Level => course::Column::Level,
            CourseField::PriceCents => course::Column::PriceCents,
            CourseField::Tags => course::Column::Tags,
            CourseField::PublishedAt => course::Column::PublishedAt,
            CourseField::CreatedAt => course::Column::CreatedAt,
        }
    }

    fn id_column() -> course::Column {
        course::Column::Id
    }

    fn to_domain(m: course::Model) -> RepoResult<Course> {
        let level = m
            .level
            .parse::<CourseLevel>()
            .map_err(|e| RepoError::data_access(Course::NAME, Operation::Load, e))?;
        let tags = serde_json::from_value(m.tags)
            .map_err(|e| RepoError::data_access(Course::NAME, Operation::Load, e))?;
        Ok(Course {
            base: BaseEntity::restore(m.id, m.created_at, m.updated_at),
            instructor_id: m.instructor_id,
            level,
            price_cents: m.price_cents,
            tags,
            published_at: m.published_at,
            i18n: Translations::default(),
            instructor: None,
        })
    }

    fn to_schema(c: &Course) -> course::ActiveModel {
        course::ActiveModel {
            id: Set(c.base.id),
            instructor_id: Set(c.instructor_id),
            level: Set(c.level.as_str().to_owned()),
            price_cents: Set(c.price_cents),
            tags: Set(serde_json::json!(c.tags)),
            published_at: Set(c.published_at),
            created_at: Set(c.base.created_at),
            updated_at: Set(c.base.updated_at),
        }
    }
}

pub struct CourseTranslationMapping;

impl EntityMapping for CourseTranslationMapping {
    type Entity = course_translation::Entity;
    type Model = course_translation::Model;
    type ActiveModel = course_translation::ActiveModel;
    type Column = course_translation::Column;
    type Domain = CourseTranslation;

    fn column(field: CourseTranslationField) -> course_translation::Column {
        match field {
            CourseTranslationField::Id => course_translation::Column::Id,
            CourseTranslationField::CourseId => course_translation::Column::CourseId,
            CourseTranslationField::Locale => course_translation::Column::Locale,
            CourseTranslationField::Title => course_translation::Column::Title,
        }
    }

    fn id_column() -> course_translation::Column {
        course_translation::Column::Id
    }

    fn to_domain(m: course_translation::Model) -> RepoResult<CourseTranslation> {
        Ok(CourseTranslation {
            base: BaseEntity::restore(m.id, m.created_at, m.updated_at),
            course_id: m.course_id,
            locale: m.locale,
            title: m.title,
            description: m.description,
        })
    }

    fn to_schema(t: &CourseTranslation) -> course_translation::ActiveModel {
        course_translation::ActiveModel {
            id: Set(t.base.id),
            course_id: Set(t.course_id),
            locale: Set(t.locale.clone()),
            title: Set(t.title.clone()),
            description: Set(t.description.clone()),
            created_at: Set(t.base.created_at),
            updated_at: Set(t.base.updated_at),
        }
    }
}
