//! Subcommand bodies. Each returns the JSON document printed on stdout.

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tracing::info;

use catalog::api::dto::{CourseDto, InstructorDto};
use catalog::{
    CatalogServices, Course, CourseField, CourseLevel, CourseTranslation, Instructor,
    InstructorField,
};
use repokit::handlers::{CreateCommand, GetByFieldQuery, GetPaginatedQuery};
use repokit::query::{
    EntityField, FilterValue, ListQuery, QueryLimits, cache_key, create_canonical_json, fingerprint,
};
use repokit::{FindOptions, LoadOptions};

const CACHE_KEY_PREFIX: &str = "list";

pub async fn list_instructors(
    services: &CatalogServices,
    limits: &QueryLimits,
    qs: &str,
) -> Result<Value> {
    let query = ListQuery::<InstructorField>::from_query_string(qs, limits)
        .context("invalid instructor list query")?;
    let (request, options) = FindOptions::from_list_query(query, LoadOptions::default());
    let page = services
        .instructors
        .get_paginated
        .execute(GetPaginatedQuery { request, options })
        .await?;
    Ok(serde_json::to_value(page.map(InstructorDto::from))?)
}

/// `value` is read as JSON when it parses, otherwise as a plain string.
pub async fn get_instructor(services: &CatalogServices, field: &str, value: &str) -> Result<Value> {
    let Some(field) = InstructorField::from_name(field) else {
        let known: Vec<&str> = InstructorField::FIELDS.iter().map(EntityField::name).collect();
        bail!("unknown instructor field '{field}', expected one of: {}", known.join(", "));
    };
    let value = serde_json::from_str::<FilterValue>(value).unwrap_or_else(|_| FilterValue::from(value));

    let found = services
        .instructors
        .get_by_field
        .execute(GetByFieldQuery::new(field, value))
        .await?;
    Ok(serde_json::to_value(found.map(InstructorDto::from))?)
}

#[derive(Clone, Copy)]
pub struct CourseListArgs<'a> {
    pub query: &'a str,
    pub locale: Option<&'a str>,
    pub all_translations: bool,
    pub with: &'a [String],
}

pub async fn list_courses(
    services: &CatalogServices,
    limits: &QueryLimits,
    args: CourseListArgs<'_>,
) -> Result<Value> {
    let query = ListQuery::<CourseField>::from_query_string(args.query, limits)
        .context("invalid course list query")?;
    let load = LoadOptions {
        with: args.with.to_vec(),
        locale: args.locale.map(ToOwned::to_owned),
        include_all_translations: args.all_translations,
    };
    let (request, options) = FindOptions::from_list_query(query, load);
    let page = services
        .courses
        .get_paginated
        .execute(GetPaginatedQuery { request, options })
        .await?;
    Ok(serde_json::to_value(
        page.map(|c| CourseDto::from_course(c, args.locale)),
    )?)
}

pub fn cache_key_for(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("cache-key input is not JSON")?;
    Ok(json!({
        "canonical": create_canonical_json(&value)?,
        "key": cache_key(CACHE_KEY_PREFIX, &value)?,
        "fingerprint": fingerprint(&value)?,
    }))
}

struct DemoCourse {
    level: CourseLevel,
    price_cents: i64,
    tags: &'static [&'static str],
    texts: &'static [(&'static str, &'static str)],
}

const DEMO: &[(&str, &str, &[DemoCourse])] = &[
    (
        "Alice",
        "Cuban salsa and rueda",
        &[
            DemoCourse {
                level: CourseLevel::Beginner,
                price_cents: 1500,
                tags: &["salsa", "beginner"],
                texts: &[("en", "Salsa basics"), ("es", "Salsa basica")],
            },
            DemoCourse {
                level: CourseLevel::Advanced,
                price_cents: 2500,
                tags: &["salsa", "advanced"],
                texts: &[("en", "Salsa on2")],
            },
        ],
    ),
    (
        "Bob",
        "Bachata sensual",
        &[DemoCourse {
            level: CourseLevel::Intermediate,
            price_cents: 2000,
            tags: &["bachata"],
            texts: &[("es", "Bachata fluida")],
        }],
    ),
    ("Charlie", "Kizomba and urban kiz", &[]),
];

/// Inserts a small fixed data set. Running it twice adds a second copy.
pub async fn seed_demo(services: &CatalogServices) -> Result<Value> {
    let mut instructors = 0_u32;
    let mut courses = 0_u32;
    let mut texts = 0_u32;

    for (name, bio, demo_courses) in DEMO {
        let instructor = services
            .instructors
            .create
            .execute(CreateCommand {
                entity: Instructor::new(*name).with_bio(*bio),
            })
            .await?;
        instructors += 1;

        for (n, demo) in demo_courses.iter().enumerate() {
            let days = i64::try_from(n).unwrap_or(0);
            let course = Course::new(instructor.base.id, demo.level, demo.price_cents)
                .with_tags(demo.tags.iter().copied())
                .published(Utc::now() - Duration::days(days));
            let course = services
                .courses
                .create
                .execute(CreateCommand { entity: course })
                .await?;
            courses += 1;

            for (locale, title) in demo.texts {
                services
                    .course_translations
                    .create
                    .execute(CreateCommand {
                        entity: CourseTranslation::new(course.base.id, *locale, *title),
                    })
                    .await?;
                texts += 1;
            }
        }
    }

    info!(instructors, courses, texts, "demo data seeded");
    Ok(json!({ "instructors": instructors, "courses": courses, "translations": texts }))
}
