//! Instructors, courses and course translations.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Instructors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Instructors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Instructors::Name).text().not_null())
                    .col(ColumnDef::new(Instructors::Bio).text())
                    .col(
                        ColumnDef::new(Instructors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Instructors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_instructors_name")
                    .table(Instructors::Table)
                    .col(Instructors::Name)
                    .to_owned(),
            )
            .await?;

        // Instructors with courses cannot be removed.
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::InstructorId).uuid().not_null())
                    .col(ColumnDef::new(Courses::Level).text().not_null())
                    .col(ColumnDef::new(Courses::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Courses::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Courses::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_instructor")
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Instructors::Table, Instructors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_instructor")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CourseTranslations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseTranslations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseTranslations::CourseId).uuid().not_null())
                    .col(ColumnDef::new(CourseTranslations::Locale).text().not_null())
                    .col(ColumnDef::new(CourseTranslations::Title).text().not_null())
                    .col(ColumnDef::new(CourseTranslations::Description).text())
                    .col(
                        ColumnDef::new(CourseTranslations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseTranslations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_translations_course")
                            .from(CourseTranslations::Table, CourseTranslations::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per course and locale
        manager
            .create_index(
                Index::create()
                    .name("uq_course_translations_course_locale")
                    .table(CourseTranslations::Table)
                    .col(CourseTranslations::CourseId)
                    .col(CourseTranslations::Locale)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseTranslations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Instructors::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Instructors {
    Table,
    Id,
    Name,
    Bio,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    InstructorId,
    Level,
    PriceCents,
    Tags,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CourseTranslations {
    Table,
    Id,
    CourseId,
    Locale,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}
