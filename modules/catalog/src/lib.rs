//! Dance-course catalog.
//!
//! Instructors, courses and per-locale course texts stored through
//! [`repokit_db::SeaRepository`]. [`CatalogModule::init`] builds the
//! repositories, registers them by entity name and hands back one
//! [`repokit::handlers::EntityHandlers`] bundle per entity.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::CatalogConfig;
pub use contract::model::{
    Course, CourseField, CourseLevel, CourseTranslation, CourseTranslationField, Instructor,
    InstructorField,
};
pub use domain::patch::{CoursePatch, InstructorPatch};
pub use module::{CatalogModule, CatalogServices};
