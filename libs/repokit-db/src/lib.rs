//! sea-orm implementation of the [`repokit::Repository`] contract.
//!
//! A concrete repository is a [`SeaRepository`] over an [`EntityMapping`],
//! which supplies the row/domain conversions and the field-to-column map.
//! Filter trees and sorts compile to `sea_orm::Condition` and `ORDER BY`
//! clauses through [`filter_to_condition`] and [`apply_sort`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod repository;
pub mod sort;

pub use config::{DbConfig, DbError, connect};
pub use error::classify;
pub use filter::filter_to_condition;
pub use mapping::EntityMapping;
pub use repository::{Enricher, SeaRepository};
pub use sort::{apply_sort, apply_sort_with_tiebreaker};

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test_entity;
