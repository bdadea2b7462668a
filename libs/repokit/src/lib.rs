//! Generic repository layer.
//!
//! - [`Entity`] / [`BaseEntity`]: identity and touch-on-write timestamps.
//! - [`Repository`]: the six storage operations every entity supports.
//! - [`RepositoryRegistry`]: explicit container resolving repositories by
//!   entity name, used for relation loading across entity boundaries.
//! - [`handlers`]: query and command handlers parameterized over the entity.
//! - [`translation`]: locale-specific child rows attached after load.
//! - [`progress`]: per-user fan-out of upload progress events.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod entity;
pub mod error;
pub mod handlers;
pub mod options;
pub mod patch;
pub mod progress;
pub mod registry;
pub mod repository;
pub mod translation;

#[cfg(feature = "bootstrap")]
pub mod bootstrap;

pub use entity::{BaseEntity, Entity};
pub use error::{Operation, RepoError, RepoResult};
pub use options::{FindOptions, LoadOptions};
pub use patch::{ApplyPatch, Patch};
pub use registry::{RegistryError, RepositoryRegistry};
pub use repository::Repository;
pub use translation::{Translatable, TranslationLookup, TranslationRow, Translations};

pub use repokit_query as query;
