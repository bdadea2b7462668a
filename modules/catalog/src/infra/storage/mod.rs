//! sea-orm storage for the catalog.

pub mod entity;
pub mod mapper;
pub mod migrations;
