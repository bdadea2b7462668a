//! Generic handlers, one per query or command shape.
//!
//! Read handlers forward to the repository unchanged. Write handlers add an
//! existence check in front of the repository call.

mod commands;
mod queries;

use std::sync::Arc;

pub use commands::{
    CreateCommand, CreateHandler, DeleteCommand, DeleteHandler, UpdateCommand, UpdateHandler,
};
pub use queries::{
    FindManyHandler, FindManyQuery, GetByFieldHandler, GetByFieldQuery, GetPaginatedHandler,
    GetPaginatedQuery,
};

use crate::entity::Entity;
use crate::repository::Repository;

/// Every handler for one entity, sharing one repository.
pub struct EntityHandlers<E: Entity> {
    pub get_by_field: GetByFieldHandler<E>,
    pub find_many: FindManyHandler<E>,
    pub get_paginated: GetPaginatedHandler<E>,
    pub create: CreateHandler<E>,
    pub update: UpdateHandler<E>,
    pub delete: DeleteHandler<E>,
}

impl<E: Entity> EntityHandlers<E> {
    pub fn new(repo: &Arc<dyn Repository<E>>) -> Self {
        Self {
            get_by_field: GetByFieldHandler::new(Arc::clone(repo)),
            find_many: FindManyHandler::new(Arc::clone(repo)),
            get_paginated: GetPaginatedHandler::new(Arc::clone(repo)),
            create: CreateHandler::new(Arc::clone(repo)),
            update: UpdateHandler::new(Arc::clone(repo)),
            delete: DeleteHandler::new(Arc::clone(repo)),
        }
    }
}

impl<E: Entity> Clone for EntityHandlers<E> {
    fn clone(&self) -> Self {
        Self {
            get_by_field: self.get_by_field.clone(),
            find_many: self.find_many.clone(),
            get_paginated: self.get_paginated.clone(),
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test_repo;
