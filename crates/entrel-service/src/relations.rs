//! Relating and unrelating persons

use crate::error::OwnershipError;
use entrel_domain::traits::EntityRegistry;
use entrel_domain::{DomainError, EntityId, RelationChange};
use std::sync::Arc;

/// Relation edits between existing persons
pub struct RelationService<R> {
    registry: Arc<R>,
}

impl<R> Clone for RelationService<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<R> RelationService<R>
where
    R: EntityRegistry,
    OwnershipError: From<R::Error>,
{
    /// Create a service over a shared registry
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Relate two persons
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] naming the first missing person, or
    /// [`DomainError::SelfRelation`] if `a == b`.
    pub fn establish(&self, a: EntityId, b: EntityId) -> Result<RelationChange, OwnershipError> {
        self.require_persons(a, b)?;
        Ok(self.registry.establish_relation(a, b)?)
    }

    /// Remove the relation between two persons
    ///
    /// Errors as in [`RelationService::establish`].
    pub fn dissolve(&self, a: EntityId, b: EntityId) -> Result<RelationChange, OwnershipError> {
        self.require_persons(a, b)?;
        Ok(self.registry.dissolve_relation(a, b)?)
    }

    fn require_persons(&self, a: EntityId, b: EntityId) -> Result<(), OwnershipError> {
        for id in [a, b] {
            if self.registry.get_person(id)?.is_none() {
                return Err(DomainError::person_not_found(id).into());
            }
        }
        Ok(())
    }
}
