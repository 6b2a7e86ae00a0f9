//! Trait definitions for external interactions
//!
//! These traits define the boundary between domain logic and storage.
//! Implementations live in other crates (`entrel-store`).

use crate::{Company, DomainError, EntityId, EntityKind, Person, RelationChange};
use std::collections::HashMap;

/// Read-only view of which ids are held by live entities
///
/// Handed to [`EntityRegistry::update_company`] closures so they can check
/// other entities under the same exclusive-access scope as the company.
pub trait EntityLookup {
    /// Kind of the live entity holding `id`, if any
    fn kind_of(&self, id: EntityId) -> Option<EntityKind>;
}

impl EntityLookup for HashMap<EntityId, EntityKind> {
    fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.get(&id).copied()
    }
}

/// Registry of persons and companies
///
/// Implementations must:
/// - reserve ids in one namespace shared by persons and companies
/// - make every mutation visible to the next read
/// - run each method, including cascades and `update_company` closures,
///   as one unit with respect to concurrent callers
///
/// Reads return owned records reflecting the state at the time of the call.
pub trait EntityRegistry {
    /// Error type for registry operations
    type Error: From<DomainError>;

    /// Register a new person
    fn create_person(&self, id: EntityId, name: &str) -> Result<Person, Self::Error>;

    /// Register a new company with all shares available
    fn create_company(&self, id: EntityId, name: &str) -> Result<Company, Self::Error>;

    /// Get a person by id
    fn get_person(&self, id: EntityId) -> Result<Option<Person>, Self::Error>;

    /// Get a company by id
    fn get_company(&self, id: EntityId) -> Result<Option<Company>, Self::Error>;

    /// All persons, ordered by id
    fn list_persons(&self) -> Result<Vec<Person>, Self::Error>;

    /// All companies, ordered by id
    fn list_companies(&self) -> Result<Vec<Company>, Self::Error>;

    /// Kind of the entity holding `id`, if any
    fn entity_kind(&self, id: EntityId) -> Result<Option<EntityKind>, Self::Error>;

    /// Rename a person
    fn update_person_name(&self, id: EntityId, name: &str) -> Result<Person, Self::Error>;

    /// Rename a company
    fn update_company_name(&self, id: EntityId, name: &str) -> Result<Company, Self::Error>;

    /// Delete a person and every relation that references them
    fn delete_person(&self, id: EntityId) -> Result<(), Self::Error>;

    /// Delete a company
    fn delete_company(&self, id: EntityId) -> Result<(), Self::Error>;

    /// Relate two existing persons
    ///
    /// `changed` is `false` if they already were. The returned persons are
    /// read under the same exclusive-access scope as the edit.
    fn establish_relation(&self, a: EntityId, b: EntityId) -> Result<RelationChange, Self::Error>;

    /// Unrelate two existing persons
    ///
    /// `changed` is `false` if they were not related. Persons as in
    /// [`EntityRegistry::establish_relation`].
    fn dissolve_relation(&self, a: EntityId, b: EntityId) -> Result<RelationChange, Self::Error>;

    /// Run `f` against a company with exclusive access
    ///
    /// No other mutation of the registry can interleave with `f`, so a
    /// read-check-write sequence inside it is atomic, including checks made
    /// through the [`EntityLookup`] it receives. If `f` fails, the company
    /// must be left as `f` found it.
    fn update_company<T, F>(&self, id: EntityId, f: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Company, &dyn EntityLookup) -> Result<T, DomainError>;
}
