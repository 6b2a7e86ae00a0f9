//! In-process registry of persons and companies.

use crate::StoreError;
use entrel_domain::traits::{EntityLookup, EntityRegistry};
use entrel_domain::{
    ledger, Company, DomainError, EntityId, EntityKind, Person, RelationChange, RelationGraph,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// What happens to an entity's stakes in other companies when it is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipRetention {
    /// Leave other ledgers untouched; the stake stays recorded under the old id
    #[default]
    Retain,
    /// Remove the deleted id from every ledger and return its stakes to the pool
    Release,
}

/// Record counts, for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of persons
    pub persons: usize,
    /// Number of companies
    pub companies: usize,
    /// Number of person-to-person relations
    pub relations: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    /// Every reserved id, persons and companies alike
    pub(crate) ids: HashMap<EntityId, EntityKind>,
    pub(crate) person_names: HashMap<EntityId, String>,
    pub(crate) graph: RelationGraph,
    pub(crate) companies: HashMap<EntityId, Company>,
}

impl Tables {
    fn reserve(&mut self, id: EntityId, kind: EntityKind) -> Result<(), DomainError> {
        if self.ids.contains_key(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        self.ids.insert(id, kind);
        Ok(())
    }

    /// Refuse ids that a company ledger still lists as an owner
    ///
    /// Under [`OwnershipRetention::Retain`] a deleted owner's stake outlives
    /// it; a newcomer with the same id would otherwise inherit that stake.
    fn check_not_retained(&self, id: EntityId) -> Result<(), DomainError> {
        if self.ids.contains_key(&id) {
            return Ok(());
        }
        if self.companies.values().any(|c| c.stake_of(id) > 0) {
            return Err(DomainError::RetainedOwnerId(id));
        }
        Ok(())
    }

    pub(crate) fn insert_person(&mut self, id: EntityId, name: &str) -> Result<(), DomainError> {
        self.reserve(id, EntityKind::Person)?;
        self.person_names.insert(id, name.to_string());
        self.graph.insert_node(id);
        Ok(())
    }

    pub(crate) fn insert_company(&mut self, company: Company) -> Result<(), DomainError> {
        self.reserve(company.id(), EntityKind::Company)?;
        self.companies.insert(company.id(), company);
        Ok(())
    }

    pub(crate) fn person(&self, id: EntityId) -> Option<Person> {
        let name = self.person_names.get(&id)?;
        let relations = self.graph.relations_of(id).cloned().unwrap_or_default();
        Some(Person::with_relations(id, name.clone(), relations))
    }

    fn relation_change(
        &self,
        changed: bool,
        a: EntityId,
        b: EntityId,
    ) -> Result<RelationChange, DomainError> {
        let first = self.person(a).ok_or_else(|| DomainError::person_not_found(a))?;
        let second = self.person(b).ok_or_else(|| DomainError::person_not_found(b))?;
        Ok(RelationChange {
            changed,
            persons: [first, second],
        })
    }

    pub(crate) fn persons(&self) -> Vec<Person> {
        let mut persons: Vec<Person> = self
            .person_names
            .keys()
            .filter_map(|id| self.person(*id))
            .collect();
        persons.sort_by_key(Person::id);
        persons
    }

    pub(crate) fn companies(&self) -> Vec<Company> {
        let mut companies: Vec<Company> = self.companies.values().cloned().collect();
        companies.sort_by_key(Company::id);
        companies
    }

    /// Drop `owner` from every ledger, returning the companies that changed
    fn release_stakes(&mut self, owner: EntityId) -> Vec<EntityId> {
        let mut touched = Vec::new();
        for company in self.companies.values_mut() {
            if let Some(stake) = ledger::release_owner(company, owner) {
                info!(
                    "Released {}% of company {} held by deleted entity {}",
                    stake,
                    company.id(),
                    owner
                );
                touched.push(company.id());
            }
        }
        touched
    }
}

/// In-process implementation of [`EntityRegistry`]
///
/// # Thread Safety
///
/// All state sits behind one `RwLock`. Reads run concurrently; every
/// mutation, including relation cascades and whole purchase transactions
/// run through [`EntityRegistry::update_company`], holds the write lock from
/// first check to last write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) tables: RwLock<Tables>,
    pub(crate) retention: OwnershipRetention,
}

impl MemoryStore {
    /// Create an empty store that retains the stakes of deleted owners
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given retention policy
    pub fn with_retention(retention: OwnershipRetention) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            retention,
        }
    }

    /// Retention policy in effect
    pub fn retention(&self) -> OwnershipRetention {
        self.retention
    }

    /// Current record counts
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let tables = self.read()?;
        Ok(StoreStats {
            persons: tables.person_names.len(),
            companies: tables.companies.len(),
            relations: tables.graph.edge_count(),
        })
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn after_delete(&self, tables: &mut Tables, id: EntityId) {
        if self.retention == OwnershipRetention::Release {
            let touched = tables.release_stakes(id);
            debug!("Deleted entity {} released stakes in {} companies", id, touched.len());
        }
    }
}

impl EntityRegistry for MemoryStore {
    type Error = StoreError;

    fn create_person(&self, id: EntityId, name: &str) -> Result<Person, Self::Error> {
        let mut tables = self.write()?;
        tables.check_not_retained(id)?;
        tables.insert_person(id, name)?;
        info!("Created person {} ({})", id, name);
        Ok(Person::new(id, name))
    }

    fn create_company(&self, id: EntityId, name: &str) -> Result<Company, Self::Error> {
        let mut tables = self.write()?;
        tables.check_not_retained(id)?;
        let company = Company::new(id, name);
        tables.insert_company(company.clone())?;
        info!("Created company {} ({})", id, name);
        Ok(company)
    }

    fn get_person(&self, id: EntityId) -> Result<Option<Person>, Self::Error> {
        Ok(self.read()?.person(id))
    }

    fn get_company(&self, id: EntityId) -> Result<Option<Company>, Self::Error> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    fn list_persons(&self) -> Result<Vec<Person>, Self::Error> {
        Ok(self.read()?.persons())
    }

    fn list_companies(&self) -> Result<Vec<Company>, Self::Error> {
        Ok(self.read()?.companies())
    }

    fn entity_kind(&self, id: EntityId) -> Result<Option<EntityKind>, Self::Error> {
        Ok(self.read()?.ids.get(&id).copied())
    }

    fn update_person_name(&self, id: EntityId, name: &str) -> Result<Person, Self::Error> {
        let mut tables = self.write()?;
        let entry = tables
            .person_names
            .get_mut(&id)
            .ok_or_else(|| DomainError::person_not_found(id))?;
        *entry = name.to_string();
        info!("Renamed person {} to {}", id, name);
        tables
            .person(id)
            .ok_or_else(|| DomainError::person_not_found(id).into())
    }

    fn update_company_name(&self, id: EntityId, name: &str) -> Result<Company, Self::Error> {
        let mut tables = self.write()?;
        let company = tables
            .companies
            .get_mut(&id)
            .ok_or_else(|| DomainError::company_not_found(id))?;
        company.rename(name);
        info!("Renamed company {} to {}", id, name);
        Ok(company.clone())
    }

    fn delete_person(&self, id: EntityId) -> Result<(), Self::Error> {
        let mut tables = self.write()?;
        if tables.person_names.remove(&id).is_none() {
            return Err(DomainError::person_not_found(id).into());
        }
        tables.ids.remove(&id);
        let former = tables.graph.remove_node(id);
        info!("Deleted person {} and {} relations", id, former.len());
        self.after_delete(&mut tables, id);
        Ok(())
    }

    fn delete_company(&self, id: EntityId) -> Result<(), Self::Error> {
        let mut tables = self.write()?;
        if tables.companies.remove(&id).is_none() {
            return Err(DomainError::company_not_found(id).into());
        }
        tables.ids.remove(&id);
        info!("Deleted company {}", id);
        self.after_delete(&mut tables, id);
        Ok(())
    }

    fn establish_relation(&self, a: EntityId, b: EntityId) -> Result<RelationChange, Self::Error> {
        let mut tables = self.write()?;
        let changed = tables.graph.establish(a, b)?;
        if changed {
            info!("Related persons {} and {}", a, b);
        } else {
            debug!("Persons {} and {} were already related", a, b);
        }
        Ok(tables.relation_change(changed, a, b)?)
    }

    fn dissolve_relation(&self, a: EntityId, b: EntityId) -> Result<RelationChange, Self::Error> {
        let mut tables = self.write()?;
        let changed = tables.graph.dissolve(a, b)?;
        if changed {
            info!("Unrelated persons {} and {}", a, b);
        } else {
            debug!("Persons {} and {} were not related", a, b);
        }
        Ok(tables.relation_change(changed, a, b)?)
    }

    fn update_company<T, F>(&self, id: EntityId, f: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Company, &dyn EntityLookup) -> Result<T, DomainError>,
    {
        let mut tables = self.write()?;
        let Some(company) = tables.companies.get(&id) else {
            return Err(DomainError::company_not_found(id).into());
        };

        // Work on a copy so a failing closure leaves the record untouched
        let mut draft = company.clone();
        let result = f(&mut draft, &tables.ids)?;
        tables.companies.insert(id, draft);
        Ok(result)
    }
}
