//! JSON snapshots of a [`MemoryStore`].
//!
//! A snapshot is written as one JSON document and re-validated in full when
//! it is loaded: ids unique across kinds, every company's shares totalling
//! 100, and every relation mirrored between two existing persons.

use crate::memory::{MemoryStore, OwnershipRetention, Tables};
use crate::StoreError;
use entrel_domain::{Company, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::RwLock;
use tracing::info;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a whole store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Format version
    pub version: u32,
    /// Persons, ordered by id
    pub persons: Vec<PersonRecord>,
    /// Companies, ordered by id
    pub companies: Vec<CompanyRecord>,
}

/// Serialized person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Person id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Related person ids
    #[serde(default)]
    pub relations: BTreeSet<EntityId>,
}

/// Serialized company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Company id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Percentage not yet owned
    pub available_shares: u8,
    /// Cumulative stake per owner
    #[serde(default)]
    pub ownership: BTreeMap<EntityId, u8>,
    /// Control flag
    #[serde(default)]
    pub controlled: bool,
}

impl From<&Company> for CompanyRecord {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id(),
            name: company.name().to_string(),
            available_shares: company.available_shares(),
            ownership: company.ownership().clone(),
            controlled: company.is_controlled(),
        }
    }
}

impl MemoryStore {
    /// Capture the current state
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let tables = self.read()?;
        let persons = tables
            .persons()
            .into_iter()
            .map(|p| PersonRecord {
                id: p.id(),
                name: p.name().to_string(),
                relations: p.relations().clone(),
            })
            .collect();
        let companies = tables.companies().iter().map(CompanyRecord::from).collect();

        Ok(StoreSnapshot {
            version: SNAPSHOT_VERSION,
            persons,
            companies,
        })
    }

    /// Build a store from a snapshot, validating every invariant
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] if the snapshot has an unknown version, reuses
    /// an id, breaks a company's share accounting, or lists a relation that
    /// is one-sided, self-referencing, or points at an unknown person.
    pub fn from_snapshot(
        snapshot: StoreSnapshot,
        retention: OwnershipRetention,
    ) -> Result<Self, StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut tables = Tables::default();
        let corrupt = |e: entrel_domain::DomainError| StoreError::Corrupt(e.to_string());

        for person in &snapshot.persons {
            tables.insert_person(person.id, &person.name).map_err(corrupt)?;
        }
        for record in snapshot.companies {
            let company = Company::from_parts(
                record.id,
                record.name,
                record.available_shares,
                record.ownership,
                record.controlled,
            )
            .map_err(corrupt)?;
            tables.insert_company(company).map_err(corrupt)?;
        }

        for person in &snapshot.persons {
            for other in &person.relations {
                tables.graph.establish(person.id, *other).map_err(corrupt)?;
            }
        }
        for person in &snapshot.persons {
            let rebuilt = tables.graph.relations_of(person.id);
            if rebuilt != Some(&person.relations) {
                return Err(StoreError::Corrupt(format!(
                    "relations of person {} are not symmetric",
                    person.id
                )));
            }
        }

        Ok(Self {
            tables: RwLock::new(tables),
            retention,
        })
    }

    /// Write the current state to `path` as JSON
    ///
    /// The file is written next to `path` first and then moved into place.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let snapshot = self.snapshot()?;
        let json = serde_json::to_vec_pretty(&snapshot)?;

        let staging = path.with_extension("tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, path)?;

        info!(
            "Saved snapshot with {} persons and {} companies to {}",
            snapshot.persons.len(),
            snapshot.companies.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a store from a JSON snapshot at `path`
    pub fn load_snapshot<P: AsRef<Path>>(
        path: P,
        retention: OwnershipRetention,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = fs::read(path)?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&contents)?;
        let (persons, companies) = (snapshot.persons.len(), snapshot.companies.len());

        let store = Self::from_snapshot(snapshot, retention)?;
        info!(
            "Loaded snapshot with {} persons and {} companies from {}",
            persons,
            companies,
            path.display()
        );
        Ok(store)
    }
}
