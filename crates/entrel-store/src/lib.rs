//! Entrel Storage Layer
//!
//! Implements the [`EntityRegistry`](entrel_domain::traits::EntityRegistry)
//! trait with an in-process store.
//!
//! # Architecture
//!
//! - One id-reservation map shared by persons and companies
//! - Person relations held in a [`RelationGraph`](entrel_domain::RelationGraph)
//! - Companies and their share ledgers in a keyed table
//! - Everything behind a single `RwLock`; reads share it, mutations hold it exclusively
//! - Optional JSON snapshots, re-validated on load
//!
//! # Examples
//!
//! ```
//! use entrel_domain::traits::EntityRegistry;
//! use entrel_domain::EntityId;
//! use entrel_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.create_person(EntityId::new(1), "Ada").unwrap();
//! assert!(store.create_company(EntityId::new(1), "Acme").is_err());
//! ```

#![warn(missing_docs)]

mod memory;
mod snapshot;

pub use memory::{MemoryStore, OwnershipRetention, StoreStats};
pub use snapshot::{CompanyRecord, PersonRecord, StoreSnapshot, SNAPSHOT_VERSION};

use entrel_domain::DomainError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A domain rule rejected the operation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Snapshot file could not be read or written
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON for this format
    #[error("Snapshot format error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot contents break a registry invariant
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    /// A thread panicked while holding the store lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// The domain error behind this failure, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}
