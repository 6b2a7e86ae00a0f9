//! Entrel Services
//!
//! Transactions that span the registry:
//! - [`OwnershipCoordinator`]: buying shares of a company
//! - [`RelationService`]: relating and unrelating persons with existence checks
//!
//! Both are generic over [`EntityRegistry`](entrel_domain::traits::EntityRegistry)
//! and share the registry through an `Arc`.
//!
//! # Examples
//!
//! ```
//! use entrel_domain::traits::EntityRegistry;
//! use entrel_domain::EntityId;
//! use entrel_service::OwnershipCoordinator;
//! use entrel_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.create_person(EntityId::new(1), "Ada").unwrap();
//! store.create_company(EntityId::new(2), "Acme").unwrap();
//!
//! let coordinator = OwnershipCoordinator::new(Arc::clone(&store));
//! let snapshot = coordinator.buy(EntityId::new(1), EntityId::new(2), 60).unwrap().unwrap();
//! assert!(snapshot.controlled);
//! ```

#![warn(missing_docs)]

mod coordinator;
mod error;
mod relations;

pub use coordinator::OwnershipCoordinator;
pub use error::OwnershipError;
pub use entrel_domain::RelationChange;
pub use relations::RelationService;
