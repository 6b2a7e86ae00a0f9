//! Entrel Domain Layer
//!
//! This crate contains the core business rules for Entrel: persons and
//! companies sharing one identifier namespace, the symmetric relation graph
//! between persons, and the share ledger that tracks who owns which company.
//!
//! ## Key Concepts
//!
//! - **Entity**: a person or a company, addressed by an [`EntityId`] that is unique across both kinds
//! - **Relation**: a symmetric edge between two persons, kept by [`graph::RelationGraph`]
//! - **Ownership**: a cumulative percentage stake held by any entity in a company, kept by [`ledger`]
//! - **Control**: set permanently on a company once a single owner reaches [`ledger::CONTROL_THRESHOLD`]
//!
//! ## Architecture
//!
//! - No I/O and no locking; pure business logic only
//! - Storage implementations live in `entrel-store`
//! - Transactions that span the registry live in `entrel-service`
//! - [`traits::EntityRegistry`] is the boundary all of them agree on

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod company;
pub mod entity;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod person;
pub mod traits;

// Re-exports for convenience
pub use company::{Company, OwnershipSnapshot};
pub use entity::{EntityId, EntityKind, Percentage};
pub use error::DomainError;
pub use graph::RelationGraph;
pub use person::{Person, RelationChange};
