//! Domain error taxonomy
//!
//! Every variant is local and recoverable: the caller fixes the request and
//! tries again. No-op outcomes (re-establishing an existing relation, for
//! instance) are not errors and never appear here.

use crate::entity::{EntityId, EntityKind};
use thiserror::Error;

/// Errors raised by domain rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The id is already held by a person or a company
    #[error("The id {0} already exists")]
    DuplicateId(EntityId),

    /// The id was freed but a company ledger still records a stake under it
    #[error("The id {0} still holds shares left by a deleted entity")]
    RetainedOwnerId(EntityId),

    /// No record with this id (of the expected kind, when one is given)
    #[error("Could not find {} with id {id}", kind_label(.kind))]
    NotFound {
        /// Expected kind, or `None` when either kind would do
        kind: Option<EntityKind>,
        /// Requested id
        id: EntityId,
    },

    /// Purchase exceeds the shares still available
    #[error("Cannot buy {requested}% of company {company}: only {available}% available")]
    InsufficientShares {
        /// Target company
        company: EntityId,
        /// Requested percentage
        requested: u8,
        /// Shares left before the purchase
        available: u8,
    },

    /// Percentage outside `1..=100`
    #[error("Invalid percentage {0}: must be between 1 and 100")]
    InvalidPercentage(i64),

    /// A person cannot be related to themselves
    #[error("Person {0} cannot be related to themselves")]
    SelfRelation(EntityId),

    /// A company cannot buy its own shares
    #[error("Company {0} cannot buy its own shares")]
    SelfOwnership(EntityId),

    /// Stored state breaks a ledger or graph invariant
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    /// Missing person
    pub fn person_not_found(id: EntityId) -> Self {
        DomainError::NotFound { kind: Some(EntityKind::Person), id }
    }

    /// Missing company
    pub fn company_not_found(id: EntityId) -> Self {
        DomainError::NotFound { kind: Some(EntityKind::Company), id }
    }

    /// Missing entity of either kind
    pub fn entity_not_found(id: EntityId) -> Self {
        DomainError::NotFound { kind: None, id }
    }
}

fn kind_label(kind: &Option<EntityKind>) -> &'static str {
    kind.as_ref().map_or("entity", EntityKind::as_str)
}
