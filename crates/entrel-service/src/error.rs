//! Service error types

use entrel_domain::DomainError;
use entrel_store::StoreError;
use thiserror::Error;

/// Errors that can occur during service operations
#[derive(Error, Debug)]
pub enum OwnershipError {
    /// A domain rule rejected the operation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The registry failed for a reason unrelated to the request
    #[error("Registry error: {0}")]
    Registry(String),
}

impl OwnershipError {
    /// The domain error behind this failure, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            OwnershipError::Domain(e) => Some(e),
            OwnershipError::Registry(_) => None,
        }
    }
}

impl From<StoreError> for OwnershipError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => OwnershipError::Domain(e),
            other => OwnershipError::Registry(other.to_string()),
        }
    }
}
