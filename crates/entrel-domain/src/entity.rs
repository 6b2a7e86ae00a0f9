//! Identifiers and value objects shared by every entity kind

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a person or a company
///
/// Persons and companies draw from the same id space: a given value names
/// at most one entity at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Wrap a raw id value
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw id value
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of entity an id has been reserved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A natural person; may hold relations and own shares
    Person,
    /// A company; may own shares and be owned
    Company,
}

impl EntityKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Company => "company",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A share percentage requested in a single purchase
///
/// Always in `1..=100`. Zero and negative requests are rejected up front, and
/// nothing larger than a whole company can ever be available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u8);

impl Percentage {
    /// Validate a raw percentage
    ///
    /// # Examples
    ///
    /// ```
    /// use entrel_domain::Percentage;
    ///
    /// assert_eq!(Percentage::new(60).unwrap().value(), 60);
    /// assert!(Percentage::new(0).is_err());
    /// assert!(Percentage::new(101).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(v) if (1..=crate::ledger::TOTAL_SHARES).contains(&v) => Ok(Self(v)),
            _ => Err(DomainError::InvalidPercentage(value)),
        }
    }

    /// Get the percentage as an integer
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percentage {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::new(42).to_string(), "42");
        assert_eq!(EntityId::from(-7).value(), -7);
    }

    #[test]
    fn test_entity_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&EntityId::new(12)).unwrap();
        assert_eq!(json, "12");
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(1).is_ok());
        assert!(Percentage::new(100).is_ok());
        assert!(matches!(Percentage::new(0), Err(DomainError::InvalidPercentage(0))));
        assert!(matches!(Percentage::new(-5), Err(DomainError::InvalidPercentage(-5))));
        assert!(matches!(Percentage::new(101), Err(DomainError::InvalidPercentage(101))));
        assert!(Percentage::new(i64::MAX).is_err());
    }

    #[test]
    fn test_entity_kind_str() {
        assert_eq!(EntityKind::Person.as_str(), "person");
        assert_eq!(EntityKind::Company.to_string(), "company");
    }
}
