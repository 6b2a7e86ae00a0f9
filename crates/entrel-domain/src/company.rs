//! Company records and ownership snapshots

use crate::entity::EntityId;
use crate::error::DomainError;
use crate::ledger::{self, TOTAL_SHARES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A company and its share ledger
///
/// Fields are private: the name changes through [`Company::rename`], and the
/// shares change only through [`ledger::record_purchase`] and
/// [`ledger::release_owner`], which keep
/// `available_shares + sum(ownership) == 100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    id: EntityId,
    name: String,
    #[serde(rename = "availableShares")]
    pub(crate) available_shares: u8,
    #[serde(rename = "whoOwnsMe")]
    pub(crate) ownership: BTreeMap<EntityId, u8>,
    pub(crate) controlled: bool,
}

impl Company {
    /// Create a company with all shares available and no owners
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            available_shares: TOTAL_SHARES,
            ownership: BTreeMap::new(),
            controlled: false,
        }
    }

    /// Rebuild a company from stored parts
    ///
    /// Fails with [`DomainError::InvariantViolation`] if the parts do not
    /// satisfy the share invariants.
    pub fn from_parts(
        id: EntityId,
        name: impl Into<String>,
        available_shares: u8,
        ownership: BTreeMap<EntityId, u8>,
        controlled: bool,
    ) -> Result<Self, DomainError> {
        let company = Self {
            id,
            name: name.into(),
            available_shares,
            ownership,
            controlled,
        };
        ledger::verify(&company)?;
        Ok(company)
    }

    /// Company id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the display name
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Percentage not yet owned by anyone
    pub fn available_shares(&self) -> u8 {
        self.available_shares
    }

    /// Cumulative stake per owner
    pub fn ownership(&self) -> &BTreeMap<EntityId, u8> {
        &self.ownership
    }

    /// Cumulative stake of one owner, zero if none
    pub fn stake_of(&self, owner: EntityId) -> u8 {
        self.ownership.get(&owner).copied().unwrap_or(0)
    }

    /// Whether a single owner has ever reached the control threshold
    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// Snapshot of the ledger as returned to buyers
    pub fn snapshot(&self) -> OwnershipSnapshot {
        OwnershipSnapshot {
            id: self.id,
            name: self.name.clone(),
            available_shares: self.available_shares,
            ownership: self.ownership.clone(),
            controlled: self.controlled,
        }
    }
}

/// State of a company's ledger right after a purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipSnapshot {
    /// Company id
    pub id: EntityId,
    /// Company name
    pub name: String,
    /// Percentage still available
    #[serde(rename = "availableShares")]
    pub available_shares: u8,
    /// Cumulative stake per owner
    #[serde(rename = "whoOwnsMe")]
    pub ownership: BTreeMap<EntityId, u8>,
    /// Control flag
    pub controlled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_company() {
        let company = Company::new(EntityId::new(10), "Acme");
        assert_eq!(company.available_shares(), 100);
        assert!(company.ownership().is_empty());
        assert!(!company.is_controlled());
        assert_eq!(company.stake_of(EntityId::new(1)), 0);
    }

    #[test]
    fn test_rename_keeps_ledger() {
        let mut company = Company::from_parts(
            EntityId::new(10),
            "Acme",
            70,
            BTreeMap::from([(EntityId::new(1), 30)]),
            false,
        )
        .unwrap();
        company.rename("Acme Holdings");
        assert_eq!(company.name(), "Acme Holdings");
        assert_eq!(company.stake_of(EntityId::new(1)), 30);
    }

    #[test]
    fn test_from_parts_rejects_bad_totals() {
        let result = Company::from_parts(
            EntityId::new(10),
            "Acme",
            50,
            BTreeMap::from([(EntityId::new(1), 30)]),
            false,
        );
        assert!(matches!(result, Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn test_snapshot_wire_names() {
        let company = Company::new(EntityId::new(10), "Acme");
        let json = serde_json::to_value(company.snapshot()).unwrap();
        assert_eq!(json["id"], 10);
        assert_eq!(json["availableShares"], 100);
        assert_eq!(json["whoOwnsMe"], serde_json::json!({}));
        assert_eq!(json["controlled"], false);
    }
}
