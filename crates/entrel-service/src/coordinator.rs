//! Share purchase transactions
//!
//! A purchase validates the request, checks the buyer exists, then resolves
//! the target company and updates its ledger inside one
//! [`EntityRegistry::update_company`] call, so the availability check and the
//! decrement cannot be split by a concurrent purchase of the same company.
//! The buyer is looked up again inside that call: a buyer deleted after the
//! first check never lands in a ledger.

use crate::error::OwnershipError;
use entrel_domain::ledger::{self, CONTROL_THRESHOLD};
use entrel_domain::traits::EntityRegistry;
use entrel_domain::{DomainError, EntityId, EntityKind, OwnershipSnapshot, Percentage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs purchases of company shares against a registry
pub struct OwnershipCoordinator<R> {
    registry: Arc<R>,
}

impl<R> Clone for OwnershipCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<R> OwnershipCoordinator<R>
where
    R: EntityRegistry,
    OwnershipError: From<R::Error>,
{
    /// Create a coordinator over a shared registry
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Buy `percentage` shares of `company` on behalf of `buyer`
    ///
    /// The buyer may be a person or a company. Returns the company's ledger
    /// right after the purchase.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidPercentage`] if `percentage` is not in `1..=100`
    /// - [`DomainError::NotFound`] with no kind if the buyer does not exist
    /// - [`DomainError::NotFound`] for a company if the target does not exist
    /// - [`DomainError::InsufficientShares`] if not enough shares are left
    /// - [`DomainError::SelfOwnership`] if a company tries to buy itself
    pub fn try_buy(
        &self,
        buyer: EntityId,
        company: EntityId,
        percentage: i64,
    ) -> Result<OwnershipSnapshot, OwnershipError> {
        let percentage = Percentage::new(percentage)?;

        let buyer_kind = self.registry.entity_kind(buyer)?;
        let Some(buyer_kind) = buyer_kind else {
            warn!("Rejected purchase of company {}: buyer {} does not exist", company, buyer);
            return Err(DomainError::entity_not_found(buyer).into());
        };

        let (stake, snapshot) = self.registry.update_company(company, |target, lookup| {
            if lookup.kind_of(buyer).is_none() {
                return Err(DomainError::entity_not_found(buyer));
            }
            let stake = ledger::record_purchase(target, buyer, percentage)?;
            Ok((stake, target.snapshot()))
        })?;

        info!(
            "{} {} bought {} of company {} (stake {}%, {}% left)",
            buyer_kind,
            buyer,
            percentage,
            company,
            stake,
            snapshot.available_shares
        );
        if stake >= CONTROL_THRESHOLD {
            info!("Company {} is controlled by {} {}", company, buyer_kind, buyer);
        }

        Ok(snapshot)
    }

    /// Buy shares, reporting an unbuyable target as `None`
    ///
    /// A missing target company or a request for more shares than are left
    /// is an ordinary outcome here, not an error. Everything else fails as
    /// in [`OwnershipCoordinator::try_buy`].
    pub fn buy(
        &self,
        buyer: EntityId,
        company: EntityId,
        percentage: i64,
    ) -> Result<Option<OwnershipSnapshot>, OwnershipError> {
        match self.try_buy(buyer, company, percentage) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(OwnershipError::Domain(e)) if Self::cannot_buy(&e, company) => {
                debug!("Purchase of company {} by {} not possible: {}", company, buyer, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn cannot_buy(err: &DomainError, company: EntityId) -> bool {
        match err {
            DomainError::InsufficientShares { .. } => true,
            DomainError::NotFound {
                kind: Some(EntityKind::Company),
                id,
            } => *id == company,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entrel_domain::traits::EntityLookup;
    use entrel_domain::{Company, Person, RelationChange};
    use entrel_store::{MemoryStore, OwnershipRetention, StoreError};

    fn id(value: i64) -> EntityId {
        EntityId::new(value)
    }

    fn setup() -> (Arc<MemoryStore>, OwnershipCoordinator<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.create_person(id(1), "Buyer").unwrap();
        store.create_person(id(2), "Third party").unwrap();
        store.create_company(id(10), "C1").unwrap();
        let coordinator = OwnershipCoordinator::new(Arc::clone(&store));
        (store, coordinator)
    }

    #[test]
    fn test_scenario_from_fresh_company() {
        let (_store, coordinator) = setup();

        let first = coordinator.try_buy(id(1), id(10), 50).unwrap();
        assert_eq!(first.id, id(10));
        assert_eq!(first.name, "C1");
        assert_eq!(first.available_shares, 50);
        assert_eq!(first.ownership.get(&id(1)), Some(&50));
        assert!(!first.controlled);

        let second = coordinator.try_buy(id(1), id(10), 20).unwrap();
        assert_eq!(second.available_shares, 30);
        assert_eq!(second.ownership.get(&id(1)), Some(&70));
        assert!(second.controlled);

        let third = coordinator.try_buy(id(2), id(10), 40).unwrap_err();
        assert!(matches!(
            third.as_domain(),
            Some(DomainError::InsufficientShares { requested: 40, available: 30, .. })
        ));
    }

    #[test]
    fn test_buy_reports_unbuyable_as_none() {
        let (_store, coordinator) = setup();

        coordinator.buy(id(1), id(10), 80).unwrap().unwrap();
        assert_eq!(coordinator.buy(id(2), id(10), 40).unwrap(), None);
        assert_eq!(coordinator.buy(id(2), id(99), 10).unwrap(), None);
    }

    #[test]
    fn test_missing_buyer_is_an_error() {
        let (_store, coordinator) = setup();
        let err = coordinator.buy(id(42), id(10), 10).unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::entity_not_found(id(42))));
    }

    #[test]
    fn test_invalid_percentage_is_an_error() {
        let (store, coordinator) = setup();
        for bad in [0, -10, 101] {
            let err = coordinator.buy(id(1), id(10), bad).unwrap_err();
            assert_eq!(err.as_domain(), Some(&DomainError::InvalidPercentage(bad)));
        }
        assert_eq!(store.get_company(id(10)).unwrap().unwrap().available_shares(), 100);
    }

    #[test]
    fn test_company_can_buy_another_company() {
        let (store, coordinator) = setup();
        store.create_company(id(11), "Parent").unwrap();

        let snapshot = coordinator.buy(id(11), id(10), 60).unwrap().unwrap();
        assert!(snapshot.controlled);
        assert_eq!(snapshot.ownership.get(&id(11)), Some(&60));
    }

    #[test]
    fn test_company_cannot_buy_itself() {
        let (_store, coordinator) = setup();
        let err = coordinator.buy(id(10), id(10), 10).unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::SelfOwnership(id(10))));
    }

    /// Registry that deletes the buyer right after reporting it exists
    struct VanishingBuyer {
        inner: MemoryStore,
    }

    impl EntityRegistry for VanishingBuyer {
        type Error = StoreError;

        fn create_person(&self, id: EntityId, name: &str) -> Result<Person, StoreError> {
            self.inner.create_person(id, name)
        }

        fn create_company(&self, id: EntityId, name: &str) -> Result<Company, StoreError> {
            self.inner.create_company(id, name)
        }

        fn entity_kind(&self, id: EntityId) -> Result<Option<EntityKind>, StoreError> {
            let kind = self.inner.entity_kind(id)?;
            if kind == Some(EntityKind::Person) {
                self.inner.delete_person(id)?;
            }
            Ok(kind)
        }

        fn get_person(&self, id: EntityId) -> Result<Option<Person>, StoreError> {
            self.inner.get_person(id)
        }

        fn get_company(&self, id: EntityId) -> Result<Option<Company>, StoreError> {
            self.inner.get_company(id)
        }

        fn list_persons(&self) -> Result<Vec<Person>, StoreError> {
            self.inner.list_persons()
        }

        fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
            self.inner.list_companies()
        }

        fn update_person_name(&self, id: EntityId, name: &str) -> Result<Person, StoreError> {
            self.inner.update_person_name(id, name)
        }

        fn update_company_name(&self, id: EntityId, name: &str) -> Result<Company, StoreError> {
            self.inner.update_company_name(id, name)
        }

        fn delete_person(&self, id: EntityId) -> Result<(), StoreError> {
            self.inner.delete_person(id)
        }

        fn delete_company(&self, id: EntityId) -> Result<(), StoreError> {
            self.inner.delete_company(id)
        }

        fn establish_relation(&self, a: EntityId, b: EntityId) -> Result<RelationChange, StoreError> {
            self.inner.establish_relation(a, b)
        }

        fn dissolve_relation(&self, a: EntityId, b: EntityId) -> Result<RelationChange, StoreError> {
            self.inner.dissolve_relation(a, b)
        }

        fn update_company<T, F>(&self, id: EntityId, f: F) -> Result<T, StoreError>
        where
            F: FnOnce(&mut Company, &dyn EntityLookup) -> Result<T, DomainError>,
        {
            self.inner.update_company(id, f)
        }
    }

    #[test]
    fn test_buyer_deleted_mid_purchase_leaves_no_stake() {
        let inner = MemoryStore::with_retention(OwnershipRetention::Release);
        inner.create_person(id(1), "Buyer").unwrap();
        inner.create_company(id(10), "C1").unwrap();
        let registry = Arc::new(VanishingBuyer { inner });
        let coordinator = OwnershipCoordinator::new(Arc::clone(&registry));

        let err = coordinator.buy(id(1), id(10), 50).unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::entity_not_found(id(1))));

        let company = registry.get_company(id(10)).unwrap().unwrap();
        assert_eq!(company.stake_of(id(1)), 0);
        assert_eq!(company.available_shares(), 100);
    }

    #[test]
    fn test_cumulative_fifty_nine_does_not_control() {
        let (store, coordinator) = setup();
        coordinator.buy(id(1), id(10), 30).unwrap();
        coordinator.buy(id(1), id(10), 29).unwrap();
        assert!(!store.get_company(id(10)).unwrap().unwrap().is_controlled());

        coordinator.buy(id(1), id(10), 1).unwrap();
        assert!(store.get_company(id(10)).unwrap().unwrap().is_controlled());
    }
}
