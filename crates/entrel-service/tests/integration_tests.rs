//! Integration tests for entrel-service
//!
//! Purchases and relation edits running against a shared store from
//! several threads at once.

use entrel_domain::traits::EntityRegistry;
use entrel_domain::{DomainError, EntityId};
use entrel_service::{OwnershipCoordinator, RelationService};
use entrel_store::MemoryStore;
use std::sync::Arc;
use std::thread;

fn id(value: i64) -> EntityId {
    EntityId::new(value)
}

#[test]
fn test_parallel_buyers_share_one_company() {
    let store = Arc::new(MemoryStore::new());
    store.create_company(id(1000), "Acme").unwrap();
    for buyer in 1..=8 {
        store.create_person(id(buyer), "buyer").unwrap();
    }
    let coordinator = OwnershipCoordinator::new(Arc::clone(&store));

    let handles: Vec<_> = (1..=8)
        .map(|buyer| {
            let coordinator = coordinator.clone();
            thread::spawn(move || {
                let mut bought = 0u32;
                for _ in 0..10 {
                    if coordinator.buy(id(buyer), id(1000), 3).unwrap().is_some() {
                        bought += 3;
                    }
                }
                bought
            })
        })
        .collect();

    let total_bought: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let company = store.get_company(id(1000)).unwrap().unwrap();

    // 33 purchases of 3% fit; the last 1% can never be bought in steps of 3
    assert_eq!(total_bought, 99);
    assert_eq!(company.available_shares(), 1);
    let owned: u32 = company.ownership().values().map(|s| u32::from(*s)).sum();
    assert_eq!(owned, total_bought);
}

#[test]
fn test_deleted_buyer_cannot_buy() {
    let store = Arc::new(MemoryStore::new());
    store.create_person(id(1), "Gone").unwrap();
    store.create_company(id(2), "Acme").unwrap();
    let coordinator = OwnershipCoordinator::new(Arc::clone(&store));

    coordinator.buy(id(1), id(2), 10).unwrap().unwrap();
    store.delete_person(id(1)).unwrap();

    assert!(coordinator.buy(id(1), id(2), 10).is_err());
    // Retained stake keeps the accounting intact
    let company = store.get_company(id(2)).unwrap().unwrap();
    assert_eq!(company.stake_of(id(1)), 10);
    assert_eq!(company.available_shares(), 90);
}

#[test]
fn test_newcomer_cannot_take_over_retained_stake() {
    let store = Arc::new(MemoryStore::new());
    store.create_person(id(1), "Founder").unwrap();
    store.create_company(id(2), "Acme").unwrap();
    let coordinator = OwnershipCoordinator::new(Arc::clone(&store));

    coordinator.buy(id(1), id(2), 50).unwrap().unwrap();
    store.delete_person(id(1)).unwrap();

    let err = store.create_company(id(1), "Newcomer").unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::RetainedOwnerId(id(1))));
    assert_eq!(
        coordinator.buy(id(1), id(2), 10).unwrap_err().as_domain(),
        Some(&DomainError::entity_not_found(id(1)))
    );
    assert!(!store.get_company(id(2)).unwrap().unwrap().is_controlled());
}

#[test]
fn test_relations_and_purchases_together() {
    let store = Arc::new(MemoryStore::new());
    store.create_person(id(1), "P1").unwrap();
    store.create_person(id(2), "P2").unwrap();
    store.create_company(id(3), "Acme").unwrap();

    let relations = RelationService::new(Arc::clone(&store));
    let coordinator = OwnershipCoordinator::new(Arc::clone(&store));

    relations.establish(id(1), id(2)).unwrap();
    coordinator.buy(id(1), id(3), 30).unwrap().unwrap();
    coordinator.buy(id(2), id(3), 30).unwrap().unwrap();

    // Related owners are still separate owners
    assert!(!store.get_company(id(3)).unwrap().unwrap().is_controlled());

    store.delete_person(id(2)).unwrap();
    assert!(store.get_person(id(1)).unwrap().unwrap().relations().is_empty());
}
