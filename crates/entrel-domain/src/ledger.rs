//! Ownership ledger
//!
//! Share accounting for a single company. Every function here keeps
//! `available_shares + sum(ownership) == TOTAL_SHARES`, and control is only
//! ever switched on.

use crate::company::Company;
use crate::entity::{EntityId, Percentage};
use crate::error::DomainError;

/// Shares in a whole company
pub const TOTAL_SHARES: u8 = 100;

/// Cumulative stake at which a single owner takes control
pub const CONTROL_THRESHOLD: u8 = 60;

/// Record a purchase of `percentage` shares of `company` by `owner`
///
/// The owner's stake is cumulative: buying 30 twice leaves a stake of 60.
/// Control is evaluated on the buyer's own cumulative stake only, never on
/// the combined stakes of distinct owners.
///
/// Returns the owner's new cumulative stake.
///
/// # Errors
///
/// - [`DomainError::SelfOwnership`] if the company tries to buy itself
/// - [`DomainError::InsufficientShares`] if `percentage` exceeds what is available
///
/// # Examples
///
/// ```
/// use entrel_domain::{ledger, Company, EntityId, Percentage};
///
/// let mut company = Company::new(EntityId::new(1), "Acme");
/// let buyer = EntityId::new(2);
/// ledger::record_purchase(&mut company, buyer, Percentage::new(30).unwrap()).unwrap();
/// let stake = ledger::record_purchase(&mut company, buyer, Percentage::new(30).unwrap()).unwrap();
/// assert_eq!(stake, 60);
/// assert!(company.is_controlled());
/// ```
pub fn record_purchase(
    company: &mut Company,
    owner: EntityId,
    percentage: Percentage,
) -> Result<u8, DomainError> {
    if owner == company.id() {
        return Err(DomainError::SelfOwnership(owner));
    }

    let requested = percentage.value();
    if requested > company.available_shares {
        return Err(DomainError::InsufficientShares {
            company: company.id(),
            requested,
            available: company.available_shares,
        });
    }

    let stake = company.ownership.entry(owner).or_insert(0);
    *stake += requested;
    let cumulative = *stake;
    company.available_shares -= requested;

    if cumulative >= CONTROL_THRESHOLD {
        company.controlled = true;
    }

    Ok(cumulative)
}

/// Remove `owner` from the ledger and return their stake to the pool
///
/// Returns the released stake, or `None` if `owner` held nothing. The control
/// flag stays as it was.
pub fn release_owner(company: &mut Company, owner: EntityId) -> Option<u8> {
    let stake = company.ownership.remove(&owner)?;
    company.available_shares += stake;
    Some(stake)
}

/// Owner whose stake meets the control threshold, if any
///
/// At most one owner can hold 60% or more of a company.
pub fn controlling_owner(company: &Company) -> Option<EntityId> {
    company
        .ownership
        .iter()
        .find(|(_, stake)| **stake >= CONTROL_THRESHOLD)
        .map(|(owner, _)| *owner)
}

/// Check the share invariants of a company
///
/// - every stake is in `1..=100`
/// - stakes plus available shares total exactly 100
/// - a company with a controlling owner is flagged as controlled
pub fn verify(company: &Company) -> Result<(), DomainError> {
    if let Some((owner, stake)) = company
        .ownership
        .iter()
        .find(|(_, stake)| **stake == 0 || **stake > TOTAL_SHARES)
    {
        return Err(DomainError::InvariantViolation(format!(
            "company {} records a stake of {} for owner {}",
            company.id(),
            stake,
            owner
        )));
    }

    let owned: u32 = company.ownership.values().map(|s| u32::from(*s)).sum();
    let total = owned + u32::from(company.available_shares);
    if total != u32::from(TOTAL_SHARES) {
        return Err(DomainError::InvariantViolation(format!(
            "company {} accounts for {}% of its shares",
            company.id(),
            total
        )));
    }

    if !company.controlled && controlling_owner(company).is_some() {
        return Err(DomainError::InvariantViolation(format!(
            "company {} has a controlling owner but is not flagged as controlled",
            company.id()
        )));
    }

    Ok(())
}
