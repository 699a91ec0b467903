#![allow(dead_code)]

//! Reusable invariant assertions shared by the test modules.

use crate::ledger::ContributionLedger;
use crate::state::FundingState;
use crate::types::{FundingTarget, ItemStatus};

/// INV-1: total_contributed equals the sum of the ledger's entries.
pub fn assert_total_matches_entries(ledger: &ContributionLedger, state: &FundingState) {
    let total = ledger.total().expect("ledger total overflowed");
    assert_eq!(
        state.total_contributed, total,
        "INV-1 violated: derived total {} != ledger sum {}",
        state.total_contributed, total
    );
}

/// INV-2: remaining is never negative and never exceeds the price.
pub fn assert_remaining_bounded(target: &FundingTarget, state: &FundingState) {
    assert!(
        state.remaining <= target.price,
        "INV-2 violated: remaining {} exceeds price {}",
        state.remaining,
        target.price
    );
}

/// INV-3: percentage is always within [0, 100].
pub fn assert_percentage_in_range(state: &FundingState) {
    assert!(
        state.percentage_tenths <= 1000,
        "INV-3 violated: percentage {} out of range",
        state.percentage()
    );
}

/// INV-4: status derivation is consistent with the total.
pub fn assert_status_consistent(target: &FundingTarget, state: &FundingState) {
    let expected = if state.total_contributed >= target.price {
        ItemStatus::Fulfilled
    } else if !state.total_contributed.is_zero() {
        ItemStatus::InProgress
    } else {
        ItemStatus::Available
    };
    assert_eq!(
        state.status, expected,
        "INV-4 violated: status {:?} inconsistent with total {}",
        state.status, state.total_contributed
    );
}

/// INV-5: contributor count equals the number of ledger entries —
/// anonymity does not collapse counts.
pub fn assert_count_matches_entries(ledger: &ContributionLedger, state: &FundingState) {
    assert_eq!(
        state.contributor_count as usize,
        ledger.len(),
        "INV-5 violated: contributor_count {} != ledger length {}",
        state.contributor_count,
        ledger.len()
    );
}

/// Run all stateless funding-state invariants.
pub fn assert_all_state_invariants(
    target: &FundingTarget,
    ledger: &ContributionLedger,
    state: &FundingState,
) {
    assert_total_matches_entries(ledger, state);
    assert_remaining_bounded(target, state);
    assert_percentage_in_range(state);
    assert_status_consistent(target, state);
    assert_count_matches_entries(ledger, state);
}
