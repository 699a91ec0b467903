use chrono::{DateTime, TimeZone, Utc};

use crate::errors::FundingError;
use crate::invariants;
use crate::ledger::ContributionLedger;
use crate::money::Money;
use crate::state::derive_funding_state;
use crate::types::{Contribution, ContributorId, FundingTarget, ItemId, ItemStatus};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn target(price: i64) -> FundingTarget {
    FundingTarget::new(ItemId(1), Money::new(price).unwrap()).unwrap()
}

fn pledge(amount: i64) -> Contribution {
    Contribution::create(Money::new(amount).unwrap(), None, None, false, now()).unwrap()
}

fn ledger_of(target: &FundingTarget, amounts: &[i64]) -> ContributionLedger {
    let mut ledger = ContributionLedger::new();
    for &amount in amounts {
        ledger.add(target, pledge(amount)).unwrap();
    }
    ledger
}

#[test]
fn test_single_contribution_scenario() {
    // price = 45,000,000; one pledge of 15,000,000.
    let target = target(45_000_000);
    let ledger = ledger_of(&target, &[15_000_000]);

    let state = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(state.total_contributed.value(), 15_000_000);
    assert_eq!(state.remaining.value(), 30_000_000);
    assert_eq!(state.percentage_display(), "33.3");
    assert_eq!(state.status, ItemStatus::InProgress);
    assert_eq!(state.contributor_count, 1);
    invariants::assert_all_state_invariants(&target, &ledger, &state);
}

#[test]
fn test_exact_fulfillment_scenario() {
    // Three pledges summing exactly to the price.
    let target = target(45_000_000);
    let ledger = ledger_of(&target, &[15_000_000, 10_000_000, 20_000_000]);

    let state = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(state.total_contributed.value(), 45_000_000);
    assert_eq!(state.remaining, Money::ZERO);
    assert_eq!(state.percentage_display(), "100.0");
    assert_eq!(state.status, ItemStatus::Fulfilled);
    assert_eq!(state.contributor_count, 3);
    invariants::assert_all_state_invariants(&target, &ledger, &state);
}

#[test]
fn test_over_contribution_clamps_remaining_and_percentage() {
    let target = target(10_000);
    let ledger = ledger_of(&target, &[12_000]);

    let state = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(state.total_contributed.value(), 12_000);
    assert_eq!(state.remaining, Money::ZERO);
    assert_eq!(state.percentage_display(), "100.0");
    assert_eq!(state.status, ItemStatus::Fulfilled);
    invariants::assert_all_state_invariants(&target, &ledger, &state);
}

#[test]
fn test_empty_ledger_is_available() {
    let target = target(45_000_000);
    let ledger = ContributionLedger::new();

    let state = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(state.total_contributed, Money::ZERO);
    assert_eq!(state.remaining.value(), 45_000_000);
    assert_eq!(state.percentage_display(), "0.0");
    assert_eq!(state.status, ItemStatus::Available);
    assert_eq!(state.contributor_count, 0);
}

#[test]
fn test_total_is_independent_of_insertion_order() {
    let amounts = [7_000_000i64, 1_000_000, 20_000_000, 3_500_000];
    let orderings: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];

    let target = target(45_000_000);
    let mut totals = Vec::new();
    for order in orderings {
        let reordered: Vec<i64> = order.iter().map(|&i| amounts[i]).collect();
        let ledger = ledger_of(&target, &reordered);
        let state = ledger.recompute_funding_state(&target).unwrap();
        totals.push(state.total_contributed);
    }
    assert!(totals.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_recompute_is_idempotent() {
    let target = target(45_000_000);
    let ledger = ledger_of(&target, &[15_000_000, 10_000_000]);

    let first = ledger.recompute_funding_state(&target).unwrap();
    let second = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(first, second);

    // Byte-identical through serialization as well.
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_percentage_rounds_half_up_to_one_decimal() {
    // 1/3 → 33.3; 2/3 → 66.7; 1/8 → 12.5; 1/16 → 6.3 (6.25 rounds up).
    let cases = [
        (1_000i64, 3_000i64, "33.3"),
        (2_000, 3_000, "66.7"),
        (125, 1_000, "12.5"),
        (625, 10_000, "6.3"),
    ];
    for (contributed, price, expected) in cases {
        let target = target(price);
        let ledger = ledger_of(&target, &[contributed]);
        let state = ledger.recompute_funding_state(&target).unwrap();
        assert_eq!(state.percentage_display(), expected, "{contributed}/{price}");
    }
}

#[test]
fn test_percentage_always_within_bounds() {
    let target = target(7_777);
    for contributed in [1i64, 100, 7_776, 7_777, 7_778, 1_000_000] {
        let ledger = ledger_of(&target, &[contributed]);
        let state = ledger.recompute_funding_state(&target).unwrap();
        invariants::assert_percentage_in_range(&state);
        assert!(state.remaining <= target.price);
    }
}

#[test]
fn test_malformed_target_fails_whole_computation() {
    let target = FundingTarget {
        id: ItemId(2),
        price: Money::ZERO,
        status: ItemStatus::Available,
    };
    let result = derive_funding_state(&target, &[]);
    assert_eq!(result, Err(FundingError::InvalidTarget));
}

#[test]
fn test_contributor_count_does_not_deduplicate_by_user() {
    // The same user pledging twice counts twice; anonymity does not
    // collapse counts either.
    let target = target(45_000_000);
    let mut ledger = ContributionLedger::new();
    let repeat = ContributorId("u1".to_string());
    for anonymous in [false, true, true] {
        let contribution = Contribution::create(
            Money::new(1_000).unwrap(),
            Some(repeat.clone()),
            None,
            anonymous,
            now(),
        )
        .unwrap();
        ledger.add(&target, contribution).unwrap();
    }

    let state = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(state.contributor_count, 3);
}

#[test]
fn test_state_serializes_percentage_as_one_decimal_number() {
    let target = target(45_000_000);
    let ledger = ledger_of(&target, &[15_000_000]);
    let state = ledger.recompute_funding_state(&target).unwrap();

    let json: serde_json::Value = serde_json::to_value(&state).unwrap();
    assert_eq!(json["percentage"], serde_json::json!(33.3));
    assert_eq!(json["status"], serde_json::json!("IN_PROGRESS"));
    assert_eq!(json["remaining"], serde_json::json!(30_000_000));
}
