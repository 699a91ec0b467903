use chrono::{DateTime, TimeZone, Utc};

use crate::errors::FundingError;
use crate::invariants;
use crate::ledger::ContributionLedger;
use crate::money::Money;
use crate::types::{
    Contribution, ContributorId, ContributorView, FundingTarget, ItemId, ItemStatus,
    MAX_MESSAGE_CHARS,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn target(price: i64) -> FundingTarget {
    FundingTarget::new(ItemId(1), Money::new(price).unwrap()).unwrap()
}

fn pledge(amount: i64) -> Contribution {
    Contribution::create(Money::new(amount).unwrap(), None, None, false, now()).unwrap()
}

fn pledge_from(user: &str, amount: i64, anonymous: bool) -> Contribution {
    Contribution::create(
        Money::new(amount).unwrap(),
        Some(ContributorId(user.to_string())),
        None,
        anonymous,
        now(),
    )
    .unwrap()
}

#[test]
fn test_create_rejects_zero_amount() {
    let result = Contribution::create(Money::ZERO, None, None, false, now());
    assert_eq!(result, Err(FundingError::InvalidAmount(0)));
}

#[test]
fn test_create_rejects_overlong_message() {
    let message = "x".repeat(MAX_MESSAGE_CHARS + 1);
    let result = Contribution::create(
        Money::new(5_000).unwrap(),
        None,
        Some(message),
        false,
        now(),
    );
    assert_eq!(
        result,
        Err(FundingError::MessageTooLong {
            len: MAX_MESSAGE_CHARS + 1,
            max: MAX_MESSAGE_CHARS,
        })
    );
}

#[test]
fn test_create_accepts_message_at_bound() {
    let message = "x".repeat(MAX_MESSAGE_CHARS);
    let result = Contribution::create(
        Money::new(5_000).unwrap(),
        None,
        Some(message),
        false,
        now(),
    );
    assert!(result.is_ok());
}

#[test]
fn test_message_bound_counts_characters_not_bytes() {
    // 200 multi-byte characters are within the bound.
    let message = "ن".repeat(MAX_MESSAGE_CHARS);
    let result = Contribution::create(
        Money::new(5_000).unwrap(),
        None,
        Some(message),
        false,
        now(),
    );
    assert!(result.is_ok());
}

#[test]
fn test_add_appends_in_arrival_order() {
    let target = target(45_000_000);
    let mut ledger = ContributionLedger::new();

    let first = pledge(15_000_000);
    let second = pledge(10_000_000);
    ledger.add(&target, first.clone()).unwrap();
    ledger.add(&target, second.clone()).unwrap();

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.entries()[0].id(), first.id());
    assert_eq!(ledger.entries()[1].id(), second.id());
}

#[test]
fn test_add_rejects_when_target_marked_fulfilled() {
    let mut target = target(45_000_000);
    target.status = ItemStatus::Fulfilled;

    let mut ledger = ContributionLedger::new();
    let before = ledger.len();
    let result = ledger.add(&target, pledge(1_000));

    assert_eq!(result, Err(FundingError::ItemAlreadyFulfilled));
    assert_eq!(ledger.len(), before, "rejected add must not alter the ledger");
}

#[test]
fn test_add_rejects_once_total_reaches_price() {
    let target = target(25_000_000);
    let mut ledger = ContributionLedger::new();
    ledger.add(&target, pledge(15_000_000)).unwrap();
    ledger.add(&target, pledge(10_000_000)).unwrap();

    let before = ledger.len();
    let result = ledger.add(&target, pledge(5_000));

    assert_eq!(result, Err(FundingError::ItemAlreadyFulfilled));
    assert_eq!(ledger.len(), before);
}

#[test]
fn test_add_accepts_over_contribution_and_preserves_it() {
    // price = 10,000; a single 12,000 pledge is accepted in full.
    let target = target(10_000);
    let mut ledger = ContributionLedger::new();
    ledger.add(&target, pledge(12_000)).unwrap();

    assert_eq!(ledger.total().unwrap().value(), 12_000);

    let state = ledger.recompute_funding_state(&target).unwrap();
    assert_eq!(state.remaining, Money::ZERO);
    assert_eq!(state.percentage_tenths, 1000);
    assert_eq!(state.status, ItemStatus::Fulfilled);
    invariants::assert_percentage_in_range(&state);
}

#[test]
fn test_add_rejects_invalid_target() {
    let target = FundingTarget {
        id: ItemId(9),
        price: Money::ZERO,
        status: ItemStatus::Available,
    };
    let mut ledger = ContributionLedger::new();
    assert_eq!(
        ledger.add(&target, pledge(1_000)),
        Err(FundingError::InvalidTarget)
    );
}

#[test]
fn test_list_truncates_to_limit_in_insertion_order() {
    let target = target(45_000_000);
    let mut ledger = ContributionLedger::new();
    for amount in [1_000, 2_000, 3_000, 4_000] {
        ledger.add(&target, pledge(amount)).unwrap();
    }

    let amounts: Vec<i64> = ledger
        .list(Some(2), false)
        .map(|v| v.amount.value())
        .collect();
    assert_eq!(amounts, vec![1_000, 2_000]);
}

#[test]
fn test_list_is_restartable() {
    let target = target(45_000_000);
    let mut ledger = ContributionLedger::new();
    ledger.add(&target, pledge(1_000)).unwrap();
    ledger.add(&target, pledge(2_000)).unwrap();

    let first_pass: Vec<_> = ledger.list(None, false).collect();
    let second_pass: Vec<_> = ledger.list(None, false).collect();
    assert_eq!(first_pass, second_pass);
}

#[test]
fn test_anonymous_entry_is_redacted_in_public_listing() {
    let target = target(45_000_000);
    let mut ledger = ContributionLedger::new();
    ledger
        .add(&target, pledge_from("u1", 5_000, true))
        .unwrap();

    let views: Vec<_> = ledger.list(None, false).collect();
    assert_eq!(views[0].contributor, ContributorView::Anonymous);
    assert_eq!(views[0].contributor.as_str(), "anonymous");
    assert!(views[0].anonymous);
}

#[test]
fn test_anonymous_identity_survives_for_audit_path() {
    let contribution = pledge_from("u1", 5_000, true);

    // The raw entity keeps the id; only the public projection hides it.
    assert_eq!(
        contribution.contributor_for_audit(),
        Some(&ContributorId("u1".to_string()))
    );
    let audit_view = contribution.view(true);
    assert_eq!(
        audit_view.contributor,
        ContributorView::Known(ContributorId("u1".to_string()))
    );
}

#[test]
fn test_non_anonymous_entry_shows_contributor() {
    let contribution = pledge_from("u2", 5_000, false);
    let view = contribution.view(false);
    assert_eq!(
        view.contributor,
        ContributorView::Known(ContributorId("u2".to_string()))
    );
}

#[test]
fn test_public_view_serialization_never_leaks_identity() {
    let contribution = pledge_from("u1", 5_000, true);
    let json = serde_json::to_string(&contribution.view(false)).unwrap();
    assert!(!json.contains("u1"));
    assert!(json.contains("\"anonymous\""));
}
