use crate::errors::FundingError;
use crate::money::Money;

#[test]
fn test_create_rejects_negative_amount() {
    assert_eq!(Money::new(-1), Err(FundingError::InvalidAmount(-1)));
}

#[test]
fn test_create_accepts_zero_and_positive() {
    assert_eq!(Money::new(0).unwrap().value(), 0);
    assert_eq!(Money::new(45_000_000).unwrap().value(), 45_000_000);
}

#[test]
fn test_add_produces_integer_sum() {
    let a = Money::new(15_000_000).unwrap();
    let b = Money::new(10_000_000).unwrap();
    assert_eq!(a.add(b).unwrap().value(), 25_000_000);
}

#[test]
fn test_add_fails_on_overflow() {
    let a = Money::new(i64::MAX).unwrap();
    let b = Money::new(1).unwrap();
    assert_eq!(a.add(b), Err(FundingError::InvalidAmount(i64::MAX)));
}

#[test]
fn test_subtract_fails_instead_of_going_negative() {
    let a = Money::new(10_000).unwrap();
    let b = Money::new(12_000).unwrap();
    assert_eq!(a.subtract(b), Err(FundingError::NegativeResult));
    // The caller clamps; subtract itself never does.
    assert_eq!(b.subtract(a).unwrap().value(), 2_000);
}

#[test]
fn test_format_groups_digits() {
    assert_eq!(Money::new(45_000_000).unwrap().format_grouped(), "45,000,000");
    assert_eq!(Money::new(1_000).unwrap().format_grouped(), "1,000");
    assert_eq!(Money::new(999).unwrap().format_grouped(), "999");
    assert_eq!(Money::ZERO.format_grouped(), "0");
}

#[test]
fn test_format_round_trips_through_parse() {
    for raw in [0i64, 1, 999, 1_000, 12_345, 45_000_000, i64::MAX] {
        let money = Money::new(raw).unwrap();
        assert_eq!(Money::parse_grouped(&money.format_grouped()).unwrap(), money);
    }
}

#[test]
fn test_parse_rejects_garbage_and_negatives() {
    assert!(Money::parse_grouped("abc").is_err());
    assert!(Money::parse_grouped("-1,000").is_err());
    assert!(Money::parse_grouped("12.5").is_err());
}
