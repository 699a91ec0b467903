//! # Funding state derivation
//!
//! [`FundingState`] is derived, never stored: a pure function of the
//! ledger contents and the target's fixed price. Calling the derivation
//! twice with unchanged inputs yields identical output.

use serde::{Serialize, Serializer};

use crate::errors::{FundingError, Result};
use crate::money::Money;
use crate::types::{Contribution, FundingTarget, ItemStatus};

/// Derived display fields for one item's funding progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingState {
    pub total_contributed: Money,
    /// `max(0, price - total)` — clamped here, not inside `Money::subtract`.
    pub remaining: Money,
    /// Funded percentage in tenths of a percent, clamped to `[0, 1000]`,
    /// rounded half-up. Serialized as a one-decimal number (`33.3`).
    #[serde(rename = "percentage", serialize_with = "serialize_tenths")]
    pub percentage_tenths: u32,
    /// Number of ledger entries. Pledges are not deduplicated by user;
    /// anonymity does not collapse counts.
    pub contributor_count: u32,
    pub status: ItemStatus,
}

impl FundingState {
    /// Funded percentage as a number in `[0.0, 100.0]`.
    pub fn percentage(&self) -> f64 {
        f64::from(self.percentage_tenths) / 10.0
    }

    /// One-decimal rendering, e.g. `"33.3"`.
    pub fn percentage_display(&self) -> String {
        format!(
            "{}.{}",
            self.percentage_tenths / 10,
            self.percentage_tenths % 10
        )
    }
}

fn serialize_tenths<S: Serializer>(tenths: &u32, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(f64::from(*tenths) / 10.0)
}

/// Derive the funding state from a target and its contributions.
///
/// Pure arithmetic; the only failure mode is a malformed target
/// (`price <= 0`), which fails the whole computation with
/// [`FundingError::InvalidTarget`] rather than silently dividing by zero.
pub fn derive_funding_state(
    target: &FundingTarget,
    contributions: &[Contribution],
) -> Result<FundingState> {
    target.validate()?;

    let mut total = Money::ZERO;
    for contribution in contributions {
        total = total.add(contribution.amount())?;
    }

    // Clamp decision is explicit: subtract refuses to go negative, so an
    // over-funded item clamps remaining to zero here.
    let remaining = match target.price.subtract(total) {
        Ok(remaining) => remaining,
        Err(FundingError::NegativeResult) => Money::ZERO,
        Err(e) => return Err(e),
    };

    let status = if total >= target.price {
        ItemStatus::Fulfilled
    } else if !total.is_zero() {
        ItemStatus::InProgress
    } else {
        ItemStatus::Available
    };

    Ok(FundingState {
        total_contributed: total,
        remaining,
        percentage_tenths: percentage_tenths(total, target.price),
        contributor_count: u32::try_from(contributions.len()).unwrap_or(u32::MAX),
        status,
    })
}

/// `total / price * 100` in tenths of a percent, rounded half-up and
/// clamped to `[0, 1000]`. Pure integer math.
fn percentage_tenths(total: Money, price: Money) -> u32 {
    let total = i128::from(total.value());
    let price = i128::from(price.value());
    // round-half-up of (total * 1000 / price)
    let tenths = (total * 2000 + price) / (2 * price);
    tenths.clamp(0, 1000) as u32
}
