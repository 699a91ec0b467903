//! # Money
//!
//! Integer currency amount in the smallest unit (rial). Kept as an integer
//! end to end to avoid floating-point drift; the only invariant is
//! `value >= 0`, enforced at construction. Values are immutable —
//! arithmetic produces new `Money`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FundingError, Result};

/// Non-negative amount in the smallest currency unit.
///
/// Serialized as a bare integer so it maps directly onto SQLite `INTEGER`
/// columns and JSON numbers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create a `Money` from a raw integer amount.
    ///
    /// Fails with [`FundingError::InvalidAmount`] when `raw < 0`.
    pub fn new(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Err(FundingError::InvalidAmount(raw));
        }
        Ok(Money(raw))
    }

    /// Raw amount in the smallest currency unit.
    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Integer sum. Fails with [`FundingError::InvalidAmount`] on overflow.
    pub fn add(self, other: Money) -> Result<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(FundingError::InvalidAmount(i64::MAX))
    }

    /// Integer difference. Fails with [`FundingError::NegativeResult`] when
    /// `other > self` — there is no implicit clamp here, so the clamp
    /// decision stays visible at the call site.
    pub fn subtract(self, other: Money) -> Result<Money> {
        if other.0 > self.0 {
            return Err(FundingError::NegativeResult);
        }
        Ok(Money(self.0 - other.0))
    }

    /// Render with digit grouping, e.g. `45,000,000`.
    ///
    /// Contract: [`Money::parse_grouped`] round-trips the output back to
    /// the same integer. Locale-specific separators are not modeled.
    pub fn format_grouped(self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    /// Parse a grouped rendering produced by [`Money::format_grouped`].
    ///
    /// Fails with [`FundingError::InvalidAmount`] on anything that is not a
    /// non-negative integer with optional `,` group separators.
    pub fn parse_grouped(s: &str) -> Result<Money> {
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();
        let raw: i64 = cleaned
            .parse()
            .map_err(|_| FundingError::InvalidAmount(-1))?;
        Money::new(raw)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_grouped())
    }
}
