//! # Contribution ledger
//!
//! Append-only log of the contributions made toward one item, in arrival
//! order. Arrival order is load-bearing: chronological display and
//! "first N contributors" truncation both rely on it.
//!
//! Over-contribution policy: a pledge is accepted in full even when it
//! pushes the total above the target price. The excess stays in the
//! ledger for audit; `remaining` and `percentage` clamp at the derivation
//! layer. The terminal condition is a `FULFILLED` item, which stops
//! accepting new contributions.

use crate::errors::{FundingError, Result};
use crate::money::Money;
use crate::state::{derive_funding_state, FundingState};
use crate::types::{Contribution, ContributionView, FundingTarget, ItemStatus};

/// Ordered collection of the contributions for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionLedger {
    entries: Vec<Contribution>,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored entries, preserving their order.
    pub fn from_entries(entries: Vec<Contribution>) -> Self {
        ContributionLedger { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arrival order. Audit/persistence path — read paths that
    /// serve other users go through [`ContributionLedger::list`].
    pub fn entries(&self) -> &[Contribution] {
        &self.entries
    }

    /// Sum of all pledge amounts.
    pub fn total(&self) -> Result<Money> {
        let mut total = Money::ZERO;
        for entry in &self.entries {
            total = total.add(entry.amount())?;
        }
        Ok(total)
    }

    /// Append a pledge.
    ///
    /// Fails with [`FundingError::ItemAlreadyFulfilled`] — leaving the
    /// ledger unchanged — when the target's stored status is `FULFILLED`
    /// or the ledger total has already reached the price. Otherwise the
    /// pledge is accepted in full, even past the price.
    ///
    /// Callers that run concurrently against the same item must serialize
    /// calls per item so this check and the append are atomic.
    pub fn add(&mut self, target: &FundingTarget, contribution: Contribution) -> Result<()> {
        target.validate()?;
        if target.status == ItemStatus::Fulfilled || self.total()? >= target.price {
            return Err(FundingError::ItemAlreadyFulfilled);
        }
        self.entries.push(contribution);
        Ok(())
    }

    /// Lazy, restartable sequence of contribution views in insertion
    /// order, truncated to `limit` entries when given.
    ///
    /// With `include_private_identity = false`, anonymous entries are
    /// redacted to the `"anonymous"` sentinel.
    pub fn list(
        &self,
        limit: Option<usize>,
        include_private_identity: bool,
    ) -> impl Iterator<Item = ContributionView> + '_ {
        self.entries
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(move |c| c.view(include_private_identity))
    }

    /// Recompute the derived funding state for `target`.
    ///
    /// Pure function of the ledger contents and `target.price`; no hidden
    /// state, idempotent, side-effect-free.
    pub fn recompute_funding_state(&self, target: &FundingTarget) -> Result<FundingState> {
        derive_funding_state(target, &self.entries)
    }
}
