//! # Funding core
//!
//! Domain model for a wishlist collective-gifting application: users add
//! desired items with target prices, and contributors crowdfund
//! individual items. This crate is the rules layer — how an item's price,
//! its contributions, and the derived display fields (remaining amount,
//! percentage funded, contributor count, status) stay consistent as
//! contributions arrive.
//!
//! | Concern      | Module                                      |
//! |--------------|---------------------------------------------|
//! | Amounts      | [`money`]                                   |
//! | Entities     | [`types`]                                   |
//! | Derivation   | [`state`]                                   |
//! | Ledger       | [`ledger`]                                  |
//! | Boundaries   | [`collaborators`]                           |
//! | Failures     | [`errors`]                                  |
//!
//! ## Architecture
//!
//! Everything here is synchronous and side-effect-isolated: pure
//! functions plus single-writer appends on an in-memory ledger. Network
//! and database access live behind the [`collaborators`] traits and are
//! implemented by the server crate. If multiple contributors submit
//! concurrently against the same item, callers must serialize
//! [`ContributionLedger::add`] per item — the fulfilled-check and the
//! append have to be atomic with respect to each other.

pub mod collaborators;
pub mod errors;
pub mod ledger;
pub mod money;
pub mod state;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_ledger;
#[cfg(test)]
mod test_money;
#[cfg(test)]
mod test_state;

pub use collaborators::{
    ContributorProfile, IdentityResolver, LedgerStore, PaymentAuthority, PaymentGateway,
    PaymentReference,
};
pub use errors::{FundingError, Result};
pub use ledger::ContributionLedger;
pub use money::Money;
pub use state::{derive_funding_state, FundingState};
pub use types::{
    Contribution, ContributionView, ContributorId, ContributorView, FundingTarget, ItemId,
    ItemStatus, MAX_MESSAGE_CHARS,
};
