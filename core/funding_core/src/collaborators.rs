//! # Collaborator interfaces
//!
//! The funding model's only external dependencies, corresponding to
//! functionality that lives outside the core: a backing store for
//! ledgers, the two-phase payment gateway, and contributor identity
//! resolution. The core consumes these; the server crate implements them.

use serde::{Deserialize, Serialize};

use crate::ledger::ContributionLedger;
use crate::money::Money;
use crate::types::{Contribution, ContributorId, ItemId};

/// Opaque token returned by the gateway's request phase; the contributor
/// is redirected to the gateway with it and it is presented back at
/// verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentAuthority(pub String);

/// Gateway reference id proving a verified payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(pub String);

/// Display data for a resolved contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorProfile {
    pub id: ContributorId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Backing store for per-item contribution ledgers.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the full ledger for an item, in arrival order.
    async fn load_ledger(&self, item: ItemId) -> Result<ContributionLedger, Self::Error>;

    /// Persist one accepted contribution.
    async fn append_contribution(
        &self,
        item: ItemId,
        contribution: &Contribution,
    ) -> Result<(), Self::Error>;
}

/// Two-phase payment gateway: request a redirect authority, then verify
/// the payment after the contributor returns from the gateway.
///
/// `verify_payment` must be idempotent and safely retryable — verifying
/// an already-verified authority succeeds with the same reference.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn initiate_payment(
        &self,
        amount: Money,
        description: &str,
    ) -> Result<PaymentAuthority, Self::Error>;

    async fn verify_payment(
        &self,
        authority: &PaymentAuthority,
        amount: Money,
    ) -> Result<PaymentReference, Self::Error>;
}

/// Resolves a contributor id to display data for non-anonymous entries.
///
/// Must never be invoked for anonymous entries in any externally visible
/// projection — the redaction happens before resolution, in
/// [`Contribution::view`](crate::types::Contribution::view).
#[allow(async_fn_in_trait)]
pub trait IdentityResolver {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn resolve(
        &self,
        contributor: &ContributorId,
    ) -> Result<Option<ContributorProfile>, Self::Error>;
}
