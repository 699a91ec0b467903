//! # Types
//!
//! Shared data structures of the funding model.
//!
//! ## Design decisions
//!
//! ### Entity / view split
//!
//! A [`Contribution`] keeps its contributor reference even when the pledge
//! is anonymous — the id is retained for audit, never deleted. Read paths
//! that serve other users go through [`ContributionView`], whose projection
//! redacts anonymous contributors to the `"anonymous"` sentinel. The raw
//! reference is only reachable through
//! [`Contribution::contributor_for_audit`].
//!
//! ### Status derivation
//!
//! [`ItemStatus`] is stored on the item but always re-derivable from the
//! ledger:
//!
//! ```text
//! AVAILABLE ──► IN_PROGRESS ──► FULFILLED
//!     └──────────────────────────►┘
//! ```
//!
//! `FULFILLED` is terminal; the ledger stops accepting contributions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FundingError, Result};
use crate::money::Money;

/// Maximum contribution message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Identifier of a fundable wishlist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

/// Opaque reference to a contributing user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(pub String);

/// Lifecycle status of a fundable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// No contributions yet.
    Available,
    /// Partially funded.
    InProgress,
    /// Fully funded; terminal.
    Fulfilled,
}

impl ItemStatus {
    /// Short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InProgress => "IN_PROGRESS",
            Self::Fulfilled => "FULFILLED",
        }
    }

    /// Parse the database representation back into an [`ItemStatus`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(Self::Available),
            "IN_PROGRESS" => Some(Self::InProgress),
            "FULFILLED" => Some(Self::Fulfilled),
            _ => None,
        }
    }
}

/// A fundable item: fixed target price plus lifecycle status.
///
/// The price is immutable once set; only the status changes, and only
/// forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingTarget {
    pub id: ItemId,
    pub price: Money,
    pub status: ItemStatus,
}

impl FundingTarget {
    /// Create a target with a positive price and `AVAILABLE` status.
    ///
    /// Fails with [`FundingError::InvalidTarget`] when the price is zero.
    pub fn new(id: ItemId, price: Money) -> Result<Self> {
        if price.is_zero() {
            return Err(FundingError::InvalidTarget);
        }
        Ok(FundingTarget {
            id,
            price,
            status: ItemStatus::Available,
        })
    }

    /// Check the target is well-formed (positive price).
    pub fn validate(&self) -> Result<()> {
        if self.price.is_zero() {
            return Err(FundingError::InvalidTarget);
        }
        Ok(())
    }
}

/// A single pledge toward an item's target price.
///
/// Created once, immutable thereafter — no edit or delete is modeled.
/// Owned by the [`ContributionLedger`](crate::ledger::ContributionLedger)
/// of exactly one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    id: Uuid,
    /// Retained even for anonymous pledges; see module docs.
    contributor: Option<ContributorId>,
    amount: Money,
    message: Option<String>,
    anonymous: bool,
    created_at: DateTime<Utc>,
}

impl Contribution {
    /// Create a new pledge.
    ///
    /// - Fails with [`FundingError::InvalidAmount`] when `amount` is zero.
    /// - Fails with [`FundingError::MessageTooLong`] when the message
    ///   exceeds [`MAX_MESSAGE_CHARS`] characters.
    pub fn create(
        amount: Money,
        contributor: Option<ContributorId>,
        message: Option<String>,
        anonymous: bool,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Self::from_parts(Uuid::new_v4(), amount, contributor, message, anonymous, now)
    }

    /// Rebuild a pledge from stored fields, re-applying creation
    /// validation. Used by persistence implementations.
    pub fn from_parts(
        id: Uuid,
        amount: Money,
        contributor: Option<ContributorId>,
        message: Option<String>,
        anonymous: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if amount.is_zero() {
            return Err(FundingError::InvalidAmount(amount.value()));
        }
        if let Some(msg) = &message {
            let len = msg.chars().count();
            if len > MAX_MESSAGE_CHARS {
                return Err(FundingError::MessageTooLong {
                    len,
                    max: MAX_MESSAGE_CHARS,
                });
            }
        }
        Ok(Contribution {
            id,
            contributor,
            amount,
            message,
            anonymous,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Raw contributor reference, including for anonymous pledges.
    ///
    /// Capability-gated: only persistence and audit paths may use this.
    /// Everything user-facing goes through [`Contribution::view`].
    pub fn contributor_for_audit(&self) -> Option<&ContributorId> {
        self.contributor.as_ref()
    }

    /// Project this pledge for display.
    ///
    /// With `include_private_identity = false`, anonymous pledges are
    /// redacted to [`ContributorView::Anonymous`]. A pledge whose
    /// contributor reference is absent (e.g. the user was deleted) also
    /// renders as anonymous.
    pub fn view(&self, include_private_identity: bool) -> ContributionView {
        let contributor = match &self.contributor {
            Some(id) if include_private_identity || !self.anonymous => {
                ContributorView::Known(id.clone())
            }
            _ => ContributorView::Anonymous,
        };
        ContributionView {
            id: self.id,
            contributor,
            amount: self.amount,
            message: self.message.clone(),
            anonymous: self.anonymous,
            created_at: self.created_at,
        }
    }
}

/// Contributor as seen through a read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributorView {
    Known(ContributorId),
    Anonymous,
}

impl ContributorView {
    /// Sentinel rendered in place of a withheld identity.
    pub const ANONYMOUS_SENTINEL: &'static str = "anonymous";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(id) => &id.0,
            Self::Anonymous => Self::ANONYMOUS_SENTINEL,
        }
    }
}

impl Serialize for ContributorView {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Public projection of a [`Contribution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionView {
    pub id: Uuid,
    pub contributor: ContributorView,
    pub amount: Money,
    pub message: Option<String>,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}
