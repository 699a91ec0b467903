//! Typed failure kinds for the funding model.
//!
//! Every operation in this crate returns one of these instead of panicking;
//! callers (API layer, UI) translate them into user-facing messages. Each
//! kind is distinguishable so a caller can render a specific message
//! ("amount exceeds remaining" vs. "item already fully funded").

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FundingError {
    /// Amount is negative, zero where a positive amount is required, or
    /// would overflow the smallest-unit integer range.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Contribution message exceeds the configured bound.
    #[error("message too long: {len} characters (max {max})")]
    MessageTooLong { len: usize, max: usize },

    /// The owning item is already fully funded; the ledger stops
    /// accepting contributions.
    #[error("item is already fully funded")]
    ItemAlreadyFulfilled,

    /// The funding target is malformed (non-positive price).
    #[error("invalid funding target: price must be positive")]
    InvalidTarget,

    /// Subtraction would produce a negative amount. Callers that want
    /// clamp-to-zero semantics must clamp explicitly.
    #[error("subtraction would produce a negative amount")]
    NegativeResult,
}

pub type Result<T> = std::result::Result<T, FundingError>;
