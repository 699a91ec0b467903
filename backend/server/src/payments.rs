//! Payment record lifecycle — the server-side half of the two-phase
//! gateway flow.
//!
//! Request phase: validate, create a PENDING row, ask the gateway for an
//! authority, store it. Verify phase: look the payment up by authority;
//! a COMPLETED payment short-circuits with its stored ref id so verify is
//! idempotent and safely retryable. Only a fresh verification records the
//! contribution, and it does so through the same serialized add path as
//! direct contributions.

use chrono::Utc;
use funding_core::{
    Contribution, ContributorId, FundingState, ItemId, ItemStatus, LedgerStore, Money,
    PaymentAuthority, PaymentGateway, PaymentReference,
};
use sqlx::FromRow;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::{Result, ServerError};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A payment row as stored in / read from the database.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: String,
    pub item_id: i64,
    pub contributor_id: Option<String>,
    pub amount: i64,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub authority: Option<String>,
    pub ref_id: Option<String>,
    pub status: String,
    pub created_at: String,
}

pub struct PaymentRequest {
    pub item_id: i64,
    pub amount: i64,
    pub contributor_id: Option<String>,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub description: String,
}

#[derive(Debug)]
pub struct InitiatedPayment {
    pub authority: PaymentAuthority,
    pub payment_url: String,
    pub order_id: String,
}

#[derive(Debug)]
pub struct VerifiedPayment {
    pub reference: PaymentReference,
    pub funding: Option<FundingState>,
    pub already_verified: bool,
}

/// Phase 1: create a PENDING payment and obtain a gateway authority.
pub async fn request_payment(state: &AppState, req: PaymentRequest) -> Result<InitiatedPayment> {
    if req.amount < state.config.min_contribution {
        return Err(ServerError::BelowMinimum {
            amount: req.amount,
            min: state.config.min_contribution,
        });
    }
    let amount = Money::new(req.amount).map_err(ServerError::Funding)?;

    let item = db::get_item(&state.pool, req.item_id)
        .await?
        .ok_or(ServerError::NotFound("item"))?;
    let target = item.target()?;
    // Early refusal; the authoritative check happens at record time under
    // the item lock.
    if target.status == ItemStatus::Fulfilled {
        return Err(ServerError::Funding(
            funding_core::FundingError::ItemAlreadyFulfilled,
        ));
    }

    let id = Uuid::new_v4();
    let order_id = format!("CONTRIBUTION_{}", id.simple());
    let record = PaymentRecord {
        id: id.to_string(),
        order_id: order_id.clone(),
        item_id: req.item_id,
        contributor_id: req.contributor_id,
        amount: req.amount,
        message: req.message,
        is_anonymous: req.is_anonymous,
        authority: None,
        ref_id: None,
        status: PaymentStatus::Pending.as_str().to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    db::insert_payment(&state.pool, &record).await?;

    let authority = match state.gateway.initiate_payment(amount, &req.description).await {
        Ok(authority) => authority,
        Err(e) => {
            db::set_payment_status(&state.pool, &record.id, PaymentStatus::Failed, None).await?;
            return Err(e);
        }
    };
    db::set_payment_authority(&state.pool, &record.id, &authority.0).await?;

    info!("Payment {} initiated for item {}", order_id, req.item_id);
    Ok(InitiatedPayment {
        payment_url: state.gateway.start_pay_url(&authority),
        authority,
        order_id,
    })
}

/// Phase 2: verify the payment with the gateway and record the
/// contribution.
pub async fn verify_payment(
    state: &AppState,
    authority: &PaymentAuthority,
    amount: i64,
) -> Result<VerifiedPayment> {
    let payment = db::get_payment_by_authority(&state.pool, &authority.0)
        .await?
        .ok_or(ServerError::NotFound("payment"))?;

    // Idempotent short-circuit: already verified, same reference.
    if PaymentStatus::parse(&payment.status) == Some(PaymentStatus::Completed) {
        let reference = payment
            .ref_id
            .clone()
            .map(PaymentReference)
            .ok_or_else(|| ServerError::Corrupt("completed payment without ref_id".to_string()))?;
        return Ok(VerifiedPayment {
            reference,
            funding: None,
            already_verified: true,
        });
    }

    if payment.amount != amount {
        return Err(ServerError::Funding(
            funding_core::FundingError::InvalidAmount(amount),
        ));
    }
    let money = Money::new(amount).map_err(ServerError::Funding)?;

    let reference = match state.gateway.verify_payment(authority, money).await {
        Ok(reference) => reference,
        Err(e) => {
            if let ServerError::Gateway { .. } = e {
                db::set_payment_status(&state.pool, &payment.id, PaymentStatus::Failed, None)
                    .await?;
            }
            return Err(e);
        }
    };
    db::set_payment_status(
        &state.pool,
        &payment.id,
        PaymentStatus::Completed,
        Some(&reference.0),
    )
    .await?;

    // Money is captured at this point. If the item filled up while the
    // contributor was at the gateway, the add below fails with
    // ItemAlreadyFulfilled and the refund is an out-of-band concern.
    let funding = record_contribution(
        state,
        payment.item_id,
        money,
        payment.contributor_id.map(ContributorId),
        payment.message,
        payment.is_anonymous,
    )
    .await
    .map_err(|e| {
        warn!(
            "Payment {} verified but contribution not recorded: {e}",
            payment.order_id
        );
        e
    })?;

    info!("Payment {} verified, ref {}", payment.order_id, reference.0);
    Ok(VerifiedPayment {
        reference,
        funding: Some(funding),
        already_verified: false,
    })
}

/// Serialized check-and-append shared by direct contributions and the
/// verify phase. Holds the item lock across the fulfilled-check, the
/// append, and the status write-back.
pub async fn record_contribution(
    state: &AppState,
    item_id: i64,
    amount: Money,
    contributor: Option<ContributorId>,
    message: Option<String>,
    anonymous: bool,
) -> Result<FundingState> {
    let _guard = state.locks.acquire(item_id).await;

    let item = db::get_item(&state.pool, item_id)
        .await?
        .ok_or(ServerError::NotFound("item"))?;
    let target = item.target()?;

    let mut ledger = state.store.load_ledger(ItemId(item_id)).await?;
    let contribution = Contribution::create(amount, contributor, message, anonymous, Utc::now())?;
    ledger.add(&target, contribution.clone())?;
    state
        .store
        .append_contribution(ItemId(item_id), &contribution)
        .await?;

    let funding = ledger.recompute_funding_state(&target)?;
    if funding.status != target.status {
        db::set_item_status(&state.pool, item_id, funding.status).await?;
    }
    Ok(funding)
}
