//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use funding_core::{
    ContributorProfile, ContributorView, FundingState, IdentityResolver, ItemId, LedgerStore,
    Money, PaymentAuthority,
};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::errors::{Result, ServerError};
use crate::payments::{self, PaymentRequest};
use crate::AppState;

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub price: i64,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub funding: FundingState,
}

#[derive(Deserialize)]
pub struct ContributeRequest {
    pub amount: i64,
    pub contributor_id: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Serialize)]
pub struct ContributeResponse {
    pub item_id: i64,
    pub funding: FundingState,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// One contribution as listed to other users: the view projection plus a
/// resolved profile for non-anonymous entries.
#[derive(Serialize)]
pub struct ContributionEntry {
    pub id: uuid::Uuid,
    pub contributor: ContributorView,
    pub profile: Option<ContributorProfile>,
    pub amount: Money,
    pub message: Option<String>,
    pub anonymous: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct ContributionsResponse {
    pub item_id: i64,
    pub count: usize,
    pub contributions: Vec<ContributionEntry>,
}

#[derive(Deserialize)]
pub struct PaymentRequestBody {
    pub item_id: i64,
    pub amount: i64,
    pub description: String,
    pub contributor_id: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Serialize)]
pub struct PaymentRequestResponse {
    pub authority: PaymentAuthority,
    pub payment_url: String,
    pub order_id: String,
}

#[derive(Deserialize)]
pub struct PaymentVerifyBody {
    pub authority: String,
    pub amount: i64,
}

#[derive(Serialize)]
pub struct PaymentVerifyResponse {
    pub ref_id: String,
    pub already_verified: bool,
    pub funding: Option<FundingState>,
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    #[serde(rename = "Authority")]
    pub authority: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct CallbackResponse {
    pub status: &'static str,
    pub authority: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /items`
///
/// Register a fundable item with a positive target price.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateItemRequest>,
) -> Result<impl IntoResponse> {
    // Validates the price before anything touches the database.
    let price = Money::new(body.price)?;
    if price.is_zero() {
        return Err(ServerError::Funding(funding_core::FundingError::InvalidTarget));
    }

    let item = db::insert_item(&state.pool, &body.name, price.value()).await?;
    let funding = funding_core::ContributionLedger::new().recompute_funding_state(&item.target()?)?;

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            id: item.id,
            name: item.name,
            price,
            funding,
        }),
    ))
}

/// `GET /items/:id`
///
/// Item plus its funding state, recomputed from the ledger on demand.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemResponse>> {
    let item = db::get_item(&state.pool, item_id)
        .await?
        .ok_or(ServerError::NotFound("item"))?;
    let target = item.target()?;

    let ledger = state.store.load_ledger(ItemId(item_id)).await?;
    let funding = ledger.recompute_funding_state(&target)?;

    Ok(Json(ItemResponse {
        id: item.id,
        name: item.name,
        price: target.price,
        funding,
    }))
}

/// `GET /items/:id/contributions?limit=N`
///
/// Chronological contribution views. Identity is resolved only for
/// non-anonymous entries — anonymous ones are redacted before this
/// handler ever sees an id.
pub async fn list_contributions(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ContributionsResponse>> {
    db::get_item(&state.pool, item_id)
        .await?
        .ok_or(ServerError::NotFound("item"))?;

    let ledger = state.store.load_ledger(ItemId(item_id)).await?;

    let mut contributions = Vec::new();
    for view in ledger.list(query.limit, false) {
        let profile = match &view.contributor {
            ContributorView::Known(id) => state.identity.resolve(id).await?,
            ContributorView::Anonymous => None,
        };
        contributions.push(ContributionEntry {
            id: view.id,
            contributor: view.contributor,
            profile,
            amount: view.amount,
            message: view.message,
            anonymous: view.anonymous,
            created_at: view.created_at,
        });
    }

    Ok(Json(ContributionsResponse {
        item_id,
        count: contributions.len(),
        contributions,
    }))
}

/// `POST /items/:id/contributions`
///
/// Direct contribution (e.g. wallet-funded); serialized per item.
pub async fn contribute(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    Json(body): Json<ContributeRequest>,
) -> Result<impl IntoResponse> {
    let amount = Money::new(body.amount)?;
    let funding = payments::record_contribution(
        &state,
        item_id,
        amount,
        body.contributor_id.map(funding_core::ContributorId),
        body.message,
        body.anonymous,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContributeResponse { item_id, funding }),
    ))
}

/// `POST /payments/request`
///
/// Two-phase gateway flow, phase 1: returns the authority and the
/// redirect URL for the contributor.
pub async fn payment_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentRequestBody>,
) -> Result<Json<PaymentRequestResponse>> {
    let initiated = payments::request_payment(
        &state,
        PaymentRequest {
            item_id: body.item_id,
            amount: body.amount,
            contributor_id: body.contributor_id,
            message: body.message,
            is_anonymous: body.anonymous,
            description: body.description,
        },
    )
    .await?;

    Ok(Json(PaymentRequestResponse {
        authority: initiated.authority,
        payment_url: initiated.payment_url,
        order_id: initiated.order_id,
    }))
}

/// `POST /payments/verify`
///
/// Two-phase gateway flow, phase 2. Idempotent: re-verifying a completed
/// payment returns the stored reference without touching the ledger.
pub async fn payment_verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentVerifyBody>,
) -> Result<Json<PaymentVerifyResponse>> {
    let verified = payments::verify_payment(
        &state,
        &PaymentAuthority(body.authority),
        body.amount,
    )
    .await?;

    Ok(Json(PaymentVerifyResponse {
        ref_id: verified.reference.0,
        already_verified: verified.already_verified,
        funding: verified.funding,
    }))
}

/// `GET /payments/callback?Authority=..&Status=OK`
///
/// Gateway redirect landing. Reports the outcome to the returning
/// contributor; verification is a separate, explicit call.
pub async fn payment_callback(Query(query): Query<CallbackQuery>) -> impl IntoResponse {
    let ok = query.status.as_deref() == Some("OK") && query.authority.is_some();
    Json(CallbackResponse {
        status: if ok { "success" } else { "failed" },
        authority: query.authority,
    })
}
