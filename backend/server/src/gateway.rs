//! Zarinpal gateway client — the two-phase request/verify round trip.
//!
//! Phase 1 (`payment/request.json`) exchanges an amount + description for
//! an *authority* token; the contributor is redirected to the StartPay URL
//! carrying that token. Phase 2 (`payment/verify.json`) is called once the
//! contributor returns, and yields the gateway reference id.
//!
//! Gateway status codes: `100` = verified, `101` = verified on an earlier
//! call. Both count as success so re-verifying is safe; everything else is
//! a refusal surfaced with the gateway's own code and message.

use funding_core::{Money, PaymentAuthority, PaymentGateway, PaymentReference};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::errors::ServerError;

const CODE_VERIFIED: i64 = 100;
const CODE_ALREADY_VERIFIED: i64 = 101;

#[derive(Clone)]
pub struct ZarinpalGateway {
    client: Client,
    merchant_id: String,
    request_url: String,
    verify_url: String,
    start_url: String,
    callback_url: String,
}

// ─────────────────────────────────────────────────────────
// Wire shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RequestBody<'a> {
    merchant_id: &'a str,
    amount: i64,
    description: &'a str,
    callback_url: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    merchant_id: &'a str,
    amount: i64,
    authority: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    pub data: Option<GatewayData>,
    /// Either an empty array (success) or an error object; kept loose.
    #[serde(default)]
    pub errors: Value,
}

#[derive(Debug, Deserialize)]
pub struct GatewayData {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub authority: Option<String>,
    /// Numeric in practice; kept loose because the sandbox returns both.
    #[serde(default)]
    pub ref_id: Option<Value>,
}

impl GatewayResponse {
    /// Extract `(code, message)` whether the gateway answered in `data`
    /// or in `errors`.
    fn code_and_message(&self) -> (i64, String) {
        if let Some(data) = &self.data {
            let message = data.message.clone().unwrap_or_default();
            return (data.code, message);
        }
        let code = self.errors.get("code").and_then(Value::as_i64).unwrap_or(-1);
        let message = self
            .errors
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no response data from gateway")
            .to_string();
        (code, message)
    }
}

impl ZarinpalGateway {
    pub fn new(client: Client, config: &Config) -> Self {
        ZarinpalGateway {
            client,
            merchant_id: config.merchant_id.clone(),
            request_url: config.gateway_request_url.clone(),
            verify_url: config.gateway_verify_url.clone(),
            start_url: config.gateway_start_url.clone(),
            callback_url: config.callback_url.clone(),
        }
    }

    /// Redirect URL the contributor is sent to for an authority.
    pub fn start_pay_url(&self, authority: &PaymentAuthority) -> String {
        format!("{}{}", self.start_url, authority.0)
    }
}

impl PaymentGateway for ZarinpalGateway {
    type Error = ServerError;

    async fn initiate_payment(
        &self,
        amount: Money,
        description: &str,
    ) -> Result<PaymentAuthority, ServerError> {
        let body = RequestBody {
            merchant_id: &self.merchant_id,
            amount: amount.value(),
            description,
            callback_url: &self.callback_url,
        };

        let response: GatewayResponse = self
            .client
            .post(&self.request_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let (code, message) = response.code_and_message();
        if code != CODE_VERIFIED {
            return Err(ServerError::Gateway { code, message });
        }

        let authority = response
            .data
            .and_then(|d| d.authority)
            .ok_or(ServerError::Gateway {
                code,
                message: "gateway accepted the request but sent no authority".to_string(),
            })?;

        debug!("Gateway issued authority {authority}");
        Ok(PaymentAuthority(authority))
    }

    async fn verify_payment(
        &self,
        authority: &PaymentAuthority,
        amount: Money,
    ) -> Result<PaymentReference, ServerError> {
        let body = VerifyBody {
            merchant_id: &self.merchant_id,
            amount: amount.value(),
            authority: &authority.0,
        };

        let response: GatewayResponse = self
            .client
            .post(&self.verify_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let (code, message) = response.code_and_message();
        if code != CODE_VERIFIED && code != CODE_ALREADY_VERIFIED {
            return Err(ServerError::Gateway { code, message });
        }

        let ref_id = response
            .data
            .and_then(|d| d.ref_id)
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .ok_or(ServerError::Gateway {
                code,
                message: "gateway verified the payment but sent no ref_id".to_string(),
            })?;

        Ok(PaymentReference(ref_id))
    }
}
