//! Application configuration loaded from environment variables.

use crate::errors::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Zarinpal merchant id (UUID issued by the gateway)
    pub merchant_id: String,
    /// Gateway endpoint for the request phase
    pub gateway_request_url: String,
    /// Gateway endpoint for the verify phase
    pub gateway_verify_url: String,
    /// Redirect base the contributor is sent to with the authority token
    pub gateway_start_url: String,
    /// Callback URL the gateway redirects back to after payment
    pub callback_url: String,
    /// Minimum accepted contribution, in rial
    pub min_contribution: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./wishlist.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid API_PORT".to_string()))?,
            merchant_id: env_var("MERCHANT_ID").map_err(|_| {
                ServerError::Config("MERCHANT_ID environment variable is required".to_string())
            })?,
            gateway_request_url: env_var("GATEWAY_REQUEST_URL").unwrap_or_else(|_| {
                "https://api.zarinpal.com/pg/v4/payment/request.json".to_string()
            }),
            gateway_verify_url: env_var("GATEWAY_VERIFY_URL").unwrap_or_else(|_| {
                "https://api.zarinpal.com/pg/v4/payment/verify.json".to_string()
            }),
            gateway_start_url: env_var("GATEWAY_START_URL")
                .unwrap_or_else(|_| "https://www.zarinpal.com/pg/StartPay/".to_string()),
            callback_url: env_var("CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:3001/payments/callback".to_string()),
            min_contribution: env_var("MIN_CONTRIBUTION")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid MIN_CONTRIBUTION".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ServerError::Config(format!("Missing env var: {key}")))
}
