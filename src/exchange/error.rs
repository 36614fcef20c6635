//! Error type shared by all exchange clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to an exchange or interpreting its response.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Empty result for {symbol}")]
    EmptyResult { symbol: String },

    #[error("Request for {symbol} timed out")]
    Timeout { symbol: String },
}

impl ExchangeError {
    pub(crate) fn api(code: impl ToString, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// A success envelope that lacks a required payload field.
    pub(crate) fn missing_field(field: &'static str) -> Self {
        Self::Decode(serde::de::Error::missing_field(field))
    }
}
