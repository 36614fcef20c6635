//! HTTP plumbing shared by the venue clients.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::ExchangeError;

/// Transport timeout applied when a client is built without explicit settings.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a reqwest client with a per-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("funding-screener/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Issue a GET and decode the JSON body, mapping non-2xx statuses to
/// [`ExchangeError::Status`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ExchangeError> {
    debug!(url, ?query, "GET");
    let response = http.get(url).query(query).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ExchangeError::Status { status, body });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
