//! HTTP client for the provider's date validation endpoint.
//!
//! The client passes the provider's status and body through untouched so
//! callers can react to validation failures (400) and missing data (404).

use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when calling the provider
#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct ConsumerApiClient {
    client: Client,
    base_uri: String,
}

impl ConsumerApiClient {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_uri)
    }

    pub fn with_client(client: Client, base_uri: impl Into<String>) -> Self {
        Self {
            client,
            base_uri: base_uri.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// `GET <base>/api/provider?validDateTime=<value>`.
    /// The value is sent as given, without percent-encoding.
    pub async fn validate_date_time(&self, valid_date_time: &str) -> Result<Response, ConsumerError> {
        let url = format!(
            "{}/api/provider?validDateTime={}",
            self.base_uri, valid_date_time
        );
        debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }
}

/// One-shot helper for callers that do not keep a client around
pub async fn validate_date_time_using_provider_api(
    valid_date_time: &str,
    base_uri: &str,
) -> Result<Response, ConsumerError> {
    ConsumerApiClient::new(base_uri)
        .validate_date_time(valid_date_time)
        .await
}
