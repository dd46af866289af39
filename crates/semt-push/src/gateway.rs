//! Push gateway trait and HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use semt_core::config::push::PushConfig;
use semt_core::error::AppError;
use semt_core::result::AppResult;

use crate::message::{PushMessage, PushTicket};

/// One round trip to the external push gateway.
///
/// An `Err` means the whole batch is unconfirmed: network failure,
/// timeout, or a non-success HTTP status. No partial credit — callers
/// treat every message of the batch as not delivered.
#[async_trait]
pub trait PushGateway: Send + Sync + 'static {
    /// Send one batch and return per-message tickets, positionally
    /// aligned with the request.
    async fn send_batch(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>>;
}

/// HTTP client for the gateway's batch-send endpoint.
#[derive(Debug, Clone)]
pub struct HttpPushGateway {
    client: reqwest::Client,
    url: String,
}

impl HttpPushGateway {
    /// Build the client with the configured per-request timeout.
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build push gateway client: {e}"))
            })?;

        Ok(Self {
            client,
            url: config.gateway_url.clone(),
        })
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send_batch(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>> {
        debug!(count = messages.len(), "Sending push batch to gateway");

        let response = self
            .client
            .post(&self.url)
            .json(&messages)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(format!("Push gateway request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Push gateway returned HTTP {status}"
            )));
        }

        response.json::<Vec<PushTicket>>().await.map_err(|e| {
            AppError::external_service(format!("Failed to parse gateway response: {e}"))
        })
    }
}
