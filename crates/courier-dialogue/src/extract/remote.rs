//! HTTP extraction backend client.
//!
//! Sends the whole history as `{"messages": [...]}` and reads the
//! `shipment` object of the reply.

use std::time::Duration;

use async_trait::async_trait;
use courier_core::config::RemoteExtractionConfig;
use courier_core::{ShipmentRecord, Turn};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::ExtractError;
use crate::extract::{shipment_from_value, Extractor};

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Turn],
}

/// Extractor backed by a remote `/chat` endpoint.
pub struct RemoteExtractor {
    client: Client,
    endpoint: String,
}

impl RemoteExtractor {
    pub fn new(config: &RemoteExtractionConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs.clamp(1, 10)))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ExtractError::NotConfigured(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Extractor for RemoteExtractor {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn extract(&self, history: &[Turn]) -> Result<ShipmentRecord, ExtractError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages: history })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), endpoint = %self.endpoint, "Extraction backend error");
            return Err(ExtractError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Extraction backend sent malformed JSON");
                return Ok(ShipmentRecord::empty());
            }
        };

        if let Some(reply) = value.get("reply").and_then(Value::as_str) {
            tracing::debug!(reply, "Extraction backend reply ignored");
        }

        Ok(shipment_from_value(value.get("shipment")))
    }
}
