//! Gemini-backed extraction.
//!
//! The model is asked to return the backend wire shape as JSON. Only the
//! `shipment` object is used; its `reply` is discarded in favour of the
//! engine's own prompts.

use std::time::Duration;

use async_trait::async_trait;
use courier_core::config::GeminiConfig;
use courier_core::{ShipmentRecord, Turn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::ExtractError;
use crate::extract::{shipment_from_value, transcript, Extractor};
use crate::json::parse_json_loose;

const EXTRACTION_INSTRUCTIONS: &str = r#"You are a shipping assistant.

You must do TWO things:
1) Write a short helpful reply to the user, asking ONLY for missing details among:
   - ship_from_city
   - ship_to_city
   - ship_date
2) Extract shipment details from the conversation.

Return ONLY valid JSON in EXACTLY this format (no markdown, no extra text):
{
  "reply": "string",
  "shipment": {
    "ship_from_city": "string or null",
    "ship_to_city": "string or null",
    "ship_date": "YYYY-MM-DD, a time, or null"
  }
}

Rules:
- If unknown, use null.
- If the user gave a date like 'Saturday 7th Feb 2026', convert it to YYYY-MM-DD if you can.
- If the user corrects an earlier detail, use the latest value.
- Do not ask for package weight/dimensions; only focus on from/to/date."#;

/// Build the full extraction prompt for a conversation.
pub fn extraction_prompt(history: &[Turn]) -> String {
    format!(
        "{}\n\nConversation:\n{}",
        EXTRACTION_INSTRUCTIONS,
        transcript(history)
    )
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(response: &Value) -> String {
    response["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

pub struct GeminiExtractor {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiExtractor {
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ExtractError::NotConfigured(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Read the API key from the environment variable named in `config`.
    pub fn from_env(config: &GeminiConfig) -> Result<Self, ExtractError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ExtractError::NotConfigured(format!("{} is not set", config.api_key_env))
            })?;
        Self::new(config, api_key)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn extract(&self, history: &[Turn]) -> Result<ShipmentRecord, ExtractError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": extraction_prompt(history)}]
            }]
        });

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response.text().await.unwrap_or_default();
            let snippet: String = err_text.chars().take(200).collect();
            tracing::warn!(
                status = status.as_u16(),
                model = %self.model,
                "Gemini error: {}",
                snippet
            );
            return Err(ExtractError::Status(status.as_u16()));
        }

        let raw = response.text().await?;
        let envelope: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
        let text = candidate_text(&envelope);
        if text.is_empty() {
            tracing::warn!(model = %self.model, "Gemini returned no candidate text");
        }

        let data = parse_json_loose(&text);
        Ok(shipment_from_value(data.get("shipment")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config_for(base_url: String) -> GeminiConfig {
        GeminiConfig {
            base_url,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    fn candidate(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]}
            }]
        })
    }

    // =========================================================================
    // Prompt
    // =========================================================================

    #[test]
    fn test_prompt_contains_transcript() {
        let prompt = extraction_prompt(&[
            Turn::user("from Leeds"),
            Turn::assistant("Which city is the shipment going to?"),
        ]);
        assert!(prompt.starts_with("You are a shipping assistant."));
        assert!(prompt.ends_with(
            "Conversation:\nUSER: from Leeds\nASSISTANT: Which city is the shipment going to?"
        ));
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let v = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        });
        assert_eq!(candidate_text(&v), "{\"a\":1}");
        assert_eq!(candidate_text(&json!({})), "");
    }

    // =========================================================================
    // Requests
    // =========================================================================

    #[tokio::test]
    async fn test_extracts_fenced_shipment() {
        let router = Router::new().route(
            "/models/gemini-2.5-flash:generateContent",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorised = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    == Some("test-key");
                let prompt = body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default();
                if !authorised || !prompt.contains("USER: from Sheffield") {
                    return (StatusCode::FORBIDDEN, Json(json!({}))).into_response();
                }
                Json(candidate(
                    "```json\n{\"reply\":\"Where to?\",\"shipment\":{\"ship_from_city\":\"Sheffield\",\"ship_to_city\":null,\"ship_date\":null}}\n```",
                ))
                .into_response()
            }),
        );
        let base = spawn_backend(router).await;
        let extractor = GeminiExtractor::new(&config_for(base), "test-key").unwrap();

        let rec = extractor
            .extract(&[Turn::user("from Sheffield")])
            .await
            .unwrap();
        assert_eq!(rec.origin_city.as_deref(), Some("Sheffield"));
        assert_eq!(rec.destination_city, None);
    }

    #[tokio::test]
    async fn test_unparseable_model_text_is_empty_record() {
        let router = Router::new().route(
            "/models/gemini-2.5-flash:generateContent",
            post(|| async { Json(candidate("Sorry, I can't help with that.")) }),
        );
        let base = spawn_backend(router).await;
        let extractor = GeminiExtractor::new(&config_for(base), "k").unwrap();

        let rec = extractor.extract(&[Turn::user("hi")]).await.unwrap();
        assert_eq!(rec, ShipmentRecord::empty());
    }

    #[tokio::test]
    async fn test_api_error_is_status() {
        let router = Router::new().route(
            "/models/gemini-2.5-flash:generateContent",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota") }),
        );
        let base = spawn_backend(router).await;
        let extractor = GeminiExtractor::new(&config_for(base), "k").unwrap();

        let err = extractor.extract(&[Turn::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ExtractError::Status(429)));
    }

    #[test]
    fn test_url_uses_model() {
        let extractor =
            GeminiExtractor::new(&config_for("http://localhost:9/v1beta/".into()), "k").unwrap();
        assert_eq!(
            extractor.url(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(extractor.name(), "gemini");
    }
}
