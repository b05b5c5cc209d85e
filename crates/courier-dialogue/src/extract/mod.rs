//! Extraction strategies.
//!
//! Defines the `Extractor` async trait and its implementations: a local
//! pattern matcher, an HTTP backend client, and a Gemini-backed extractor.

pub mod gemini;
pub mod pattern;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use courier_core::config::{ExtractionConfig, ExtractionStrategy};
use courier_core::{ShipmentRecord, Turn};
use serde_json::Value;

use crate::error::ExtractError;

pub use gemini::GeminiExtractor;
pub use pattern::PatternExtractor;
pub use remote::RemoteExtractor;

/// Derives candidate slot values from a conversation.
///
/// Implementations return whatever subset of the three fields they could
/// find. A response that arrives but cannot be understood should come back as
/// an empty record, not an error; errors are reserved for the collaborator
/// being unreachable.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    async fn extract(&self, history: &[Turn]) -> Result<ShipmentRecord, ExtractError>;
}

/// Build the extractor selected in configuration.
pub fn build_extractor(config: &ExtractionConfig) -> Result<Arc<dyn Extractor>, ExtractError> {
    let extractor: Arc<dyn Extractor> = match config.strategy {
        ExtractionStrategy::Pattern => Arc::new(PatternExtractor::new()),
        ExtractionStrategy::Remote => Arc::new(RemoteExtractor::new(&config.remote)?),
        ExtractionStrategy::Gemini => Arc::new(GeminiExtractor::from_env(&config.gemini)?),
    };
    tracing::info!(extractor = extractor.name(), "Extraction strategy ready");
    Ok(extractor)
}

/// Read a `shipment` object in the backend wire shape.
///
/// Missing, null or non-string fields come back unset; a non-object yields
/// an empty record.
pub fn shipment_from_value(value: Option<&Value>) -> ShipmentRecord {
    let Some(obj) = value.and_then(Value::as_object) else {
        return ShipmentRecord::empty();
    };
    let field = |name: &str| {
        obj.get(name)
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    };
    ShipmentRecord {
        origin_city: field("ship_from_city"),
        destination_city: field("ship_to_city"),
        ship_date_or_time: field("ship_date"),
    }
}

/// Flatten turns into a `ROLE: content` transcript, one turn per line.
pub fn transcript(history: &[Turn]) -> String {
    history
        .iter()
        .map(|t| format!("{}: {}", t.role.transcript_label(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}
