//! Slot-filling dialogue engine.
//!
//! One call to [`DialogueEngine::advance`] is one assistant turn: extract
//! candidates from the history, clean them, merge them into the previous
//! record and choose the next prompt.

use std::sync::Arc;

use courier_core::{DialogueState, ShipmentRecord, Slot, Turn};

use crate::clean::clean_record;
use crate::extract::Extractor;
use crate::prompts;

/// What happened to extraction during one `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// No user turn yet; the extractor was not called.
    Skipped,
    /// Extraction succeeded; `filled` lists slots newly set or changed.
    Extracted { filled: Vec<Slot> },
    /// The extractor failed; the previous record was kept as is.
    Failed,
}

/// Result of one dialogue step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub reply: String,
    pub record: ShipmentRecord,
    pub state: DialogueState,
    pub outcome: ExtractionOutcome,
}

impl Advance {
    fn new(reply: String, record: ShipmentRecord, outcome: ExtractionOutcome) -> Self {
        let state = DialogueState::of(&record);
        Self {
            reply,
            record,
            state,
            outcome,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == DialogueState::Complete
    }
}

/// Stateless engine around an injected extractor.
///
/// Cheap to share: clone the `Arc` or wrap the engine itself in one.
pub struct DialogueEngine {
    extractor: Arc<dyn Extractor>,
}

impl DialogueEngine {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Produce the next assistant turn.
    ///
    /// `history` must already contain the newest user turn. Extraction
    /// failures never propagate: they become the transient-failure reply with
    /// `previous` returned untouched.
    pub async fn advance(&self, history: &[Turn], previous: &ShipmentRecord) -> Advance {
        if !history.iter().any(Turn::is_user) {
            tracing::debug!("No user turn yet, skipping extraction");
            return Advance::new(
                prompts::reply_for(previous, &[]),
                previous.clone(),
                ExtractionOutcome::Skipped,
            );
        }

        let candidate = match self.extractor.extract(history).await {
            Ok(candidate) => clean_record(&candidate),
            Err(e) => {
                tracing::warn!(
                    extractor = self.extractor.name(),
                    error = %e,
                    "Extraction failed, keeping previous record"
                );
                return Advance::new(
                    prompts::TRANSIENT_FAILURE.to_string(),
                    previous.clone(),
                    ExtractionOutcome::Failed,
                );
            }
        };

        let (record, filled) = previous.merge(&candidate);
        let reply = prompts::reply_for(&record, &filled);
        let advance = Advance::new(reply, record, ExtractionOutcome::Extracted { filled });

        tracing::debug!(
            extractor = self.extractor.name(),
            state = %advance.state,
            "Dialogue advanced"
        );
        advance
    }
}
