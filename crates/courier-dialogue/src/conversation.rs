//! Per-conversation context: turn history plus the current record.

use courier_core::config::DialogueConfig;
use courier_core::{DialogueState, ShipmentRecord, Turn};
use uuid::Uuid;

use crate::engine::{Advance, DialogueEngine};
use crate::error::DialogueError;

/// Reject a user message that is blank or over the configured length.
///
/// Length is counted in characters, not bytes.
pub fn validate_user_message(text: &str, limits: &DialogueConfig) -> Result<(), DialogueError> {
    if text.trim().is_empty() {
        return Err(DialogueError::EmptyMessage);
    }
    if text.chars().count() > limits.max_message_length {
        return Err(DialogueError::MessageTooLong(limits.max_message_length));
    }
    Ok(())
}

/// One shipment booking conversation.
///
/// [`Conversation::submit`] takes `&mut self`, so at most one step can be in
/// flight. Nothing is written until the engine returns: dropping a pending
/// `submit` future leaves the conversation as it was.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: Uuid,
    turns: Vec<Turn>,
    record: ShipmentRecord,
    limits: DialogueConfig,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_limits(DialogueConfig::default())
    }

    pub fn with_limits(limits: DialogueConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            record: ShipmentRecord::empty(),
            limits,
        }
    }

    /// Send a user message and record the assistant's answer.
    pub async fn submit(
        &mut self,
        engine: &DialogueEngine,
        text: &str,
    ) -> Result<Advance, DialogueError> {
        validate_user_message(text, &self.limits)?;
        // The user turn plus the reply must still fit.
        if self.turns.len() + 2 > self.limits.max_history_turns {
            return Err(DialogueError::HistoryTooLong(self.limits.max_history_turns));
        }

        let mut history = self.turns.clone();
        history.push(Turn::user(text.trim()));

        let advance = engine.advance(&history, &self.record).await;

        history.push(Turn::assistant(advance.reply.clone()));
        self.turns = history;
        self.record = advance.record.clone();

        tracing::info!(
            conversation_id = %self.id,
            extractor = engine.extractor_name(),
            state = %advance.state,
            turns = self.turns.len(),
            "Conversation advanced"
        );
        Ok(advance)
    }

    /// The opening prompt, without recording anything.
    pub async fn greeting(&self, engine: &DialogueEngine) -> String {
        engine.advance(&self.turns, &self.record).await.reply
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn record(&self) -> &ShipmentRecord {
        &self.record
    }

    pub fn state(&self) -> DialogueState {
        DialogueState::of(&self.record)
    }

    pub fn is_complete(&self) -> bool {
        self.state() == DialogueState::Complete
    }
}
