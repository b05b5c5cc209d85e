//! Error types for the dialogue engine and its extractors.

use courier_core::error::CourierError;

/// Input rejected before the engine runs.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("history exceeds maximum of {0} turns")]
    HistoryTooLong(usize),
}

/// Failures of an extraction collaborator.
///
/// None of these end a conversation: the engine turns them into a
/// transient-failure reply and keeps the previous record.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("extraction service unavailable: {0}")]
    Unavailable(String),
    #[error("extraction service timed out")]
    Timeout,
    #[error("extraction service returned HTTP {0}")]
    Status(u16),
    #[error("extractor not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout
        } else if let Some(status) = err.status() {
            ExtractError::Status(status.as_u16())
        } else {
            ExtractError::Unavailable(err.to_string())
        }
    }
}

impl From<ExtractError> for CourierError {
    fn from(err: ExtractError) -> Self {
        CourierError::Extraction(err.to_string())
    }
}
