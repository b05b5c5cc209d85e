//! Slot-filling dialogue engine for shipment bookings.
//!
//! Collects origin, destination and date/time through conversational turns.
//! Extraction is delegated to a pluggable [`Extractor`]; the engine owns the
//! merge rules and the prompting policy.

pub mod clean;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod extract;
pub mod json;
pub mod prompts;

pub use conversation::Conversation;
pub use engine::{Advance, DialogueEngine, ExtractionOutcome};
pub use error::{DialogueError, ExtractError};
pub use extract::{
    build_extractor, Extractor, GeminiExtractor, PatternExtractor, RemoteExtractor,
};
