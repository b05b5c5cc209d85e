//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use courier_core::config::CourierConfig;
use courier_dialogue::DialogueEngine;

/// Shared application state.
///
/// Everything here is immutable after startup; conversations live on the
/// client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CourierConfig>,
    pub engine: Arc<DialogueEngine>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: CourierConfig, engine: DialogueEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            start_time: Instant::now(),
        }
    }
}
