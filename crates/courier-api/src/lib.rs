//! Courier API crate - axum HTTP server for the shipment dialogue.
//!
//! Exposes a stateless `POST /chat` turn endpoint and a health check. The
//! client sends the whole history each time; the server keeps nothing
//! between requests.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
