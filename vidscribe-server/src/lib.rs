//! HTTP surface for the vidscribe pipeline.
//!
//! - `POST /transcribe` runs one [`vidscribe::Pipeline`] request
//! - `GET /health` liveness probe
//! - `GET /languages` advertised language table
//! - `/` and `/assets/*` serve a prebuilt frontend when one is configured

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorResponse};
pub use router::create_router;
pub use state::AppState;
