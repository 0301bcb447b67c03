//! `TripFlow` backend - weather lookups and AI day planning for the trip planner
//!
//! The crate forwards browser requests to WeatherAPI.com and OpenRouter and
//! reshapes their answers into small JSON payloads for the front-end.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::TripflowConfig;
pub use error::ProxyError;
pub use llm::CompletionClient;
pub use models::{AnalysisRequest, AutofillRequest, WeatherQuery, WeatherResult};
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
