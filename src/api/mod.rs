use axum::{
    Router,
    routing::{get, post},
};

use crate::config::TripflowConfig;
use crate::llm::CompletionClient;
use crate::weather::WeatherClient;

pub mod planner;
pub mod weather;

/// Read-only dependencies shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherClient,
    pub completions: CompletionClient,
}

impl AppState {
    pub fn from_config(config: &TripflowConfig) -> anyhow::Result<Self> {
        Ok(Self {
            weather: WeatherClient::new(config.weather.clone())?,
            completions: CompletionClient::new(config.llm.clone())?,
        })
    }
}

/// Routes served under `/api`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(weather::get_weather))
        .route(
            "/analyze-day",
            post(planner::analyze_day).options(planner::preflight),
        )
        .route(
            "/autofill-day",
            post(planner::autofill_day).options(planner::preflight),
        )
        .with_state(state)
}
