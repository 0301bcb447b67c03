use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use super::AppState;
use crate::ProxyError;
use crate::models::{WeatherParams, WeatherQuery, WeatherResult};

/// GET /api/weather?lat=..&lng=..&date=..
pub async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<WeatherResult>, ProxyError> {
    let Query(params) = params.map_err(|e| ProxyError::validation(e.body_text()))?;
    let query = WeatherQuery::try_from(params)?;
    let result = state.weather.day_forecast(&query).await?;
    Ok(Json(result))
}
