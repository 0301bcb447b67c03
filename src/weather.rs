//! WeatherAPI.com client
//!
//! Looks up a single forecast day for a coordinate pair and trims the provider's
//! payload down to what the front-end renders.

use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::ProxyError;
use crate::client::build_client;
use crate::config::WeatherConfig;
use crate::models::{WeatherQuery, WeatherResult};

/// Reported when the provider rejects a lookup without saying why.
pub const FALLBACK_ERROR_MESSAGE: &str = "Unknown WeatherAPI error. You might have to make the date closer to the current day to view weather.";

/// Error envelope of a non-200 WeatherAPI response
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The parts of a successful forecast response we keep
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: ProviderLocation,
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct ProviderLocation {
    name: String,
    region: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    forecastday: Vec<Value>,
}

#[derive(Clone)]
pub struct WeatherClient {
    http: ClientWithMiddleware,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> anyhow::Result<Self> {
        let http = build_client(config.timeout_seconds, config.max_retries)?;
        Ok(Self { http, config })
    }

    /// Fetch the forecast day for `query`.
    ///
    /// Non-200 answers keep the provider's status; their message comes from the
    /// provider's error envelope or falls back to [`FALLBACK_ERROR_MESSAGE`].
    #[instrument(skip(self), fields(lat = %query.latitude, lng = %query.longitude, date = ?query.date))]
    pub async fn day_forecast(&self, query: &WeatherQuery) -> Result<WeatherResult, ProxyError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| ProxyError::configuration("Server missing weather API key"))?;

        debug!("Requesting forecast from WeatherAPI");
        let response = self
            .http
            .get(self.forecast_url(api_key, query))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if status != StatusCode::OK {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            warn!(status = status.as_u16(), "WeatherAPI rejected the lookup: {message}");
            return Err(ProxyError::upstream(status, message));
        }

        let forecast: ForecastResponse =
            serde_json::from_slice(&body).map_err(transport_error)?;
        let days = forecast.forecast.forecastday.len();
        let first_day = forecast
            .forecast
            .forecastday
            .into_iter()
            .next()
            .ok_or_else(|| transport_error("response contained no forecast days"))?;

        let location = format!(
            "{}, {}, {}",
            forecast.location.name, forecast.location.region, forecast.location.country
        );
        info!(%location, days, "Retrieved forecast");

        Ok(WeatherResult {
            location,
            forecast: vec![first_day],
        })
    }

    fn forecast_url(&self, api_key: &str, query: &WeatherQuery) -> String {
        let coordinates = format!("{},{}", query.latitude, query.longitude);
        let mut url = format!(
            "{}/forecast.json?key={}&q={}&aqi=no&alerts=no",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(api_key),
            urlencoding::encode(&coordinates),
        );
        if let Some(date) = &query.date {
            url.push_str("&dt=");
            url.push_str(&urlencoding::encode(date));
        }
        url
    }
}

fn transport_error(error: impl std::fmt::Display) -> ProxyError {
    ProxyError::transport(format!("Weather API error: {error}"))
}
