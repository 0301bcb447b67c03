//! Request and response shapes exchanged with the front-end
//!
//! Everything here lives for a single request. Field names follow the front-end's
//! camelCase JSON.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::ProxyError;

/// Query string of `GET /api/weather`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub date: Option<String>,
}

/// A validated weather lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub latitude: String,
    pub longitude: String,
    /// Target day; `None` lets the provider pick its default
    pub date: Option<String>,
}

impl TryFrom<WeatherParams> for WeatherQuery {
    type Error = ProxyError;

    fn try_from(params: WeatherParams) -> Result<Self, Self::Error> {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        match (present(params.lat), present(params.lng)) {
            (Some(latitude), Some(longitude)) => Ok(Self {
                latitude,
                longitude,
                date: present(params.date),
            }),
            _ => Err(ProxyError::validation("lat and lng are required")),
        }
    }
}

/// Trimmed weather payload returned to the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherResult {
    /// "name, region, country"
    pub location: String,
    /// Exactly one forecast day, as the provider sent it
    pub forecast: Vec<Value>,
}

/// Body of `POST /api/analyze-day`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub activities: Vec<Value>,
    pub metrics: Map<String, Value>,
    pub location_context: Option<String>,
}

/// Body of `POST /api/autofill-day`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutofillRequest {
    pub empty_slots: Vec<Value>,
    pub existing_activities: Vec<Value>,
    pub location_context: Option<String>,
}

/// One activity the model is asked to produce. This layer never validates what
/// the model actually returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySuggestion {
    pub name: String,
    pub start: String,
    pub end: String,
    pub expected_cost: f64,
    pub location: String,
    pub coords: Coordinates,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Envelope the autofill prompt asks the model to answer with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivitySuggestions {
    pub activities: Vec<ActivitySuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutofillResponse {
    pub result: String,
}

/// Parse a planner request body.
///
/// An empty body, JSON `null`, `{}`, `[]` or `""` is "missing data". Any other
/// top-level value must be an object; fields that do not fit `T` are reported with
/// the parser's message. Absent fields take their defaults.
pub fn parse_planner_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProxyError::validation("Missing data"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ProxyError::validation(format!("Invalid JSON body: {e}")))?;

    let is_missing = match &value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    };
    if is_missing {
        return Err(ProxyError::validation("Missing data"));
    }
    if !value.is_object() {
        return Err(ProxyError::validation("Request body must be a JSON object"));
    }

    serde_json::from_value(value)
        .map_err(|e| ProxyError::validation(format!("Invalid request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn params(lat: Option<&str>, lng: Option<&str>, date: Option<&str>) -> WeatherParams {
        WeatherParams {
            lat: lat.map(str::to_string),
            lng: lng.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_weather_query_from_params() {
        let query = WeatherQuery::try_from(params(Some("40.7"), Some("-74.0"), Some("2024-06-01")))
            .unwrap();
        assert_eq!(query.latitude, "40.7");
        assert_eq!(query.longitude, "-74.0");
        assert_eq!(query.date.as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn test_weather_query_empty_date_is_absent() {
        let query = WeatherQuery::try_from(params(Some("1"), Some("2"), Some(""))).unwrap();
        assert!(query.date.is_none());
    }

    #[rstest]
    #[case(None, Some("-74.0"))]
    #[case(Some("40.7"), None)]
    #[case(Some(""), Some("-74.0"))]
    #[case(Some("40.7"), Some("  "))]
    #[case(None, None)]
    fn test_weather_query_requires_coordinates(
        #[case] lat: Option<&str>,
        #[case] lng: Option<&str>,
    ) {
        let err = WeatherQuery::try_from(params(lat, lng, None)).unwrap_err();
        assert!(matches!(err, ProxyError::Validation { .. }));
        assert_eq!(err.to_string(), "lat and lng are required");
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"  \n".as_slice())]
    #[case(b"null".as_slice())]
    #[case(b"{}".as_slice())]
    #[case(b"[]".as_slice())]
    #[case(b"\"\"".as_slice())]
    fn test_planner_body_missing(#[case] body: &[u8]) {
        let err = parse_planner_body::<AnalysisRequest>(body).unwrap_err();
        assert_eq!(err.to_string(), "Missing data");
    }

    #[test]
    fn test_planner_body_defaults_absent_fields() {
        let request: AnalysisRequest = parse_planner_body(br#"{"date": "2024-06-01"}"#).unwrap();
        assert_eq!(request.date.as_deref(), Some("2024-06-01"));
        assert!(request.activities.is_empty());
        assert!(request.metrics.is_empty());
        assert!(request.start_time.is_none());
    }

    #[test]
    fn test_planner_body_camel_case_fields() {
        let request: AutofillRequest = parse_planner_body(
            json!({
                "emptySlots": ["9:00 AM - 10:00 AM"],
                "existingActivities": [{"name": "Museum"}],
                "locationContext": "Paris, France"
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(request.empty_slots.len(), 1);
        assert_eq!(request.existing_activities.len(), 1);
        assert_eq!(request.location_context.as_deref(), Some("Paris, France"));
    }

    #[test]
    fn test_planner_body_wrong_shape_is_validation_error() {
        let err = parse_planner_body::<AnalysisRequest>(br#"{"activities": "lots"}"#).unwrap_err();
        assert!(matches!(err, ProxyError::Validation { .. }));
        assert!(err.to_string().starts_with("Invalid request body"));
    }

    #[rstest]
    #[case(br#"["2024-06-01"]"#.as_slice())]
    #[case(b"42".as_slice())]
    #[case(b"true".as_slice())]
    #[case(br#""2024-06-01""#.as_slice())]
    fn test_planner_body_must_be_object(#[case] body: &[u8]) {
        let err = parse_planner_body::<AutofillRequest>(body).unwrap_err();
        assert!(matches!(err, ProxyError::Validation { .. }));
        assert_eq!(err.to_string(), "Request body must be a JSON object");
    }

    #[test]
    fn test_planner_body_malformed_json() {
        let err = parse_planner_body::<AnalysisRequest>(b"{not json").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON body"));
    }

    #[test]
    fn test_activity_suggestion_serializes_camel_case() {
        let suggestion = ActivitySuggestion {
            name: "Lunch".to_string(),
            start: "11:00".to_string(),
            end: "12:00".to_string(),
            expected_cost: 40.0,
            location: "Anaheim".to_string(),
            coords: Coordinates { lat: 33.8, lng: -117.9 },
        };
        let value = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(value["expectedCost"], json!(40.0));
        assert_eq!(value["coords"]["lng"], json!(-117.9));
    }
}
