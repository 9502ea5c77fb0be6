//! Flight search tool.
//!
//! Searches for flights through the SerpAPI Google Flights engine.
//! API reference: https://serpapi.com/google-flights-api

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::core::config::CredentialsConfig;
use crate::tools::error::ToolError;
use crate::tools::handler::{Arguments, ToolDescriptor, ToolHandler};
use crate::tools::schema::{InputSchema, ParamType};

/// Searches flights via the SerpAPI Google Flights API.
#[derive(Debug, Clone)]
pub struct FlightSearchTool {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl FlightSearchTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "search_flights";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search for flights between two airports, including prices, schedules, and \
         available routes. Dates use YYYY-MM-DD format; passing a return date makes \
         the search a round trip.";

    const SEARCH_URL: &'static str = "https://serpapi.com/search";

    pub fn new(credentials: &CredentialsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: credentials.serpapi_api_key.clone(),
        }
    }

    /// Build the registration descriptor for this tool.
    pub fn descriptor(credentials: &CredentialsConfig) -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(),
            Arc::new(Self::new(credentials)),
        )
    }

    fn schema() -> InputSchema {
        InputSchema::builder()
            .required("origin", ParamType::String, "Origin airport code (e.g. \"JFK\", \"TPE\")")
            .required(
                "destination",
                ParamType::String,
                "Destination airport code (e.g. \"SFO\", \"LHR\")",
            )
            .required(
                "departure_date",
                ParamType::String,
                "Departure date in YYYY-MM-DD format",
            )
            .optional(
                "return_date",
                ParamType::String,
                "Return date in YYYY-MM-DD format for round trips",
            )
            .optional("adults", ParamType::Integer, "Number of adult passengers (default: 1)")
            .optional("children", ParamType::Integer, "Number of child passengers (default: 0)")
            .optional("infants", ParamType::Integer, "Number of infant passengers (default: 0)")
            .optional("currency", ParamType::String, "Currency code for prices (default: TWD)")
            .build()
    }

    /// Assemble the upstream query from validated arguments.
    ///
    /// The API key is appended separately in the handler so it never appears
    /// in anything this function's output is used for.
    fn build_params(arguments: &Arguments) -> Vec<(&'static str, String)> {
        let str_arg = |name: &str| arguments.get(name).and_then(Value::as_str);
        let int_arg = |name: &str, default: i64| {
            arguments
                .get(name)
                .and_then(Value::as_i64)
                .unwrap_or(default)
        };

        let mut params = vec![
            ("engine", "google_flights".to_string()),
            ("departure_id", str_arg("origin").unwrap_or_default().to_string()),
            ("arrival_id", str_arg("destination").unwrap_or_default().to_string()),
            (
                "outbound_date",
                str_arg("departure_date").unwrap_or_default().to_string(),
            ),
            ("adults", int_arg("adults", 1).to_string()),
            ("children", int_arg("children", 0).to_string()),
            ("infants", int_arg("infants", 0).to_string()),
            ("currency", str_arg("currency").unwrap_or("TWD").to_string()),
        ];

        if let Some(return_date) = str_arg("return_date") {
            params.push(("return_date", return_date.to_string()));
        }

        params
    }
}

#[async_trait::async_trait]
impl ToolHandler for FlightSearchTool {
    async fn call(&self, arguments: Arguments) -> Result<Value, ToolError> {
        let Some(api_key) = &self.api_key else {
            return Err(ToolError::execution_failed(
                "SERPAPI_API_KEY is not set; a SerpAPI key is required for flight search",
            ));
        };

        let mut params = Self::build_params(&arguments);
        params.push(("api_key", api_key.clone()));

        info!("Searching flights via SerpAPI");

        let response = self
            .http
            .get(Self::SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e.without_url(), "flight search request failed");
                ToolError::execution_failed("flight search request failed")
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution_failed(format!(
                "flight search API returned HTTP {status}"
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            warn!(error = %e.without_url(), "flight search response was not valid JSON");
            ToolError::execution_failed("flight search API returned a malformed response")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: &str) -> Arguments {
        serde_json::from_str(json).unwrap()
    }

    fn one_way_args() -> Arguments {
        args(r#"{"origin": "TPE", "destination": "NRT", "departure_date": "2025-03-01"}"#)
    }

    #[test]
    fn test_params_apply_passenger_defaults() {
        let params = FlightSearchTool::build_params(&one_way_args());
        assert!(params.contains(&("engine", "google_flights".to_string())));
        assert!(params.contains(&("departure_id", "TPE".to_string())));
        assert!(params.contains(&("arrival_id", "NRT".to_string())));
        assert!(params.contains(&("adults", "1".to_string())));
        assert!(params.contains(&("children", "0".to_string())));
        assert!(params.contains(&("currency", "TWD".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "return_date"));
    }

    #[test]
    fn test_params_include_return_date_for_round_trip() {
        let params = FlightSearchTool::build_params(&args(
            r#"{"origin": "TPE", "destination": "NRT", "departure_date": "2025-03-01",
                "return_date": "2025-03-08", "adults": 2, "currency": "USD"}"#,
        ));
        assert!(params.contains(&("return_date", "2025-03-08".to_string())));
        assert!(params.contains(&("adults", "2".to_string())));
        assert!(params.contains(&("currency", "USD".to_string())));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let tool = FlightSearchTool::new(&CredentialsConfig::default());
        let err = tool.call(one_way_args()).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
        assert!(err.to_string().contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn test_schema_required_parameters() {
        let json = FlightSearchTool::schema().to_json();
        assert_eq!(
            json["required"],
            serde_json::json!(["origin", "destination", "departure_date"])
        );
        assert_eq!(json["properties"]["adults"]["type"], "integer");
    }
}
