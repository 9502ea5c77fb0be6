//! Weather forecast tool.
//!
//! Fetches the 36-hour forecast dataset from the Central Weather
//! Administration (CWA) Open Data API. An API key is optional; the API
//! serves a limited dataset without one.
//! API reference: https://opendata.cwa.gov.tw/dist/opendata-swagger.html

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::core::config::CredentialsConfig;
use crate::tools::error::ToolError;
use crate::tools::handler::{Arguments, ToolDescriptor, ToolHandler};
use crate::tools::schema::{InputSchema, ParamType};

/// Fetches 36-hour weather forecasts from the CWA Open Data API.
#[derive(Debug, Clone)]
pub struct WeatherForecastTool {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl WeatherForecastTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "get_weather_forecast";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Fetch a 36-hour weather forecast for Taiwan from the CWA Open Data API. \
         Optionally filter the forecast by city or county name; without a filter, \
         all available locations are returned.";

    /// The CWA 36-hour forecast dataset.
    const DATASTORE_URL: &'static str =
        "https://opendata.cwa.gov.tw/api/v1/rest/datastore/F-C0032-001";

    pub fn new(credentials: &CredentialsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: credentials.cwa_api_key.clone(),
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
            .optional(
                "location_name",
                ParamType::String,
                "City or county name to filter the forecast (e.g. \"Taipei City\")",
            )
            .build()
    }

    /// Assemble the upstream query string from validated arguments.
    fn build_query(&self, arguments: &Arguments) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(key) = &self.api_key {
            query.push(("Authorization", key.clone()));
        }
        if let Some(location) = arguments.get("location_name").and_then(Value::as_str) {
            query.push(("locationName", location.to_string()));
        }
        query
    }
}

#[async_trait::async_trait]
impl ToolHandler for WeatherForecastTool {
    async fn call(&self, arguments: Arguments) -> Result<Value, ToolError> {
        let query = self.build_query(&arguments);
        info!("Fetching CWA 36-hour forecast");

        // Error messages go to the client; `without_url` keeps the query
        // string (and with it the API key) out of them.
        let response = self
            .http
            .get(Self::DATASTORE_URL)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e.without_url(), "weather API request failed");
                ToolError::execution_failed("weather API request failed")
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution_failed(format!(
                "weather API returned HTTP {status}"
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            warn!(error = %e.without_url(), "weather API response was not valid JSON");
            ToolError::execution_failed("weather API returned a malformed response")
        })
    }
}
