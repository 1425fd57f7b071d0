use anyhow::Result;
use reqwest::{Client, StatusCode};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::error::ForecastError;
use crate::formatters::format_records;
use crate::models::{display_label, GetForecastRequest, LocationSelector, NormalizeOptions, ValueFormat};
use crate::normalizer::{location_names, normalize};

/// Forecast service that handles MCP requests
#[derive(Clone)]
pub struct Forecast {
    client: Arc<Client>,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

impl Forecast {
    /// Creates a new Forecast service instance
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    /// Fetches the raw forecast payload, optionally filtered to one location
    async fn fetch_forecast(&self, location: Option<&str>) -> Result<Value, ForecastError> {
        let url = format!("{}/{}", self.config.api_base, self.config.dataset);

        let mut query = vec![
            ("Authorization", self.config.api_key.as_str()),
            ("format", "JSON"),
        ];
        if let Some(location) = location {
            query.push(("LocationName", location));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_response(status, &body)
    }

    /// Requested location, else the configured default
    fn resolve_location<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(self.config.default_location.as_deref())
    }
}

/// A failing status is a transport problem; an undecodable body is a payload problem
fn decode_response(status: StatusCode, body: &str) -> Result<Value, ForecastError> {
    if !status.is_success() {
        return Err(ForecastError::transport(format!(
            "Request failed with status: {}",
            status
        )));
    }

    serde_json::from_str(body)
        .map_err(|e| ForecastError::unexpected(format!("response body is not JSON: {}", e)))
}

fn to_mcp_error(e: ForecastError) -> McpError {
    if e.is_transport() {
        tracing::error!("Forecast fetch failed: {}", e);
    } else {
        tracing::warn!("Forecast request failed: {}", e);
    }
    let message = format!("{} ({})", e.user_message(), e);
    match e {
        ForecastError::LocationNotFound { .. } => McpError::invalid_params(message, None),
        _ => McpError::internal_error(message, None),
    }
}

#[tool_handler]
impl ServerHandler for Forecast {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cwa-forecast".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "A weekly weather forecast service powered by the Central Weather Administration \
                open data API. Provides 12-hour forecast intervals for Taiwanese counties and cities."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Forecast {
    /// Gets the weekly forecast for one location
    #[tool(description = "Get the weekly weather forecast for a Taiwanese county or city. Provide the location name exactly as published (e.g., '雲林縣', '臺北市'); omit it to use the default location. Optional format: 'text' (default), 'table', 'csv' or 'json'. Set 'raw' to drop unit suffixes, and 'columns' to choose element columns (e.g. 'PoP12h', '紫外線指數').")]
    async fn get_forecast(
        &self,
        Parameters(request): Parameters<GetForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        let location = self.resolve_location(request.location.as_deref());
        tracing::info!("Getting forecast for location: {:?}", location);

        let body = self.fetch_forecast(location).await.map_err(to_mcp_error)?;

        let mut options = NormalizeOptions::new(LocationSelector::from_name(location));
        if request.raw.unwrap_or(false) {
            options = options.with_value_format(ValueFormat::Raw);
        }
        if let Some(columns) = request.columns.as_ref().filter(|c| !c.is_empty()) {
            options = options.with_columns(columns.iter().map(|c| display_label(c)));
        }
        let forecast = normalize(&body, &options).map_err(to_mcp_error)?;
        tracing::debug!(
            "Normalized {} forecast intervals for {}",
            forecast.records.len(),
            forecast.location
        );

        let formatted = format_records(
            &forecast.location,
            &forecast.records,
            request.format.unwrap_or_default(),
        )
        .map_err(|e| McpError::internal_error(format!("Failed to format forecast: {}", e), None))?;

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Lists the locations the dataset publishes
    #[tool(description = "List the location names available in the forecast dataset.")]
    async fn list_locations(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Listing forecast locations");

        let body = self.fetch_forecast(None).await.map_err(to_mcp_error)?;
        let names = location_names(&body).map_err(to_mcp_error)?;

        let output = if names.is_empty() {
            "No locations published.".to_string()
        } else {
            format!("Available locations:\n{}", names.join("\n"))
        };

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}
