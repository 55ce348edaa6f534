//! Thin proxy to the external analytics backend.
//!
//! All statistics are computed upstream; this layer only maps logical
//! endpoint names to backend paths, relays JSON, and classifies failures.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::config::BackendConfig;

/// Logical datasets the dashboard may request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TopOperators,
    MonthlyStats,
    WeeklyPatterns,
    ActivityGaps,
    OperatorDashboard,
    Anomalies,
    GeographicAnalysis,
}

impl Endpoint {
    /// Backend sub-path for this dataset
    pub fn backend_path(self) -> &'static str {
        match self {
            Endpoint::TopOperators => "top-operators",
            Endpoint::MonthlyStats => "monthly-stats",
            Endpoint::WeeklyPatterns => "weekly-patterns",
            Endpoint::ActivityGaps => "activity-gaps",
            Endpoint::OperatorDashboard => "operator-dashboard",
            Endpoint::Anomalies => "anomalies",
            Endpoint::GeographicAnalysis => "geo-distributions",
        }
    }

    /// Name of the limit query parameter, where the dataset takes one
    pub fn limit_param(self) -> Option<&'static str> {
        match self {
            Endpoint::TopOperators => Some("limit"),
            Endpoint::MonthlyStats => Some("top_x"),
            _ => None,
        }
    }

    /// Pauses and anomalies are computed over the full channel set and
    /// ignore the restricted-subset filter.
    pub fn supports_subset_filter(self) -> bool {
        !matches!(self, Endpoint::ActivityGaps | Endpoint::Anomalies)
    }
}

impl FromStr for Endpoint {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-operators" => Ok(Endpoint::TopOperators),
            "monthly-stats" => Ok(Endpoint::MonthlyStats),
            "weekly-patterns" => Ok(Endpoint::WeeklyPatterns),
            "activity-gaps" => Ok(Endpoint::ActivityGaps),
            "operator-dashboard" => Ok(Endpoint::OperatorDashboard),
            "anomalies" => Ok(Endpoint::Anomalies),
            "geographic-analysis" => Ok(Endpoint::GeographicAnalysis),
            other => Err(ProxyError::InvalidEndpoint(other.to_string())),
        }
    }
}

/// Optional query parameters forwarded to the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchParams {
    pub limit: Option<u32>,
    pub in_app_only: Option<bool>,
}

impl FetchParams {
    pub fn new(limit: Option<u32>, in_app_only: Option<bool>) -> Self {
        Self { limit, in_app_only }
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("backend call failed: {status} {status_text}")]
    RemoteCall { status: u16, status_text: String },
    #[error("network error reaching backend: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unknown logical endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("unexpected backend payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

/// Dataset access seam; the dashboard services only see this trait so
/// tests can substitute a stub backend.
#[async_trait]
pub trait InsightsApi: Send + Sync {
    /// Fetch one logical dataset as raw JSON
    async fn fetch(&self, endpoint: Endpoint, params: FetchParams) -> ProxyResult<Value>;

    /// Fetch the detail view for a single operator
    async fn fetch_operator(&self, operator_id: &str) -> ProxyResult<Value>;

    /// Forward a raw SQL query to the backend's execution endpoint and
    /// relay its structured result or error payload verbatim. No local
    /// validation or sanitization happens here.
    async fn execute_query(&self, query: &str) -> ProxyResult<Value>;
}

/// reqwest-backed client for the analytics backend
pub struct InsightsClient {
    http: Client,
    backend: BackendConfig,
}

impl InsightsClient {
    pub fn new(backend: BackendConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("operlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, backend })
    }

    async fn relay_json(&self, response: reqwest::Response) -> ProxyResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::RemoteCall {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl InsightsApi for InsightsClient {
    async fn fetch(&self, endpoint: Endpoint, params: FetchParams) -> ProxyResult<Value> {
        let url = self.backend.insights_url(endpoint.backend_path());

        let mut query: Vec<(&str, String)> = Vec::new();
        if let (Some(name), Some(limit)) = (endpoint.limit_param(), params.limit) {
            query.push((name, limit.to_string()));
        }
        if let (true, Some(flag)) = (endpoint.supports_subset_filter(), params.in_app_only) {
            query.push(("in_app_only", flag.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .inspect_err(|e| error!("Request to {url} failed: {e}"))?;

        self.relay_json(response).await.inspect_err(|e| {
            error!("Fetching {} failed: {e}", endpoint.backend_path());
        })
    }

    async fn fetch_operator(&self, operator_id: &str) -> ProxyResult<Value> {
        let url = self
            .backend
            .insights_url(&format!("operateur/{operator_id}"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .inspect_err(|e| error!("Request to {url} failed: {e}"))?;
        self.relay_json(response)
            .await
            .inspect_err(|e| error!("Fetching operator {operator_id} failed: {e}"))
    }

    async fn execute_query(&self, query: &str) -> ProxyResult<Value> {
        let url = self.backend.insights_url("execute-query");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .inspect_err(|e| error!("Query execution request failed: {e}"))?;

        // The execution endpoint reports query errors as a structured
        // payload; relay whatever parses, classify the rest.
        let status = response.status();
        match response.json::<Value>().await {
            Ok(payload) => Ok(payload),
            Err(_) if !status.is_success() => {
                error!("Query execution failed: {status}");
                Err(ProxyError::RemoteCall {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                })
            }
            Err(e) => Err(ProxyError::Network(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_names_parse_to_endpoints() {
        assert_eq!(
            "top-operators".parse::<Endpoint>().unwrap(),
            Endpoint::TopOperators
        );
        assert_eq!(
            "geographic-analysis".parse::<Endpoint>().unwrap(),
            Endpoint::GeographicAnalysis
        );
        assert!(matches!(
            "nope".parse::<Endpoint>(),
            Err(ProxyError::InvalidEndpoint(name)) if name == "nope"
        ));
    }

    #[test]
    fn limit_param_name_depends_on_endpoint() {
        assert_eq!(Endpoint::TopOperators.limit_param(), Some("limit"));
        assert_eq!(Endpoint::MonthlyStats.limit_param(), Some("top_x"));
        assert_eq!(Endpoint::WeeklyPatterns.limit_param(), None);
    }

    #[test]
    fn gaps_and_anomalies_ignore_the_subset_filter() {
        assert!(!Endpoint::ActivityGaps.supports_subset_filter());
        assert!(!Endpoint::Anomalies.supports_subset_filter());
        assert!(Endpoint::OperatorDashboard.supports_subset_filter());
    }
}
