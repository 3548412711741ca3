//! HTTP adapter for the route optimization backend.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::location::Place;
use crate::traits::{RouteOptimizer, TripNamer};

pub const BACKEND_URL_ENV: &str = "TRIP_PLANNER_BACKEND_URL";
pub const TIMEOUT_ENV: &str = "TRIP_PLANNER_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub base_url: String,
    pub endpoint: String,
    pub naming_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            endpoint: "/submit-itinerary".to_string(),
            naming_endpoint: "/generate-trip-name".to_string(),
            timeout_secs: 30,
        }
    }
}

impl OptimizerConfig {
    /// Defaults overridden by `TRIP_PLANNER_BACKEND_URL` and
    /// `TRIP_PLANNER_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the env keys.
    /// Empty urls and zero or unparsable timeouts are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BACKEND_URL_ENV) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                warn!(var = BACKEND_URL_ENV, "ignoring empty backend url");
            } else {
                config.base_url = url.to_string();
            }
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => warn!(var = TIMEOUT_ENV, value = %raw, "invalid timeout, using default"),
            }
        }
        config
    }

    pub fn url(&self) -> String {
        self.url_for(&self.endpoint)
    }

    pub fn naming_url(&self) -> String {
        self.url_for(&self.naming_endpoint)
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backend returned an empty answer")]
    EmptyResponse,
}

/// One stop in an optimization request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeStop {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Request body sent to the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeRequest {
    pub locations: Vec<OptimizeStop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OptimizeResponse {
    optimized_route: Option<Vec<usize>>,
}

#[derive(Debug, Serialize)]
struct NamingStop<'a> {
    name: &'a str,
    address: &'a str,
}

#[derive(Debug, Serialize)]
struct NamingRequest<'a> {
    locations: Vec<NamingStop<'a>>,
}

#[derive(Debug, Deserialize)]
struct NamingResponse {
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpRouteOptimizer {
    config: OptimizerConfig,
    client: reqwest::blocking::Client,
}

impl HttpRouteOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn post_json<T: Serialize + ?Sized>(
        &self,
        url: String,
        body: &T,
    ) -> Result<reqwest::blocking::Response, OptimizeError> {
        let response = self.client.post(url).json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OptimizeError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl RouteOptimizer for HttpRouteOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<Vec<usize>, OptimizeError> {
        let url = self.config.url();
        info!(%url, stops = request.locations.len(), "requesting optimized route");

        self.post_json(url, request)?
            .json::<OptimizeResponse>()?
            .optimized_route
            .ok_or(OptimizeError::EmptyResponse)
    }
}

impl TripNamer for HttpRouteOptimizer {
    fn name_trip(&self, places: &[Place]) -> Result<String, OptimizeError> {
        let url = self.config.naming_url();
        debug!(%url, stops = places.len(), "requesting trip name");

        let body = NamingRequest {
            locations: places
                .iter()
                .map(|place| NamingStop {
                    name: &place.name,
                    address: place.address.as_deref().unwrap_or_default(),
                })
                .collect(),
        };
        self.post_json(url, &body)?
            .json::<NamingResponse>()?
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or(OptimizeError::EmptyResponse)
    }
}
