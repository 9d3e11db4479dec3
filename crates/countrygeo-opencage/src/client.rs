use countrygeo_core::config::{LayeredConfig, DEFAULT_ENDPOINT};
use countrygeo_core::error::{CountryGeoError, Result};
use countrygeo_core::models::{CountryCode, GeoResultSet};
use countrygeo_core::ports::Geocoder;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::response::{into_result_set, OpenCageResponse};

/// OpenCage geocoder implementation
pub struct OpenCageGeocoder {
    /// Forward-geocoding endpoint (e.g., "https://api.opencagedata.com/geocode/v1/json")
    endpoint: String,

    /// API key sent with every request
    api_key: String,

    /// Language of the returned names
    language: String,

    /// Candidate limit for multi-result queries
    max_results: u32,

    /// Minimum spacing between two requests
    request_interval: Duration,

    /// HTTP client
    client: reqwest::Client,

    /// Runtime driving the async client from the synchronous port
    runtime: tokio::runtime::Runtime,

    last_request: Mutex<Option<Instant>>,
}

impl OpenCageGeocoder {
    /// Create a new geocoder for the default endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_ENDPOINT, Duration::from_secs(10))
    }

    /// Create a geocoder with a custom endpoint and request timeout
    pub fn with_options(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            CountryGeoError::GeocoderUnavailable {
                reason: format!("Failed to build HTTP client: {}", e),
                remediation: "Check the TLS configuration of this system".to_string(),
            }
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CountryGeoError::GeocoderUnavailable {
                reason: format!("Failed to create async runtime: {}", e),
                remediation: "Ensure tokio is properly configured".to_string(),
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            language: "en".to_string(),
            max_results: 10,
            request_interval: Duration::from_millis(1000),
            client,
            runtime,
            last_request: Mutex::new(None),
        })
    }

    /// Create from the layered configuration
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self::with_options(
            api_key,
            config.endpoint.value.clone(),
            Duration::from_secs(config.timeout_secs.value),
        )?
        .with_language(config.language.value.clone())
        .with_max_results(config.max_results.value)
        .with_request_interval(Duration::from_millis(config.request_interval_ms.value)))
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Build the request URL for a query
    pub fn request_url(
        &self,
        query: &str,
        country: Option<&CountryCode>,
        multiple: bool,
    ) -> std::result::Result<reqwest::Url, String> {
        let limit = if multiple { self.max_results } else { 1 };
        let mut params = vec![
            ("q", query.to_string()),
            ("key", self.api_key.clone()),
            ("language", self.language.clone()),
            ("limit", limit.to_string()),
            ("no_annotations", "1".to_string()),
        ];
        if let Some(country) = country {
            params.push(("countrycode", country.as_str().to_ascii_lowercase()));
        }
        reqwest::Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| format!("Invalid endpoint '{}': {}", self.endpoint, e))
    }

    /// Wait until the provider's rate limit allows another request
    async fn throttle(&self) {
        let wait = {
            let last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            last.and_then(|at| self.request_interval.checked_sub(at.elapsed()))
        };
        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    async fn fetch(&self, url: reqwest::Url) -> std::result::Result<OpenCageResponse, String> {
        self.throttle().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error("Failed to connect to OpenCage", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error("Failed to read response", &e))?;

        match serde_json::from_str::<OpenCageResponse>(&body) {
            // OpenCage describes key and quota problems in the body, whatever the HTTP status
            Ok(parsed) if parsed.status.is_some() || status.is_success() => Ok(parsed),
            Ok(_) => Err(format!("HTTP {}", status)),
            Err(_) if !status.is_success() => Err(format!("HTTP {}", status)),
            Err(e) => Err(format!("Failed to parse OpenCage response: {}", e)),
        }
    }

    /// reqwest errors print the request URL, key included
    fn transport_error(&self, context: &str, error: &reqwest::Error) -> String {
        format!("{}: {}", context, without_key(&error.to_string(), &self.api_key))
    }
}

impl Geocoder for OpenCageGeocoder {
    fn geocode(&self, query: &str, country: Option<&CountryCode>, multiple: bool) -> GeoResultSet {
        if query.trim().is_empty() {
            return GeoResultSet::failed("empty query");
        }

        let url = match self.request_url(query, country, multiple) {
            Ok(url) => url,
            Err(e) => return GeoResultSet::failed(e),
        };

        tracing::debug!(
            query,
            country = country.map(CountryCode::as_str),
            multiple,
            "Geocoding with OpenCage"
        );

        match self.runtime.block_on(self.fetch(url)) {
            Ok(response) => {
                let set = into_result_set(response);
                if let Some(error) = set.error() {
                    tracing::warn!(query, "OpenCage returned an error: {}", error);
                }
                set
            }
            Err(e) => {
                tracing::warn!(query, "OpenCage request failed: {}", e);
                GeoResultSet::failed(e)
            }
        }
    }

    fn provider_name(&self) -> &str {
        "opencage"
    }
}

/// Strip the API key from messages that may echo the request URL
fn without_key(message: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        message.to_string()
    } else {
        message.replace(api_key, "***")
    }
}
