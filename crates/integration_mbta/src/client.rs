//! MBTA v3 API client
//!
//! Lists routes, fetches a single route and lists the stops of a route using
//! the public [api-v3.mbta.com](https://api-v3.mbta.com) JSON:API endpoints.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT_ENCODING;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::MbtaConfig;
use crate::error::MbtaError;
use crate::mapper::{Record, Resource};
use crate::models::{Route, Stop};
use crate::pagination::{Document, PageSource, QueryParams, fetch_all};

/// Per-call controls for a client operation
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Deadline for the whole operation, every page included.
    /// Falls back to the configured `timeout_secs` when unset.
    pub timeout: Option<Duration>,
    /// Token that aborts the operation with [`MbtaError::Cancelled`] when fired
    pub cancellation: Option<CancellationToken>,
}

impl CallOptions {
    /// Options with an explicit deadline
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn cancelled_by(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Trait for MBTA API clients
#[async_trait]
pub trait MbtaClient: Send + Sync {
    /// List every route, optionally filtered by route type code (e.g. `"0,1"`)
    async fn list_routes(
        &self,
        route_type: Option<&str>,
        options: &CallOptions,
    ) -> Result<Vec<Route>, MbtaError>;

    /// Fetch a single route
    ///
    /// A successful response without a `data` object yields an empty route
    /// (see [`Route::is_empty`]) rather than an error.
    async fn get_route(&self, route_id: &str, options: &CallOptions)
    -> Result<Route, MbtaError>;

    /// List every stop served by a route
    async fn list_stops(&self, route_id: &str, options: &CallOptions)
    -> Result<Vec<Stop>, MbtaError>;

    /// Check if the MBTA API is reachable
    async fn is_healthy(&self) -> bool;
}

/// HTTP client for the MBTA v3 API
#[derive(Debug)]
pub struct MbtaApiClient {
    client: Client,
    config: MbtaConfig,
}

impl MbtaApiClient {
    /// Create a new MBTA API client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &MbtaConfig) -> Result<Self, MbtaError> {
        config.validate().map_err(MbtaError::ConfigurationError)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mbta-routes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MbtaError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build an endpoint URL below the configured base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MbtaError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| MbtaError::ConfigurationError(format!("invalid base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| MbtaError::ConfigurationError("base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Run `operation` under the call's deadline and cancellation token
    async fn run<T, Fut>(&self, options: &CallOptions, operation: Fut) -> Result<T, MbtaError>
    where
        Fut: Future<Output = Result<T, MbtaError>>,
    {
        let timeout = options
            .timeout
            .unwrap_or_else(|| Duration::from_secs(self.config.timeout_secs));

        let bounded = async {
            tokio::time::timeout(timeout, operation)
                .await
                .map_err(|_| MbtaError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })?
        };

        match &options.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!("Operation cancelled by caller");
                        Err(MbtaError::Cancelled)
                    }
                    result = bounded => result,
                }
            },
            None => bounded.await,
        }
    }
}

/// Whether `url` already carries an `api_key` query parameter
fn has_api_key(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| parsed.query_pairs().any(|(key, _)| key == "api_key"))
}

#[async_trait]
impl PageSource for MbtaApiClient {
    async fn fetch_page(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<Document, MbtaError> {
        let mut request = self.client.get(url).header(ACCEPT_ENCODING, "gzip");

        if !has_api_key(url) {
            request = request.query(&[("api_key", self.config.api_key.expose_secret())]);
        }
        if !params.is_empty() {
            request = request.query(params);
        }

        debug!(%url, "Requesting MBTA API");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MbtaError::Timeout {
                    timeout_ms: self.config.timeout_secs.saturating_mul(1000),
                }
            } else {
                MbtaError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Unexpected response from MBTA API");
            return Err(MbtaError::UnexpectedServerResponse {
                status_code: status.as_u16(),
                body,
            });
        }

        Document::parse(&body)
    }
}

#[async_trait]
impl MbtaClient for MbtaApiClient {
    #[instrument(skip(self, options))]
    async fn list_routes(
        &self,
        route_type: Option<&str>,
        options: &CallOptions,
    ) -> Result<Vec<Route>, MbtaError> {
        let url = self.endpoint(&["routes"])?;

        let mut params: QueryParams = vec![Route::fields_param()];
        if let Some(route_type) = route_type {
            params.push(("filter[type]".to_string(), route_type.to_string()));
        }

        let routes = self
            .run(
                options,
                fetch_all(
                    self,
                    url.as_str(),
                    params,
                    self.config.page_limit,
                    Route::from_record,
                ),
            )
            .await?;

        debug!(count = routes.len(), "Routes fetched");
        Ok(routes)
    }

    #[instrument(skip(self, options))]
    async fn get_route(
        &self,
        route_id: &str,
        options: &CallOptions,
    ) -> Result<Route, MbtaError> {
        let url = self.endpoint(&["routes", route_id])?;
        let params = [Route::fields_param()];

        let document = self
            .run(options, self.fetch_page(url.as_str(), &params))
            .await?;

        let route = Route::from_record(Record::from_value(document.data));
        if route.is_empty() {
            warn!("Route response carried no data");
        }
        Ok(route)
    }

    #[instrument(skip(self, options))]
    async fn list_stops(
        &self,
        route_id: &str,
        options: &CallOptions,
    ) -> Result<Vec<Stop>, MbtaError> {
        let url = self.endpoint(&["stops"])?;
        let params: QueryParams = vec![
            ("filter[route]".to_string(), route_id.to_string()),
            Stop::fields_param(),
        ];

        let stops = self
            .run(
                options,
                fetch_all(
                    self,
                    url.as_str(),
                    params,
                    self.config.page_limit,
                    Stop::from_record,
                ),
            )
            .await?;

        debug!(count = stops.len(), "Stops fetched");
        Ok(stops)
    }

    async fn is_healthy(&self) -> bool {
        let Ok(url) = self.endpoint(&["routes"]) else {
            return false;
        };
        let params = [
            ("page[limit]".to_string(), "1".to_string()),
            ("fields[route]".to_string(), "type".to_string()),
        ];
        self.run(&CallOptions::default(), self.fetch_page(url.as_str(), &params))
            .await
            .is_ok()
    }
}
