//! HTTP-based `RouteMatrixClient` using the Routes API.
//!
//! The [`RouteMatrixClient`] trait is synchronous so the engine stays
//! embeddable in synchronous contexts. This client bridges the async HTTP
//! call to that interface by blocking on a Tokio runtime internally.

use std::fmt;
use std::time::Duration;

use holiday_core::{BatchError, BatchResponse, RouteMatrixClient};
use log::{debug, warn};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::wire::{FIELD_MASK, MatrixRequest, decode_elements};

/// Production `computeRouteMatrix` endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://routes.googleapis.com/distanceMatrix/v2:computeRouteMatrix";

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "holiday-routing/0.1";

/// Default number of retries after a failed connection attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Delay before the first retry; doubled for each subsequent one.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Error type for [`HttpRouteMatrixClient`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// No API key was supplied.
    #[error("route matrix API key is missing")]
    MissingApiKey,
    /// The configured endpoint is not a valid URL.
    #[error("invalid route matrix endpoint {endpoint:?}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Error reported by `reqwest`.
        #[source]
        source: reqwest::Error,
    },
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime {
        /// Error reported by Tokio.
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for [`HttpRouteMatrixClient`].
#[derive(Clone)]
pub struct HttpRouteMatrixConfig {
    /// Routes API key sent with every request.
    pub api_key: String,
    /// Endpoint URL for `computeRouteMatrix`.
    pub endpoint: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Retries after a connection failure.
    pub max_retries: u32,
}

impl fmt::Debug for HttpRouteMatrixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRouteMatrixConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl HttpRouteMatrixConfig {
    /// Create a configuration for the production endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Send requests to `endpoint` instead of the production service.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set how many times a failed connection is retried.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Route-matrix client backed by the Routes API.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the client blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle
/// with [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which may deadlock if the caller's runtime
/// drives IO this request depends on.
///
/// # Example
///
/// ```no_run
/// use holiday_core::{ChunkedDistanceResolver, DEFAULT_CHUNK_SIZE, DistanceResolver};
/// use holiday_data::routing::HttpRouteMatrixClient;
///
/// let client = HttpRouteMatrixClient::new("my-api-key")?;
/// let resolver = ChunkedDistanceResolver::new(client);
/// let resolution = resolver.resolve("San Jose", &["Paris".to_owned()], DEFAULT_CHUNK_SIZE);
/// println!("{:?}", resolution.get("Paris"));
/// # Ok::<(), holiday_data::routing::ProviderBuildError>(())
/// ```
pub struct HttpRouteMatrixClient {
    client: Client,
    config: HttpRouteMatrixConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl fmt::Debug for HttpRouteMatrixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRouteMatrixClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpRouteMatrixClient {
    /// Create a client for the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRouteMatrixConfig::new(api_key))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank, the endpoint is not a URL, or
    /// the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRouteMatrixConfig) -> Result<Self, ProviderBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderBuildError::MissingApiKey);
        }
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| ProviderBuildError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|source| ProviderBuildError::HttpClient { source })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ProviderBuildError::Runtime { source })?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HttpRouteMatrixConfig {
        &self.config
    }

    async fn send_with_retries(
        &self,
        request: &MatrixRequest<'_>,
    ) -> Result<reqwest::Response, BatchError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .post(self.endpoint.clone())
                .header(API_KEY_HEADER, &self.config.api_key)
                .header(FIELD_MASK_HEADER, FIELD_MASK)
                .json(request)
                .send()
                .await;
            match sent {
                Ok(response) => return Ok(response),
                Err(err) if err.is_connect() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "connection to {} failed (attempt {attempt}), retrying in {backoff:?}: {err}",
                        self.endpoint
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => return Err(self.convert_reqwest_error(&err)),
            }
        }
    }

    /// Fetch one matrix asynchronously.
    async fn fetch_matrix_async(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<BatchResponse, BatchError> {
        let request = MatrixRequest::new(origin, destinations);
        let response = self
            .send_with_retries(&request)
            .await?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let decoded = decode_elements(&body).map_err(|err| BatchError::Decode {
            message: err.to_string(),
        })?;
        debug!(
            "decoded {} route matrix elements for {} destinations",
            decoded.entries.len(),
            destinations.len()
        );
        Ok(decoded)
    }

    /// Convert a reqwest error to a `BatchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> BatchError {
        let url = self.endpoint.to_string();
        if error.is_timeout() {
            return BatchError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return BatchError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() || error.is_body() {
            return BatchError::Decode {
                message: error.to_string(),
            };
        }

        BatchError::Network {
            url,
            message: error.to_string(),
        }
    }
}

impl RouteMatrixClient for HttpRouteMatrixClient {
    /// Request one matrix covering every destination.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. See the type-level documentation.
    fn compute_route_matrix(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<BatchResponse, BatchError> {
        if destinations.is_empty() {
            return Ok(BatchResponse::default());
        }

        let future = self.fetch_matrix_async(origin, destinations);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
