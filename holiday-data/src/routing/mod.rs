//! HTTP route-matrix client for the Routes API.
//!
//! This module provides [`HttpRouteMatrixClient`], an implementation of
//! [`holiday_core::RouteMatrixClient`] that posts one origin and a batch of
//! destination addresses to `computeRouteMatrix` and decodes the streamed
//! element array.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use holiday_core::RouteMatrixClient;
//! use holiday_data::routing::{HttpRouteMatrixClient, HttpRouteMatrixConfig};
//!
//! let config = HttpRouteMatrixConfig::new("my-api-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_max_retries(5);
//! let client = HttpRouteMatrixClient::with_config(config)?;
//!
//! let response = client
//!     .compute_route_matrix("San Jose", &["Yosemite".to_owned()])?;
//! println!("{} entries", response.entries.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;
mod wire;

pub use provider::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_USER_AGENT, HttpRouteMatrixClient,
    HttpRouteMatrixConfig, ProviderBuildError,
};
pub use wire::FIELD_MASK;
