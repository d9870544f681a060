//! MBTA v3 API integration
//!
//! Client for the [MBTA v3 API](https://api-v3.mbta.com), a read-only
//! JSON:API service describing Boston-area transit routes and stops.
//!
//! # Architecture
//!
//! [`MbtaClient`] defines the operations, [`MbtaApiClient`] implements them over
//! HTTP. List operations go through [`fetch_all`], which follows `links.next`
//! until the last page, and every raw record is turned into a [`Route`] or
//! [`Stop`] by the lenient mappers in [`mapper`].
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_mbta::{CallOptions, MbtaApiClient, MbtaClient, MbtaConfig};
//!
//! let config = MbtaConfig::with_api_key("my-key");
//! let client = MbtaApiClient::new(&config)?;
//!
//! let subway = client.list_routes(Some("0,1"), &CallOptions::default()).await?;
//! let stops = client.list_stops("Red", &CallOptions::default()).await?;
//! ```

mod client;
mod config;
mod error;
pub mod mapper;
mod models;
pub mod pagination;

pub use client::{CallOptions, MbtaApiClient, MbtaClient};
pub use config::MbtaConfig;
pub use error::MbtaError;
pub use mapper::{Record, Resource, RouteAttributes, StopAttributes};
pub use models::{Route, RouteType, Stop};
pub use pagination::{Document, Links, PageSource, QueryParams, fetch_all};
pub use tokio_util::sync::CancellationToken;
