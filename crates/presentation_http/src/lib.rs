//! MBTA routes web front-end
//!
//! Serves HTML pages and a small JSON API on top of
//! [`integration_mbta::MbtaClient`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use config::{AppConfig, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use templates::{TemplateEngine, TemplateError};
