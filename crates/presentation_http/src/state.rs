//! Application state shared across handlers

use std::sync::Arc;

use integration_mbta::MbtaClient;

use crate::templates::TemplateEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// MBTA API client
    pub mbta: Arc<dyn MbtaClient>,
    /// Compiled page templates
    pub templates: TemplateEngine,
}

impl AppState {
    #[must_use]
    pub fn new(mbta: Arc<dyn MbtaClient>, templates: TemplateEngine) -> Self {
        Self { mbta, templates }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}
