//! HTML page rendering
//!
//! Templates are compiled into the binary and share `base.html` through
//! Tera inheritance. Autoescaping is on for every `.html` template.

use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::debug;

/// Error type for template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    Render(String),

    /// Template compilation failed
    #[error("Template compilation failed: {0}")]
    Compile(String),
}

impl From<tera::Error> for TemplateError {
    fn from(e: tera::Error) -> Self {
        match e.kind {
            tera::ErrorKind::TemplateNotFound(name) => Self::NotFound(name),
            _ => Self::Render(format!("{e:?}")),
        }
    }
}

mod embedded {
    pub const BASE: &str = include_str!("../templates/base.html");
    pub const INDEX: &str = include_str!("../templates/index.html");
    pub const ROUTE: &str = include_str!("../templates/route.html");
    pub const ERROR: &str = include_str!("../templates/error.html");
}

/// Page template names
pub mod names {
    pub const INDEX: &str = "index.html";
    pub const ROUTE: &str = "route.html";
    pub const ERROR: &str = "error.html";
}

/// Renders the embedded page templates
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Arc<Tera>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.template_names())
            .finish()
    }
}

impl TemplateEngine {
    /// Compile the embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", embedded::BASE),
            (names::INDEX, embedded::INDEX),
            (names::ROUTE, embedded::ROUTE),
            (names::ERROR, embedded::ERROR),
        ])
        .map_err(|e| TemplateError::Compile(format!("{e:?}")))?;

        debug!(count = tera.get_template_names().count(), "Templates compiled");

        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Render `name` with a serializable context
    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, TemplateError> {
        let context =
            Context::from_serialize(context).map_err(|e| TemplateError::Render(e.to_string()))?;
        Ok(self.tera.render(name, &context)?)
    }

    /// Render the error page with the given message
    pub fn render_error(&self, msg: &str) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("msg", msg);
        Ok(self.tera.render(names::ERROR, &context)?)
    }

    /// Names of all compiled templates, sorted
    #[must_use]
    pub fn template_names(&self) -> Vec<&str> {
        let mut all: Vec<_> = self.tera.get_template_names().collect();
        all.sort_unstable();
        all
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_compiles_all_templates() {
        let engine = TemplateEngine::new().unwrap();
        assert_eq!(
            engine.template_names(),
            ["base.html", "error.html", "index.html", "route.html"]
        );
    }

    #[test]
    fn test_render_error_page_escapes_message() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine.render_error("URL not found: /<script>").unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<title>Error - MBTA Routes</title>"));
    }

    #[test]
    fn test_render_index() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render(
                names::INDEX,
                &json!({
                    "filters": [{ "code": 1, "label": "Heavy Rail" }],
                    "routes": [{
                        "route_id": "Red",
                        "name": "Red Line",
                        "color": "DA291C",
                        "text_color": "FFFFFF",
                        "type_label": "Heavy Rail",
                        "destinations": ["Ashmont/Braintree", "Alewife"]
                    }]
                }),
            )
            .unwrap();
        assert!(html.contains("href=\"/routes/Red\""));
        assert!(html.contains("background-color: #DA291C"));
        assert!(html.contains("Red Line"));
        assert!(html.contains("Alewife"));
    }

    #[test]
    fn test_render_index_without_routes() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render(names::INDEX, &json!({ "filters": [], "routes": [] }))
            .unwrap();
        assert!(html.contains("No routes found."));
    }

    #[test]
    fn test_missing_template() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("nope.html", &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }
}
