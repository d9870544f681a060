//! Lookups shared by the HTML and JSON handlers

use integration_mbta::{CallOptions, MbtaClient, MbtaError, Route};
use serde::Deserialize;

/// `?type=` filter on route listings, e.g. `?type=0,1`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteFilter {
    #[serde(rename = "type")]
    pub route_type: Option<String>,
}

impl RouteFilter {
    /// The filter value to send upstream; blank means no filter
    #[must_use]
    pub fn route_type(&self) -> Option<&str> {
        self.route_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Fetch a route, treating an empty result or an upstream 404 as not found
pub async fn find_route(client: &dyn MbtaClient, route_id: &str) -> Result<Route, MbtaError> {
    match client.get_route(route_id, &CallOptions::default()).await {
        Ok(route) if route.is_empty() => Err(MbtaError::not_found(route_id)),
        Err(MbtaError::UnexpectedServerResponse {
            status_code: 404, ..
        }) => Err(MbtaError::not_found(route_id)),
        other => other,
    }
}

/// Order routes for display
pub fn sort_for_display(routes: &mut [Route]) {
    routes.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.route_id.cmp(&b.route_id))
    });
}

#[cfg(test)]
mod tests {
    use integration_mbta::RouteType;

    use super::*;

    fn route(id: &str, sort_order: i64) -> Route {
        Route {
            route_id: id.to_string(),
            color: Route::DEFAULT_COLOR.to_string(),
            text_color: Route::DEFAULT_TEXT_COLOR.to_string(),
            long_name: None,
            sort_order,
            destinations: Vec::new(),
            route_type: RouteType::Bus,
        }
    }

    #[test]
    fn filter_ignores_blank_values() {
        let filter = RouteFilter {
            route_type: Some("  ".to_string()),
        };
        assert_eq!(filter.route_type(), None);
        assert_eq!(RouteFilter::default().route_type(), None);

        let filter = RouteFilter {
            route_type: Some("0,1".to_string()),
        };
        assert_eq!(filter.route_type(), Some("0,1"));
    }

    #[test]
    fn sort_by_sort_order_then_id() {
        let mut routes = vec![route("39", 50390), route("Red", 10010), route("1", 50390)];
        sort_for_display(&mut routes);
        let ids: Vec<_> = routes.iter().map(|r| r.route_id.as_str()).collect();
        assert_eq!(ids, ["Red", "1", "39"]);
    }
}
