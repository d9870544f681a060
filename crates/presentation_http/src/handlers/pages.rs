//! HTML pages

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Html,
};
use integration_mbta::{CallOptions, Route, RouteType, Stop};
use serde::Serialize;
use tracing::{debug, instrument};

use super::common::{RouteFilter, find_route, sort_for_display};
use crate::{
    error::{ApiError, PageError, ResultExt},
    middleware::RequestId,
    state::AppState,
    templates::names,
};

/// Route as shown on a page
#[derive(Debug, Serialize)]
struct RouteView {
    route_id: String,
    name: String,
    color: String,
    text_color: String,
    type_label: &'static str,
    destinations: Vec<String>,
}

impl From<Route> for RouteView {
    fn from(route: Route) -> Self {
        Self {
            name: route.display_name().to_string(),
            type_label: route.route_type.label(),
            destinations: route
                .destinations
                .into_iter()
                .filter(|d| !d.is_empty())
                .collect(),
            route_id: route.route_id,
            color: route.color,
            text_color: route.text_color,
        }
    }
}

/// Stop as shown on a page
#[derive(Debug, Serialize)]
struct StopView {
    name: String,
    platform_name: String,
    address: String,
    location: Option<String>,
}

impl From<Stop> for StopView {
    fn from(stop: Stop) -> Self {
        let location = stop
            .coordinates()
            .map(|(lat, lon)| format!("{lat:.5}, {lon:.5}"));
        Self {
            name: stop.name.unwrap_or(stop.stop_id),
            platform_name: stop.platform_name,
            address: stop.address,
            location,
        }
    }
}

/// Entry of the route type filter bar
#[derive(Debug, Serialize)]
struct FilterLink {
    code: u8,
    label: &'static str,
}

fn filter_links() -> Vec<FilterLink> {
    [
        RouteType::LightRail,
        RouteType::HeavyRail,
        RouteType::CommuterRail,
        RouteType::Bus,
        RouteType::Ferry,
    ]
    .into_iter()
    .filter_map(|kind| {
        kind.code().map(|code| FilterLink {
            code,
            label: kind.label(),
        })
    })
    .collect()
}

#[derive(Serialize)]
struct IndexPage {
    filters: Vec<FilterLink>,
    routes: Vec<RouteView>,
}

#[derive(Serialize)]
struct RoutePage {
    route: RouteView,
    stops: Vec<StopView>,
}

/// Index of all routes
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(filter): Query<RouteFilter>,
) -> Result<Html<String>, PageError> {
    let mut routes = state
        .mbta
        .list_routes(filter.route_type(), &CallOptions::default())
        .await
        .or_page(request_id, &state.templates)?;

    sort_for_display(&mut routes);
    debug!(count = routes.len(), "Rendering route index");

    let page = IndexPage {
        filters: filter_links(),
        routes: routes.into_iter().map(RouteView::from).collect(),
    };

    state
        .templates
        .render(names::INDEX, &page)
        .map(Html)
        .or_page(request_id, &state.templates)
}

/// One route and its stops
#[instrument(skip(state))]
pub async fn route_detail(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(route_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let route = find_route(state.mbta.as_ref(), &route_id)
        .await
        .or_page(request_id, &state.templates)?;

    let stops = state
        .mbta
        .list_stops(&route.route_id, &CallOptions::default())
        .await
        .or_page(request_id, &state.templates)?;

    let page = RoutePage {
        route: route.into(),
        stops: stops.into_iter().map(StopView::from).collect(),
    };

    state
        .templates
        .render(names::ROUTE, &page)
        .map(Html)
        .or_page(request_id, &state.templates)
}

/// Fallback for unknown URLs
pub async fn not_found(State(state): State<AppState>, request_id: RequestId, uri: Uri) -> PageError {
    ApiError::NotFound(format!("URL not found: {uri}")).page(request_id, &state.templates)
}
