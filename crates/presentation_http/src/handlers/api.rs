//! JSON API

use axum::{
    Json,
    extract::{Path, Query, State},
};
use integration_mbta::{CallOptions, Route, Stop};
use tracing::instrument;

use super::common::{RouteFilter, find_route, sort_for_display};
use crate::{
    error::{JsonError, ResultExt},
    middleware::RequestId,
    state::AppState,
};

/// `GET /api/routes`
#[instrument(skip(state))]
pub async fn list_routes(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(filter): Query<RouteFilter>,
) -> Result<Json<Vec<Route>>, JsonError> {
    let mut routes = state
        .mbta
        .list_routes(filter.route_type(), &CallOptions::default())
        .await
        .or_json(request_id)?;
    sort_for_display(&mut routes);
    Ok(Json(routes))
}

/// `GET /api/routes/{id}`
#[instrument(skip(state))]
pub async fn get_route(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(route_id): Path<String>,
) -> Result<Json<Route>, JsonError> {
    find_route(state.mbta.as_ref(), &route_id)
        .await
        .map(Json)
        .or_json(request_id)
}

/// `GET /api/routes/{id}/stops`
#[instrument(skip(state))]
pub async fn list_stops(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(route_id): Path<String>,
) -> Result<Json<Vec<Stop>>, JsonError> {
    state
        .mbta
        .list_stops(&route_id, &CallOptions::default())
        .await
        .map(Json)
        .or_json(request_id)
}
