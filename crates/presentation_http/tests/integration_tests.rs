//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use integration_mbta::{CallOptions, MbtaClient, MbtaError, Route, RouteType, Stop};
use presentation_http::{AppState, TemplateEngine, create_router};
use serde_json::Value;

/// What the fake client answers with
#[derive(Clone)]
enum Behaviour {
    Ok,
    UpstreamError,
    Timeout,
}

/// In-memory stand-in for the MBTA API
struct FakeMbta {
    routes: Vec<Route>,
    stops: Vec<Stop>,
    behaviour: Behaviour,
    healthy: bool,
    route_type_filters: Mutex<Vec<Option<String>>>,
}

impl FakeMbta {
    fn new() -> Self {
        Self {
            routes: vec![
                route("1", "Harvard Square - Nubian Station", 50010, RouteType::Bus),
                route("Red", "Red Line", 10010, RouteType::HeavyRail),
                route("Mattapan", "Mattapan Trolley", 10011, RouteType::LightRail),
            ],
            stops: vec![
                Stop {
                    stop_id: "place-alfcl".to_string(),
                    address: "Alewife Brook Pkwy and Cambridge Park Dr, Cambridge, MA 02140"
                        .to_string(),
                    latitude: Some(42.39583),
                    longitude: Some(-71.141_287),
                    name: Some("Alewife".to_string()),
                    platform_name: String::new(),
                },
                Stop {
                    stop_id: "place-davis".to_string(),
                    address: "Holland St, Somerville, MA 02144".to_string(),
                    latitude: None,
                    longitude: None,
                    name: Some("Davis".to_string()),
                    platform_name: "Red Line".to_string(),
                },
            ],
            behaviour: Behaviour::Ok,
            healthy: true,
            route_type_filters: Mutex::new(Vec::new()),
        }
    }

    fn failing(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            healthy: false,
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), MbtaError> {
        match self.behaviour {
            Behaviour::Ok => Ok(()),
            Behaviour::UpstreamError => Err(MbtaError::UnexpectedServerResponse {
                status_code: 500,
                body: r#"{"errors":[{"status":"500"}]}"#.to_string(),
            }),
            Behaviour::Timeout => Err(MbtaError::Timeout { timeout_ms: 10_000 }),
        }
    }
}

fn route(id: &str, name: &str, sort_order: i64, route_type: RouteType) -> Route {
    Route {
        route_id: id.to_string(),
        color: "DA291C".to_string(),
        text_color: "FFFFFF".to_string(),
        long_name: Some(name.to_string()),
        sort_order,
        destinations: vec!["Outbound".to_string(), "Inbound".to_string()],
        route_type,
    }
}

#[async_trait]
impl MbtaClient for FakeMbta {
    async fn list_routes(
        &self,
        route_type: Option<&str>,
        _options: &CallOptions,
    ) -> Result<Vec<Route>, MbtaError> {
        self.route_type_filters
            .lock()
            .expect("lock")
            .push(route_type.map(str::to_string));
        self.check()?;
        Ok(self.routes.clone())
    }

    async fn get_route(
        &self,
        route_id: &str,
        _options: &CallOptions,
    ) -> Result<Route, MbtaError> {
        self.check()?;
        if route_id == "Gone" {
            return Err(MbtaError::UnexpectedServerResponse {
                status_code: 404,
                body: r#"{"errors":[{"code":"not_found"}]}"#.to_string(),
            });
        }
        // The API answers unknown ids with an empty document.
        Ok(self
            .routes
            .iter()
            .find(|r| r.route_id == route_id)
            .cloned()
            .unwrap_or_else(|| route("", "", 0, RouteType::Unknown)))
    }

    async fn list_stops(
        &self,
        _route_id: &str,
        _options: &CallOptions,
    ) -> Result<Vec<Stop>, MbtaError> {
        self.check()?;
        Ok(self.stops.clone())
    }

    async fn is_healthy(&self) -> bool {
        self.healthy
    }
}

fn create_test_server_with(client: Arc<FakeMbta>) -> TestServer {
    let templates = TemplateEngine::new().expect("templates compile");
    let state = AppState::new(client, templates);
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(FakeMbta::new()))
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn readiness_endpoint_returns_ready_when_healthy() {
    let server = create_test_server();

    let response = server.get("/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ready"], true);
    assert_eq!(body["mbta_api"]["healthy"], true);
}

#[tokio::test]
async fn readiness_endpoint_returns_503_when_upstream_down() {
    let server = create_test_server_with(Arc::new(FakeMbta::failing(Behaviour::Timeout)));

    let response = server.get("/ready").await;

    response.assert_status_service_unavailable();
    let body: Value = response.json();
    assert_eq!(body["ready"], false);
}

// ============ HTML Page Tests ============

#[tokio::test]
async fn index_lists_routes_in_sort_order() {
    let server = create_test_server();

    let response = server.get("/").await;

    response.assert_status_ok();
    let html = response.text();
    let red = html.find("Red Line").expect("Red Line listed");
    let mattapan = html.find("Mattapan Trolley").expect("Mattapan listed");
    let bus = html.find("Harvard Square - Nubian Station").expect("bus listed");
    assert!(red < mattapan && mattapan < bus);
    assert!(html.contains("background-color: #DA291C"));
    assert!(html.contains("Heavy Rail"));
}

#[tokio::test]
async fn index_passes_type_filter() {
    let client = Arc::new(FakeMbta::new());
    let server = create_test_server_with(Arc::clone(&client));

    server.get("/").add_query_param("type", "0,1").await.assert_status_ok();
    server.get("/").add_query_param("type", "").await.assert_status_ok();
    server.get("/").await.assert_status_ok();

    let filters = client.route_type_filters.lock().expect("lock").clone();
    assert_eq!(filters, vec![Some("0,1".to_string()), None, None]);
}

#[tokio::test]
async fn route_page_shows_stops() {
    let server = create_test_server();

    let response = server.get("/routes/Red").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Red Line"));
    assert!(html.contains("Alewife"));
    assert!(html.contains("Davis"));
    assert!(html.contains("42.39583, -71.14129"));
}

#[tokio::test]
async fn route_page_returns_404_for_unknown_route() {
    let server = create_test_server();

    let response = server.get("/routes/Purple").await;

    response.assert_status_not_found();
    assert!(response.text().contains("Route not found: Purple"));
}

#[tokio::test]
async fn route_page_returns_404_for_upstream_404() {
    let server = create_test_server();

    let response = server.get("/routes/Gone").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn unexpected_upstream_response_shows_error_page_with_code() {
    let server = create_test_server_with(Arc::new(FakeMbta::failing(Behaviour::UpstreamError)));

    let response = server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("request id header")
        .to_string();
    let html = response.text();
    assert!(html.contains(&format!(
        "Got an unexpected response from the MBTA API. Check the logs for code: {request_id}"
    )));
    assert!(!html.contains("errors"));
}

#[tokio::test]
async fn other_failures_show_generic_error_page() {
    let server = create_test_server_with(Arc::new(FakeMbta::failing(Behaviour::Timeout)));

    let response = server.get("/routes/Red").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response
            .text()
            .contains("An unexpected error occurred. Check the logs for code: ")
    );
}

#[tokio::test]
async fn unknown_url_returns_404_page() {
    let server = create_test_server();

    let response = server.get("/no/such/page").await;

    response.assert_status_not_found();
    let html = response.text();
    assert!(html.contains("URL not found: "));
    assert!(html.contains("such"));
}

#[tokio::test]
async fn client_request_id_is_echoed() {
    let server = create_test_server();
    let id = "7f1c2a0e-3b7d-4c59-9d2a-6a1f0b8e4c21";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some(id)
    );
}

// ============ JSON API Tests ============

#[tokio::test]
async fn api_lists_routes_sorted() {
    let server = create_test_server();

    let response = server.get("/api/routes").await;

    response.assert_status_ok();
    let routes: Vec<Route> = response.json();
    let ids: Vec<_> = routes.iter().map(|r| r.route_id.as_str()).collect();
    assert_eq!(ids, ["Red", "Mattapan", "1"]);
    assert_eq!(routes[2].route_type, RouteType::Bus);
}

#[tokio::test]
async fn api_get_route() {
    let server = create_test_server();

    let response = server.get("/api/routes/Red").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["route_id"], "Red");
    assert_eq!(body["long_name"], "Red Line");
    assert_eq!(body["route_type"], "HeavyRail");
}

#[tokio::test]
async fn api_get_unknown_route_is_404() {
    let server = create_test_server();

    let response = server.get("/api/routes/Purple").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["error"], "Route not found: Purple");
}

#[tokio::test]
async fn api_list_stops() {
    let server = create_test_server();

    let response = server.get("/api/routes/Red/stops").await;

    response.assert_status_ok();
    let stops: Vec<Stop> = response.json();
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].name.as_deref(), Some("Alewife"));
}

#[tokio::test]
async fn api_upstream_error_hides_body() {
    let server = create_test_server_with(Arc::new(FakeMbta::failing(Behaviour::UpstreamError)));

    let response = server.get("/api/routes").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "upstream_error");
    assert!(body["request_id"].is_string());
    assert!(!body["error"].as_str().unwrap_or_default().contains("errors"));
}
