//! MBTA routes server
//!
//! Main entry point for the web front-end.

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use integration_mbta::{MbtaApiClient, MbtaClient};
use presentation_http::{AppConfig, AppState, TemplateEngine, routes};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "mbta_routes_server=debug,presentation_http=debug,integration_mbta=debug,tower_http=debug";

/// Exit status when connections outlive the shutdown deadline
const FORCED_SHUTDOWN_EXIT_CODE: i32 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(config.server.json_logs());

    info!("🚇 MBTA routes v{} starting...", env!("CARGO_PKG_VERSION"));

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    info!(
        host = %config.server.host,
        port = %config.server.port,
        mbta = ?config.mbta,
        "Configuration loaded"
    );

    let client = MbtaApiClient::new(&config.mbta).context("Failed to create MBTA client")?;
    let client: Arc<dyn MbtaClient> = Arc::new(client);

    if !client.is_healthy().await {
        warn!("MBTA API is not reachable yet; pages will fail until it is");
    }

    let templates = TemplateEngine::new().context("Failed to compile templates")?;
    let state = AppState::new(client, templates);

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🚀 Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("👋 Server shutdown complete");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("📥 Received Ctrl+C, shutting down..."),
        () = terminate => info!("📥 Received SIGTERM, shutting down..."),
    }

    // In-flight requests get `timeout` to finish before the process is killed.
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        error!(
            ?timeout,
            exit_code = FORCED_SHUTDOWN_EXIT_CODE,
            "Connections still open after shutdown timeout, aborting"
        );
        std::process::exit(FORCED_SHUTDOWN_EXIT_CODE);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_shutdown_exits_with_failure() {
        assert_ne!(FORCED_SHUTDOWN_EXIT_CODE, 0);
    }
}
