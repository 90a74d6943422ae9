//! Weebly Webhook Client
//!
//! Single-binary Rust service that:
//! 1. Runs the Weebly OAuth authorization-code flow (`/oauth/phase_one`,
//!    `/oauth/phase_two`) with HMAC-verified entry
//! 2. Receives webhook deliveries (`/webhooks/callback`), authenticates them,
//!    and appends each one to a message log
//! 3. Shows the log on the home page (`/`)

mod config;
mod error;
mod home;
mod html;
mod message_log;
mod metrics;
mod oauth;
mod router;
mod webhook;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrics_exporter_prometheus::PrometheusHandle;
use weebly_auth::{Credentials, WeeblyClient};

use crate::config::Config;
use crate::message_log::MessageLog;

/// Maximum time to wait for in-flight requests after a shutdown signal
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    credentials: Arc<Credentials>,
    http: reqwest::Client,
    log: Arc<MessageLog>,
}

impl AppState {
    /// A provider session for the current request.
    fn weebly_client(&self) -> WeeblyClient {
        WeeblyClient::new(
            self.http.clone(),
            self.config.weebly.endpoints(),
            Credentials::clone(&self.credentials),
        )
    }
}

/// Build the public axum router.
///
/// Everything except the raw log download goes through the dispatcher.
fn build_router(state: AppState) -> Router {
    let max_connections = state.config.server.max_connections;
    Router::new()
        .route(home::LOG_DOWNLOAD_PATH, get(home::download_log))
        .fallback(router::dispatch)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

/// Build the metrics router served on its own listener.
fn build_metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(handle)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting weebly-webhook-client");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    let config = Config::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "invalid default configuration".to_string(),
    })?;

    let credentials =
        Credentials::from_env().context("Env vars not set for application")?;

    info!(
        listen_addr = %config.server.listen_addr,
        weebly_domain = %config.weebly.domain,
        log_path = %config.log.path.display(),
        client_id = %credentials.client_id,
        "configuration loaded"
    );

    let http = weebly_auth::build_http_client(config.weebly.timeout())
        .context("failed to build HTTP client")?;
    let log = MessageLog::open(config.log.path.clone()).await;

    if let Some(addr) = config.metrics.listen_addr {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind metrics listener to {addr}"))?;
        let app = build_metrics_router(prometheus_handle);
        info!(addr = %addr, "serving metrics");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "metrics listener failed");
            }
        });
    }

    let listen_addr = config.server.listen_addr;
    let app_state = AppState {
        config: Arc::new(config),
        credentials: Arc::new(credentials),
        http,
        log: Arc::new(log),
    };
    let app = build_router(app_state);

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    // The drain timeout starts when the shutdown signal fires, not when the
    // server starts.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
