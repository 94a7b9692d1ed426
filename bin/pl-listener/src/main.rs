//! ProcureLink Listener Server
//!
//! Production server for marketplace procurement events:
//! - Event intake: POST /entitlementEvents
//! - Entitlement state: GET /entitlements, POST /reset
//! - Monitoring: health probes, Prometheus metrics, Swagger UI
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PL_PORT` | `11000` | HTTP listen port |
//! | `PL_METADATA_FILE` | `metadata.json` | Service/plan metadata document |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pl_api::{create_router, ApiDoc};
use pl_catalog::Catalog;
use pl_engine::{EntitlementStore, EventProcessor};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting ProcureLink Listener");

    // Configuration from environment
    let port: u16 = env_or_parse("PL_PORT", 11000);
    let metadata_file = env_or("PL_METADATA_FILE", "metadata.json");

    // Prometheus recorder
    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    // Load the service/plan catalog; fatal if the metadata document is
    // missing or malformed.
    let catalog = Arc::new(
        Catalog::from_file(&metadata_file)
            .with_context(|| format!("failed to load metadata from '{metadata_file}'"))?,
    );

    // Build the backend
    let store = Arc::new(EntitlementStore::new());
    let processor = Arc::new(EventProcessor::new(catalog, store.clone()));

    let app = create_router(processor, store, prometheus)
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = format!("0.0.0.0:{port}");
    info!("Listening on http://{addr}");
    info!("Dispatching entitlement events at POST /entitlementEvents");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("ProcureLink Listener shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
