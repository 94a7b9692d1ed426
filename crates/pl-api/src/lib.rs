//! ProcureLink API
//!
//! HTTP endpoints for:
//! - Entitlement event intake from the marketplace
//! - Entitlement state inspection and test reset
//! - Health and Kubernetes probes
//! - Prometheus metrics

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;

use pl_common::{validate_event, DecisionStatus, EntitlementEvent};
use pl_engine::{EntitlementStore, ProcurementBackend};

pub mod model;
use model::{
    ApiError, EntitlementResponse, EventAck, HealthResponse, ProbeResponse, SuccessResponse,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ProcurementBackend>,
    pub store: Arc<EntitlementStore>,
    pub prometheus: PrometheusHandle,
}

/// Create the full router with all endpoints
pub fn create_router(
    backend: Arc<dyn ProcurementBackend>,
    store: Arc<EntitlementStore>,
    prometheus: PrometheusHandle,
) -> Router {
    let state = AppState {
        backend,
        store,
        prometheus,
    };

    Router::new()
        // Marketplace event intake
        .route("/entitlementEvents", post(on_entitlement_event))
        // Entitlement state
        .route("/entitlements", get(list_entitlements))
        .route("/reset", post(reset_store))
        // Basic health
        .route("/health", get(health_handler))
        // Kubernetes probes
        .route("/health/live", get(liveness_probe))
        .route("/health/ready", get(readiness_probe))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// ProcureLink Listener OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ProcureLink Listener API",
        description = "Marketplace entitlement event intake and reconciliation"
    ),
    tags(
        (name = "events", description = "Entitlement event intake"),
        (name = "entitlements", description = "Entitlement state inspection"),
        (name = "health", description = "Health and probes"),
        (name = "monitoring", description = "Metrics")
    ),
    paths(
        on_entitlement_event,
        list_entitlements,
        reset_store,
        health_handler,
        liveness_probe,
        readiness_probe,
    )
)]
pub struct ApiDoc;

// ============================================================================
// Event Intake
// ============================================================================

/// Receive one entitlement event from the marketplace
#[utoipa::path(
    post,
    path = "/entitlementEvents",
    tag = "events",
    request_body = EntitlementEvent,
    responses(
        (status = 200, description = "Event accepted", body = EventAck),
        (status = 202, description = "Event will be decided asynchronously"),
        (status = 400, description = "Malformed or invalid event"),
        (status = 500, description = "Event type not supported by this backend"),
    )
)]
async fn on_entitlement_event(
    State(state): State<AppState>,
    payload: Result<Json<EntitlementEvent>, JsonRejection>,
) -> Response {
    let Json(event) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "unable to parse entitlement event");
            let body = ApiError::bad_request(rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    if let Err(e) = validate_event(&event) {
        warn!(error = %e, "invalid entitlement event received");
        return (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(e.to_string())))
            .into_response();
    }

    match state.backend.on_event(&event).await {
        Ok(decision) => match decision.status {
            DecisionStatus::Accepted => {
                (StatusCode::OK, Json(EventAck::from(decision))).into_response()
            }
            // No informative body is required for invalid requests.
            DecisionStatus::InvalidRequest => StatusCode::BAD_REQUEST.into_response(),
            DecisionStatus::Rejected => {
                (StatusCode::BAD_REQUEST, Json(EventAck::from(decision))).into_response()
            }
            DecisionStatus::Async => StatusCode::ACCEPTED.into_response(),
        },
        Err(e) => {
            error!(error = %e, "error handling entitlement event");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================================
// Entitlement State
// ============================================================================

/// List all stored entitlements
#[utoipa::path(
    get,
    path = "/entitlements",
    tag = "entitlements",
    responses((status = 200, description = "Current entitlement records", body = [EntitlementResponse]))
)]
async fn list_entitlements(State(state): State<AppState>) -> Json<Vec<EntitlementResponse>> {
    let records = state
        .store
        .records()
        .into_iter()
        .map(EntitlementResponse::from)
        .collect();
    Json(records)
}

/// Clear all stored entitlements. Test-harness hook between scenarios.
#[utoipa::path(
    post,
    path = "/reset",
    tag = "entitlements",
    responses((status = 200, description = "Store cleared", body = SuccessResponse))
)]
async fn reset_store(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.store.reset();
    info!("entitlement store reset");
    Json(SuccessResponse::ok())
}

// ============================================================================
// Health Endpoints
// ============================================================================

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Kubernetes liveness probe - returns 200 if the application is running
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Application is live", body = ProbeResponse))
)]
async fn liveness_probe() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "LIVE".to_string(),
    })
}

/// Kubernetes readiness probe - returns 200 if ready to accept traffic
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses((status = 200, description = "Application is ready", body = ProbeResponse))
)]
async fn readiness_probe() -> Json<ProbeResponse> {
    // The catalog is loaded before the server binds, so a serving process is
    // always ready.
    Json(ProbeResponse {
        status: "READY".to_string(),
    })
}

// ============================================================================
// Metrics
// ============================================================================

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.prometheus.render()
}
