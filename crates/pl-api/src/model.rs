//! API request/response DTOs

use pl_common::{Decision, Parameters};
use pl_engine::{EntitlementRecord, EntitlementState};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard API error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Body returned for an accepted (or rejected-with-body) entitlement event.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventAck {
    /// Id of the event this response is for.
    pub event_id: String,
    /// Templatized SSO dashboard url for managing the entitlement, when the
    /// backend provides one.
    pub entitlement_dashboard_url: String,
    /// Custom labels the backend attaches to the entitlement.
    #[schema(value_type = Object)]
    pub labels: Parameters,
}

impl From<Decision> for EventAck {
    fn from(decision: Decision) -> Self {
        Self {
            event_id: decision.event_id,
            entitlement_dashboard_url: decision.dashboard_url.unwrap_or_default(),
            labels: decision.labels,
        }
    }
}

/// One stored entitlement, as exposed on the diagnostic listing endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResponse {
    pub id: String,
    pub state: String,
    pub service_id: String,
    pub plan_id: String,
    pub account_id: String,
    pub requestor_id: String,
    #[schema(value_type = Object)]
    pub parameters: Parameters,
}

impl From<EntitlementRecord> for EntitlementResponse {
    fn from(record: EntitlementRecord) -> Self {
        let state = match record.state {
            EntitlementState::Active => "ACTIVE".to_string(),
        };
        Self {
            id: record.id,
            state,
            service_id: record.service_id,
            plan_id: record.plan_id,
            account_id: record.account_id,
            requestor_id: record.requestor_id,
            parameters: record.parameters,
        }
    }
}

/// Success response with optional message
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

/// Simple health response for basic health check
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status: UP
    pub status: String,
    /// Application version
    pub version: String,
}

/// Kubernetes probe response
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeResponse {
    /// Probe status: LIVE, READY
    pub status: String,
}
