use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Entitlement Event Types
// ============================================================================

/// Custom parameters supplied by the marketplace user as part of an event.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Lifecycle notification types dispatched by the marketplace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntitlementEventType {
    /// An entitlement has been created on the source system.
    EntitlementCreated,
    /// An entitlement has been deleted on the source system.
    EntitlementDeleted,
    /// An entitlement has been updated on the source system.
    EntitlementUpdated,
    /// An entitlement has been cancelled by the owner on the source system.
    EntitlementCancelled,
    /// An entitlement has been reactivated by the owner on the source system.
    EntitlementReactivated,
}

impl EntitlementEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntitlementCreated => "ENTITLEMENT_CREATED",
            Self::EntitlementDeleted => "ENTITLEMENT_DELETED",
            Self::EntitlementUpdated => "ENTITLEMENT_UPDATED",
            Self::EntitlementCancelled => "ENTITLEMENT_CANCELLED",
            Self::EntitlementReactivated => "ENTITLEMENT_REACTIVATED",
        }
    }
}

/// A notification event received from the marketplace.
///
/// Events are uniquely identified by `event_id`. Delivery is at-least-once,
/// so the same event (same `event_id`) can arrive multiple times. Which
/// fields are populated depends on `event_type`; presence rules are enforced
/// by [`validate_event`], not by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementEvent {
    /// Uniquely identifies this event.
    #[serde(default)]
    pub event_id: String,

    /// The type of this event, if a recognized one was supplied.
    #[serde(default)]
    pub event_type: Option<EntitlementEventType>,

    /// The service the entitlement is for. Set for ENTITLEMENT_CREATED.
    #[serde(default)]
    pub service_id: String,

    /// The plan chosen by the user during entitlement creation.
    /// Set for ENTITLEMENT_CREATED.
    #[serde(default)]
    pub plan_id: String,

    /// Identifies the entitlement resource this event is about.
    #[serde(default)]
    pub entitlement_id: String,

    /// The marketplace account id of the entitlement's owner.
    #[serde(default)]
    pub account_id: String,

    /// The account id of an intermediary who triggered the event on behalf
    /// of the owner, if any.
    #[serde(default)]
    pub requestor_id: String,

    /// Custom parameters supplied by the user as part of this event.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub parameters: Parameters,
}

// ============================================================================
// Decisions
// ============================================================================

/// The processor's verdict for one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DecisionStatus {
    /// The request was structurally or semantically invalid.
    InvalidRequest,
    /// The event was accepted.
    Accepted,
    /// The event was rejected.
    Rejected,
    /// The event will be accepted or rejected asynchronously.
    Async,
}

/// Outcome of processing one entitlement event.
///
/// `dashboard_url` and `labels` are reserved for future async flows; current
/// logic never populates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: DecisionStatus,
    /// Echo of the event this decision is for.
    pub event_id: String,
    /// Templatized SSO dashboard url the entitlement owner can use to manage
    /// the entitlement on the provider side.
    pub dashboard_url: Option<String>,
    /// Custom labels the backend attaches to the entitlement.
    pub labels: Parameters,
}

impl Decision {
    pub fn accepted(event_id: impl Into<String>) -> Self {
        Self {
            status: DecisionStatus::Accepted,
            event_id: event_id.into(),
            dashboard_url: None,
            labels: Parameters::new(),
        }
    }

    pub fn invalid_request() -> Self {
        Self {
            status: DecisionStatus::InvalidRequest,
            event_id: String::new(),
            dashboard_url: None,
            labels: Parameters::new(),
        }
    }

    pub fn with_dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.dashboard_url = Some(url.into());
        self
    }
}

// ============================================================================
// Field-Presence Validation
// ============================================================================

/// A required event field that is missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{field}' does not have a valid value: '{value}'")]
pub struct FieldError {
    pub field: &'static str,
    pub value: String,
}

impl FieldError {
    fn missing(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Stateless field-presence check performed before an event reaches the
/// processor. `event_id` and `entitlement_id` are required for every event
/// type; ENTITLEMENT_CREATED additionally requires `service_id` and
/// `plan_id`.
pub fn validate_event(event: &EntitlementEvent) -> Result<(), FieldError> {
    if event.event_id.is_empty() {
        return Err(FieldError::missing("eventId", &event.event_id));
    }
    if event.entitlement_id.is_empty() {
        return Err(FieldError::missing("entitlementId", &event.entitlement_id));
    }

    match event.event_type {
        Some(EntitlementEventType::EntitlementCreated) => {
            if event.service_id.is_empty() {
                return Err(FieldError::missing("serviceId", &event.service_id));
            }
            if event.plan_id.is_empty() {
                return Err(FieldError::missing("planId", &event.plan_id));
            }
        }
        Some(_) => {}
        None => return Err(FieldError::missing("eventType", "")),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn created_event() -> EntitlementEvent {
        EntitlementEvent {
            event_id: "1".to_string(),
            event_type: Some(EntitlementEventType::EntitlementCreated),
            service_id: "Simple".to_string(),
            plan_id: "SimplePlan1".to_string(),
            entitlement_id: "E1".to_string(),
            account_id: String::new(),
            requestor_id: String::new(),
            parameters: Parameters::new(),
        }
    }

    #[test]
    fn event_type_wire_names() {
        let parsed: EntitlementEventType =
            serde_json::from_value(json!("ENTITLEMENT_CREATED")).unwrap();
        assert_eq!(parsed, EntitlementEventType::EntitlementCreated);
        assert_eq!(parsed.as_str(), "ENTITLEMENT_CREATED");

        let unknown: Result<EntitlementEventType, _> =
            serde_json::from_value(json!("ENTITLEMENT_EXPLODED"));
        assert!(unknown.is_err());
    }

    #[test]
    fn event_deserializes_with_missing_fields() {
        let event: EntitlementEvent = serde_json::from_value(json!({})).unwrap();
        assert!(event.event_id.is_empty());
        assert!(event.event_type.is_none());
        assert!(event.parameters.is_empty());
    }

    #[test]
    fn validate_accepts_complete_created_event() {
        assert!(validate_event(&created_event()).is_ok());
    }

    #[test]
    fn validate_requires_event_id_and_entitlement_id() {
        let mut event = created_event();
        event.event_id = String::new();
        assert_eq!(validate_event(&event).unwrap_err().field, "eventId");

        let mut event = created_event();
        event.entitlement_id = String::new();
        assert_eq!(validate_event(&event).unwrap_err().field, "entitlementId");
    }

    #[test]
    fn validate_requires_service_and_plan_for_created_only() {
        let mut event = created_event();
        event.service_id = String::new();
        assert_eq!(validate_event(&event).unwrap_err().field, "serviceId");

        let mut event = created_event();
        event.plan_id = String::new();
        assert_eq!(validate_event(&event).unwrap_err().field, "planId");

        // Other event types carry no service/plan.
        let mut event = created_event();
        event.event_type = Some(EntitlementEventType::EntitlementCancelled);
        event.service_id = String::new();
        event.plan_id = String::new();
        assert!(validate_event(&event).is_ok());
    }

    #[test]
    fn validate_rejects_missing_event_type() {
        let mut event = created_event();
        event.event_type = None;
        assert_eq!(validate_event(&event).unwrap_err().field, "eventType");
    }
}
