//! Event Processor
//!
//! Orchestrates catalog lookup, parameter validation, and the idempotent
//! entitlement-create decision.

use async_trait::async_trait;
use metrics::counter;
use parking_lot::Mutex;
use pl_catalog::{validate_parameters, Catalog};
use pl_common::{Decision, EntitlementEvent, EntitlementEventType};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::store::{EntitlementRecord, EntitlementStore};
use crate::Result;

/// The service seam the transport layer dispatches inbound events to.
///
/// Implementations return a [`Decision`] for events they can handle and an
/// [`EngineError`] for events they cannot; the caller is expected to have
/// already performed field-presence validation.
#[async_trait]
pub trait ProcurementBackend: Send + Sync {
    async fn on_event(&self, event: &EntitlementEvent) -> Result<Decision>;
}

/// In-memory backend: a read-only catalog shared for the process lifetime
/// plus an entitlement store this processor is the single writer for.
pub struct EventProcessor {
    catalog: Arc<Catalog>,
    store: Arc<EntitlementStore>,

    /// Serializes the read-decide-write sequence on the store. Catalog
    /// lookup and schema validation stay outside this critical section.
    decide: Mutex<()>,
}

impl EventProcessor {
    pub fn new(catalog: Arc<Catalog>, store: Arc<EntitlementStore>) -> Self {
        Self {
            catalog,
            store,
            decide: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<EntitlementStore> {
        &self.store
    }

    fn on_created(&self, event: &EntitlementEvent) -> Decision {
        let Some(service) = self.catalog.service(&event.service_id) else {
            warn!(service_id = %event.service_id, "service not found");
            counter!("procurelink_events_total", "outcome" => "invalid_request").increment(1);
            return Decision::invalid_request();
        };

        let Some(plan) = service.plan(&event.plan_id) else {
            warn!(service_id = %event.service_id, plan_id = %event.plan_id, "plan not found");
            counter!("procurelink_events_total", "outcome" => "invalid_request").increment(1);
            return Decision::invalid_request();
        };

        if let Err(e) = validate_parameters(&event.parameters, plan.input_parameter_schema.as_ref())
        {
            warn!(
                service_id = %event.service_id,
                plan_id = %event.plan_id,
                error = %e,
                "parameters are not valid"
            );
            counter!("procurelink_events_total", "outcome" => "invalid_request").increment(1);
            return Decision::invalid_request();
        }

        let candidate = EntitlementRecord::from_event(event);

        let _guard = self.decide.lock();
        match self.store.get(&event.entitlement_id) {
            None => {
                self.store.put(candidate);
                info!(
                    event_id = %event.event_id,
                    entitlement_id = %event.entitlement_id,
                    service_id = %event.service_id,
                    plan_id = %event.plan_id,
                    "entitlement created"
                );
                counter!("procurelink_events_total", "outcome" => "accepted").increment(1);
                Decision::accepted(&event.event_id)
            }
            Some(existing) if existing == candidate => {
                // At-least-once delivery: the same logical event arrived
                // again. Leave the store untouched.
                debug!(
                    event_id = %event.event_id,
                    entitlement_id = %event.entitlement_id,
                    "identical entitlement already exists"
                );
                counter!("procurelink_events_total", "outcome" => "accepted").increment(1);
                Decision::accepted(&event.event_id)
            }
            Some(_) => {
                // Same entitlement id, different payload: an entitlement
                // cannot switch plans or owners via a creation event.
                warn!(
                    event_id = %event.event_id,
                    entitlement_id = %event.entitlement_id,
                    "conflicting entitlement already exists"
                );
                counter!("procurelink_events_total", "outcome" => "invalid_request").increment(1);
                Decision::invalid_request()
            }
        }
    }
}

#[async_trait]
impl ProcurementBackend for EventProcessor {
    async fn on_event(&self, event: &EntitlementEvent) -> Result<Decision> {
        match event.event_type {
            Some(EntitlementEventType::EntitlementCreated) => Ok(self.on_created(event)),
            other => {
                counter!("procurelink_events_total", "outcome" => "unsupported").increment(1);
                Err(EngineError::UnsupportedEventType {
                    event_type: other.map(|t| t.as_str()).unwrap_or("<missing>").to_string(),
                })
            }
        }
    }
}
