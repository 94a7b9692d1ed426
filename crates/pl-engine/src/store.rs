//! Entitlement Store
//!
//! Keyed in-memory state of entitlements, one record per entitlement id.
//! Records are immutable once written; the store itself does not decide
//! accept/no-op/reject. That is the processor's responsibility, which also
//! serializes the read-modify-write sequence per key.

use dashmap::DashMap;
use pl_common::{EntitlementEvent, Parameters};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored entitlement. Only `Active` is reachable:
/// creation events are the only mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntitlementState {
    Active,
}

/// The state this backend holds about one entitlement.
///
/// Structural equality over the whole record is the idempotency test: a
/// re-delivered creation event builds an identical candidate, a divergent
/// one does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementRecord {
    /// The entitlement id; primary key.
    pub id: String,
    pub state: EntitlementState,
    pub service_id: String,
    pub plan_id: String,
    pub account_id: String,
    pub requestor_id: String,
    pub parameters: Parameters,
}

impl EntitlementRecord {
    /// Build the candidate record for a creation event.
    pub fn from_event(event: &EntitlementEvent) -> Self {
        Self {
            id: event.entitlement_id.clone(),
            state: EntitlementState::Active,
            service_id: event.service_id.clone(),
            plan_id: event.plan_id.clone(),
            account_id: event.account_id.clone(),
            requestor_id: event.requestor_id.clone(),
            parameters: event.parameters.clone(),
        }
    }
}

/// In-memory entitlement state, keyed by entitlement id.
#[derive(Debug, Default)]
pub struct EntitlementStore {
    records: DashMap<String, EntitlementRecord>,
}

impl EntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone-out read of the record for `entitlement_id`, if any.
    pub fn get(&self, entitlement_id: &str) -> Option<EntitlementRecord> {
        self.records.get(entitlement_id).map(|r| r.clone())
    }

    /// Insert a record under its id.
    pub fn put(&self, record: EntitlementRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// Clear all records. Test-harness hook between scenarios; not part of
    /// production request handling.
    pub fn reset(&self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all records, for diagnostics and test assertions.
    pub fn records(&self) -> Vec<EntitlementRecord> {
        self.records.iter().map(|r| r.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str) -> EntitlementRecord {
        EntitlementRecord {
            id: id.to_string(),
            state: EntitlementState::Active,
            service_id: "Simple".to_string(),
            plan_id: "SimplePlan1".to_string(),
            account_id: "A1".to_string(),
            requestor_id: String::new(),
            parameters: Parameters::new(),
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = EntitlementStore::new();
        assert!(store.get("E1").is_none());

        store.put(record("E1"));
        assert_eq!(store.get("E1").unwrap(), record("E1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_clones_out() {
        let store = EntitlementStore::new();
        store.put(record("E1"));

        let mut copy = store.get("E1").unwrap();
        copy.plan_id = "Other".to_string();

        // The stored record is unaffected by mutating the clone.
        assert_eq!(store.get("E1").unwrap().plan_id, "SimplePlan1");
    }

    #[test]
    fn reset_clears_all_records() {
        let store = EntitlementStore::new();
        store.put(record("E1"));
        store.put(record("E2"));
        assert_eq!(store.len(), 2);

        store.reset();
        assert!(store.is_empty());
        assert!(store.get("E1").is_none());
    }

    #[test]
    fn record_equality_is_structural() {
        let event: EntitlementEvent = serde_json::from_value(json!({
            "eventId": "1",
            "eventType": "ENTITLEMENT_CREATED",
            "entitlementId": "E1",
            "serviceId": "Simple",
            "planId": "SimplePlan1",
            "parameters": { "parameter2": 42 }
        }))
        .unwrap();

        let a = EntitlementRecord::from_event(&event);
        let b = EntitlementRecord::from_event(&event);
        assert_eq!(a, b);

        let mut divergent = b.clone();
        divergent.parameters = serde_json::from_value(json!({ "parameter2": 43 })).unwrap();
        assert_ne!(a, divergent);
    }
}
