//! ProcureLink Event Engine
//!
//! This crate provides the event-processing core:
//! - EntitlementStore: keyed in-memory entitlement state with clone-out reads
//! - EventProcessor: orchestrates catalog lookup, parameter validation, and
//!   the idempotent create decision
//! - ProcurementBackend: the service seam the transport layer dispatches to

pub mod error;
pub mod processor;
pub mod store;

pub use error::EngineError;
pub use processor::{EventProcessor, ProcurementBackend};
pub use store::{EntitlementRecord, EntitlementState, EntitlementStore};

pub type Result<T> = std::result::Result<T, EngineError>;
