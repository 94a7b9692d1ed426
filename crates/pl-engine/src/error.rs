//! Engine Error Types

use thiserror::Error;

/// Failures the processor reports to its caller rather than folding into a
/// decision. These indicate a capability gap, not bad input; the transport
/// maps them to a server-side error and the process keeps serving.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unsupported event type: '{event_type}'")]
    UnsupportedEventType { event_type: String },
}
