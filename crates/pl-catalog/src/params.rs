//! Plan Parameter Validation
//!
//! Checks a creation-parameter map against a plan's declared input schema.
//! A pure function of (parameters, schema); no state, no side effects.

use serde_json::Value;

/// Why a parameter map was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// The plan declares no schema, so no parameters are accepted.
    #[error("no parameters were expected")]
    UnexpectedParameters,

    /// The plan's schema document itself does not compile.
    #[error("invalid parameter schema: {0}")]
    InvalidSchema(String),

    /// The parameters do not satisfy the plan's schema. Violations are for
    /// diagnostics only and are not protocol-visible.
    #[error("parameters do not match the plan schema: {}", violations.join("; "))]
    SchemaViolations { violations: Vec<String> },
}

fn is_empty_document(schema: &Value) -> bool {
    matches!(schema, Value::Object(doc) if doc.is_empty())
}

/// Validate `parameters` against a plan's declared `schema`.
///
/// A plan without a schema accepts zero parameters. A declared schema is
/// enforced with standard JSON Schema semantics (required properties, type
/// constraints, numeric bounds); every violation is collected into a single
/// [`ParameterError::SchemaViolations`].
pub fn validate_parameters(
    parameters: &serde_json::Map<String, Value>,
    schema: Option<&Value>,
) -> Result<(), ParameterError> {
    let Some(schema) = schema.filter(|s| !is_empty_document(s)) else {
        if !parameters.is_empty() {
            return Err(ParameterError::UnexpectedParameters);
        }
        return Ok(());
    };

    let validator = jsonschema::draft202012::options()
        .build(schema)
        .map_err(|e| ParameterError::InvalidSchema(e.to_string()))?;

    let instance = Value::Object(parameters.clone());
    if validator.is_valid(&instance) {
        return Ok(());
    }

    let violations = validator
        .iter_errors(&instance)
        .map(|e| e.to_string())
        .collect();
    Err(ParameterError::SchemaViolations { violations })
}
