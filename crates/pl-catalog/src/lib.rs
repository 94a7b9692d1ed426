//! Service/Plan Metadata Catalog
//!
//! Static lookup of the services and plans this backend is allowed to
//! provision, loaded once at startup from a JSON metadata document and
//! never mutated while serving.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod params;

pub use params::{validate_parameters, ParameterError};

/// Metadata about one plan this backend handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDefinition {
    /// Id of the plan, unique within its service.
    pub plan_id: String,

    /// JSON Schema constraining the creation parameters for this plan.
    /// Absent (or an empty document) means the plan accepts no parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_parameter_schema: Option<serde_json::Value>,
}

/// Metadata about one service this backend handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    /// Id of the service.
    pub service_id: String,

    #[serde(default)]
    pub plans: Vec<PlanDefinition>,
}

impl ServiceDefinition {
    /// Look up a plan by id. Catalogs are small and load-time-fixed, so a
    /// linear scan is sufficient.
    pub fn plan(&self, plan_id: &str) -> Option<&PlanDefinition> {
        self.plans.iter().find(|p| p.plan_id == plan_id)
    }
}

/// The top-level catalog of sellable services.
///
/// Read-only for the lifetime of the process; the single source of truth
/// for valid (service, plan, schema) triples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
}

impl Catalog {
    /// Look up a service by id.
    pub fn service(&self, service_id: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.service_id == service_id)
    }

    /// Read the metadata file at `path` and parse it into a catalog.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog: Catalog =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            services = catalog.services.len(),
            "loaded service metadata"
        );
        Ok(catalog)
    }
}

/// Failure to load the catalog from its configuration source. Fatal at
/// startup; never raised while serving.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read metadata file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse metadata file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn catalog() -> Catalog {
        serde_json::from_value(json!({
            "services": [
                {
                    "serviceId": "Simple",
                    "plans": [{ "planId": "SimplePlan1" }]
                },
                {
                    "serviceId": "Parameterized",
                    "plans": [
                        {
                            "planId": "ParameterizedPlan1",
                            "inputParameterSchema": {
                                "type": "object",
                                "properties": {
                                    "parameter2": { "type": "integer", "minimum": 0 }
                                },
                                "required": ["parameter2"]
                            }
                        }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn service_lookup() {
        let catalog = catalog();
        assert!(catalog.service("Simple").is_some());
        assert!(catalog.service("Parameterized").is_some());
        assert!(catalog.service("WorldDominationService").is_none());
    }

    #[test]
    fn plan_lookup_is_scoped_to_its_service() {
        let catalog = catalog();
        let simple = catalog.service("Simple").unwrap();
        assert!(simple.plan("SimplePlan1").is_some());
        assert!(simple.plan("ParameterizedPlan1").is_none());

        let parameterized = catalog.service("Parameterized").unwrap();
        let plan = parameterized.plan("ParameterizedPlan1").unwrap();
        assert!(plan.input_parameter_schema.is_some());
    }

    #[test]
    fn from_file_parses_metadata_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "services": [ {{ "serviceId": "Simple", "plans": [ {{ "planId": "SimplePlan1" }} ] }} ] }}"#
        )
        .unwrap();

        let catalog = Catalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.services.len(), 1);
        assert!(catalog.service("Simple").unwrap().plan("SimplePlan1").is_some());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Catalog::from_file("/nonexistent/metadata.json").unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn from_file_reports_malformed_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Catalog::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
