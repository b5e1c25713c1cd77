//! Errores del motor de composición.
//!
//! Todas las fallas se reportan de forma síncrona. Las de composición
//! (`add`) y las de análisis (`run`) comparten las mismas funciones de
//! validación, por lo que comparten también estas variantes.

use thiserror::Error;

/// Error devuelto por las operaciones internas de un step (clasificadores,
/// embedders, etc.). El engine lo envuelve en `CoreEngineError::StepFailed`.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreEngineError {
    #[error("mapping for required field '{field}' missing")]
    MappingMissing { field: String },
    #[error("schema mismatch for field '{field}': column '{column}' is not of type {expected}")]
    SchemaMismatch { field: String, column: String, expected: String },
    #[error("field '{field}' required with incompatible types ({existing} vs {requested})")]
    FieldConflict { field: String, existing: String, requested: String },
    #[error("field '{field}' created twice ({reason})")]
    DuplicateFieldCreation { field: String, reason: String },
    #[error("result '{result}' required by step '{step_id}' is not created by an earlier step")]
    ResultMissing { result: String, step_id: String },
    #[error("result '{result}' has type {found}, expected {expected}")]
    ResultTypeMismatch { result: String, expected: String, found: String },
    #[error("result '{result}' created twice")]
    DuplicateResultCreation { result: String },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: String, id: String },
    #[error("invalid schema: {0}")]
    InvalidSchema(#[source] Box<CoreEngineError>),
    #[error("malformed schema: {0}")]
    MalformedSchema(String),
    #[error("unknown step class '{module}::{classname}'")]
    UnknownStep { module: String, classname: String },
    #[error("invalid config value for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },
    #[error("step '{step_id}' failed: {message}")]
    StepFailed { step_id: String, message: String },
    #[error("dataset: {0}")]
    Dataset(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CoreEngineError {
    /// Envuelve el error como `InvalidSchema` (idempotente: no anida dos veces).
    pub fn into_invalid_schema(self) -> Self {
        match self {
            CoreEngineError::InvalidSchema(_) => self,
            other => CoreEngineError::InvalidSchema(Box::new(other)),
        }
    }

    /// Error subyacente cuando se trata de un `InvalidSchema`.
    pub fn schema_cause(&self) -> Option<&CoreEngineError> {
        match self {
            CoreEngineError::InvalidSchema(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CoreEngineError {
    fn from(e: serde_json::Error) -> Self {
        CoreEngineError::MalformedSchema(e.to_string())
    }
}
