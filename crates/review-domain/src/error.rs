// error.rs
use review_core::CoreEngineError;
use thiserror::Error;

/// Error del dominio tabular
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Error de filtro: {0}")]
    FilterError(String),

    #[error("Longitud inválida para '{field}': {found} valores para {expected} filas")]
    LengthMismatch { field: String, expected: usize, found: usize },

    #[error("Campo desconocido: {0}")]
    UnknownField(String),

    #[error("Error de serialización: {0}")]
    SerializationError(String),
}

// Conversión desde serde_json::Error a DomainError
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}

// El motor sólo ve fallas de contrato del dataset
impl From<DomainError> for CoreEngineError {
    fn from(e: DomainError) -> Self {
        CoreEngineError::Dataset(e.to_string())
    }
}
