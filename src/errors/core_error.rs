use review_core::CoreEngineError;
use thiserror::Error;

/// Errores de la aplicación (CLI y fachada).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error del motor: {0}")]
    Engine(#[from] CoreEngineError),
}

impl CoreError {
    /// Código de salida del binario: 2 uso, 4 validación, 5 ejecución.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Io(_) | CoreError::Config(_) => 2,
            CoreError::Json(_) => 4,
            CoreError::Engine(e) => match e {
                CoreEngineError::StepFailed { .. } | CoreEngineError::Dataset(_) | CoreEngineError::Internal(_) => 5,
                _ => 4,
            },
            CoreError::Internal(_) => 5,
        }
    }
}
