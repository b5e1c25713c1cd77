use review_core::Figure;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DomainError;

/// Figura declarativa: un tipo (`"bar"`, `"line"`, ...) y su especificación
/// serializable (series, etiquetas, colores).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFigure {
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub spec: Value,
}

impl ChartFigure {
    /// Construye desde la descripción cruda entregada por un visualizador.
    pub fn from_raw(raw: Value) -> Result<Self, DomainError> {
        let figure: ChartFigure = serde_json::from_value(raw)?;
        if figure.kind.trim().is_empty() {
            return Err(DomainError::ValidationError("figure kind must not be empty".into()));
        }
        Ok(figure)
    }
}

impl Figure for ChartFigure {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
