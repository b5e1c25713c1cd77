use indexmap::IndexMap;

use super::CellValue;
use crate::errors::CoreEngineError;
use crate::model::{DType, TypeSet};

/// Columnas con nombre usadas para construir datasets nuevos.
pub type FieldColumns = IndexMap<String, Vec<CellValue>>;

/// Operaciones abstractas de un dataset tabular.
///
/// Las implementaciones deben tener semántica de valor: `copy` produce un
/// dataset independiente y el motor copia antes de modificar.
pub trait Dataset: std::fmt::Debug + Send + Sync {
    /// Copia profunda e independiente.
    fn copy(&self) -> Box<dyn Dataset>;

    /// Aplica una expresión de filtrado de filas.
    fn apply_filter(&mut self, rule: &str) -> Result<(), CoreEngineError>;

    /// Valores de un campo (vacío si el campo no existe).
    fn field_values(&self, name: &str) -> Vec<CellValue>;

    /// Reemplaza o crea un campo. Falla si la longitud no coincide con las filas.
    fn set_field_values(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), CoreEngineError>;

    /// Verifica que el campo exista y que su tipo sea aceptado por `dtype`.
    fn verify_schema(&self, name: &str, dtype: &TypeSet) -> bool {
        self.fields().get(name).is_some_and(|d| dtype.accepts(*d))
    }

    /// Elimina campos (los ausentes se ignoran).
    fn drop_fields(&mut self, names: &[String]);

    /// Copia `src` sobre `dst` si `dst` aún no existe.
    fn map_field(&mut self, src: &str, dst: &str) -> Result<(), CoreEngineError>;

    /// Campos actuales y su tipo, en orden.
    fn fields(&self) -> IndexMap<String, DType>;

    fn row_count(&self) -> usize;

    /// Particiona filas en entrenamiento/prueba (una sola vez).
    fn train_partition(&mut self, fraction: f64) -> Result<(), CoreEngineError>;

    fn train_data(&self) -> Box<dyn Dataset>;

    fn test_data(&self) -> Box<dyn Dataset>;

    /// Representación serializable para persistencia.
    fn to_dict(&self) -> serde_json::Value;

    fn has_field(&self, name: &str) -> bool {
        self.fields().contains_key(name)
    }
}
