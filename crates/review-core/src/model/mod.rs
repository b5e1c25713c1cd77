//! Modelo de contratos: campos y resultados.
//!
//! Tipos de valor sin comportamiento propio (salvo el predicado de
//! compatibilidad). Las agregaciones (`AnalysisFields`, `ResultMap`) se
//! recalculan en cada llamada de validación.

pub mod field;
pub mod result;

pub use field::{compatible, matches, AnalysisFields, DType, FieldMap, FieldMappings, FieldSchema, TypeSet};
pub use result::{AnalysisResults, NamedResults, ResultMap, ResultType, ResultValue, StepResult, WorkflowResults};

/// Identificador de un step.
pub type StepId = String;
/// Identificador de un workflow.
pub type WorkflowId = String;
/// Identificador de un análisis.
pub type AnalysisId = String;
