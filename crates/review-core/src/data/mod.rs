//! Contrato del dataset tabular consumido por el motor.
//!
//! El motor no implementa el dataset: sólo lo consume a través del trait
//! `Dataset` (ver `review-domain` para una implementación en memoria).

pub mod dataset;
pub mod value;

pub use dataset::{Dataset, FieldColumns};
pub use value::CellValue;
