//! Steps: unidades configurables que implementan uno o varios roles.
//!
//! - `Step`: interfaz neutral usada por `Workflow` (identidad, configuración,
//!   contrato de campos y accesores de rol).
//! - Traits de capacidad (`Preprocessor`, `Embedder`, `Analyser`,
//!   `Predictor`, `Evaluator`, `Visualizer`).
//! - `Capabilities`: registro de roles calculado una vez al agregar el step.
//! - `Config`: configuración serializable con actualización desde un mapa.

pub mod capability;
pub mod config;
pub mod definition;
pub mod macros;

pub use capability::{Analyser, Embedder, Evaluator, Predictor, Preprocessor, Trainable, Visualizer};
pub use config::{cast_like, Config};
pub use definition::{Capabilities, FieldContract, ResultContract, Step};
