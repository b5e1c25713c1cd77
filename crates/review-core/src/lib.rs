//! review-core: motor de composición de workflows y análisis.
//!
//! - Contratos de campos y resultados (`model`).
//! - Roles de step y su despacho (`step`, `workflow`).
//! - Composición de workflows (`analysis`) y su esquema serializado
//!   (`schema`, `registry`).
//! - Colaboradores consumidos: dataset (`data`) y runtime (`runtime`).
pub mod analysis;
pub mod constants;
pub mod data;
pub mod errors;
pub mod hashing;
pub mod ids;
pub mod model;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod step;
pub mod workflow;

// Usado por `impl_step!` en crates externos.
pub use serde_json;

pub use analysis::{Analysis, AnalysisConfig};
pub use data::{CellValue, Dataset, FieldColumns};
pub use errors::{CoreEngineError, StepError};
pub use ids::{IdGenerator, SequentialIdGenerator, TimestampIdGenerator, UuidIdGenerator};
pub use model::{AnalysisFields, AnalysisResults, DType, FieldMap, FieldMappings, FieldSchema, NamedResults, ResultMap,
                ResultType, ResultValue, StepResult, TypeSet, WorkflowResults};
pub use registry::{StepClass, StepRegistry};
pub use runtime::{Colormap, DatasetFactory, Figure, FigureFactory, Palette, Runtime};
pub use schema::{AnalysisSchema, StepSchema, WorkflowSchema};
pub use step::{Analyser, Capabilities, Config, Embedder, Evaluator, FieldContract, Predictor, Preprocessor, ResultContract,
               Step, Trainable, Visualizer};
pub use workflow::{Workflow, WorkflowConfig};
