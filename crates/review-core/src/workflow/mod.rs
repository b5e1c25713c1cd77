//! Workflow: cadena ordenada y validada de steps.

pub mod config;
pub mod contract;
mod core;

pub use config::WorkflowConfig;
pub use contract::{FieldFold, ResultFold};
pub use self::core::{ProgressFn, Workflow};
