//! Analysis: cadena ordenada de workflows alimentada por un mapeo de campos.

pub mod config;
mod core;

pub use config::AnalysisConfig;
pub use self::core::Analysis;
