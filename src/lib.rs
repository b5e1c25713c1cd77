//! ReviewFlow Rust Library
//!
//! Fachada de la aplicación sobre los crates del workspace:
//! - `config`: configuración desde entorno (`.env`).
//! - `errors`: errores de aplicación y códigos de salida.
//! - `report`: reportes JSON del CLI.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;
pub mod report;

use std::fs;
use std::path::Path;

use log::info;
use review_core::{Analysis, CoreEngineError, Dataset, FieldMappings, IdGenerator, Runtime, StepRegistry};
use review_domain::Table;
use serde_json::Value;

pub use errors::CoreError;

/// Instala el subscriber de `tracing` (captura también los registros de
/// `log`). Falla si ya hay uno instalado.
pub fn init_logging(filter: &str) -> Result<(), CoreError> {
    let filter = tracing_subscriber::EnvFilter::try_new(filter).map_err(|e| CoreError::Config(format!("filtro de log inválido: {e}")))?;
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .try_init()
                             .map_err(|e| CoreError::Internal(e.to_string()))
}

/// Registro con las clases integradas.
pub fn registry() -> StepRegistry {
    review_adapters::builtin_registry()
}

/// Carga un análisis serializado desde un archivo JSON.
pub fn load_analysis(path: impl AsRef<Path>, registry: &StepRegistry, ids: &dyn IdGenerator) -> Result<Analysis, CoreError> {
    let raw = fs::read_to_string(path)?;
    Ok(Analysis::from_json(&raw, registry, ids)?)
}

/// Carga un dataset tabular desde un archivo JSON.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table, CoreError> {
    let raw = fs::read_to_string(path)?;
    Ok(Table::from_json_str(&raw).map_err(CoreEngineError::from)?)
}

/// Parsea argumentos `campo=columna`.
pub fn parse_mappings<S: AsRef<str>>(args: &[S]) -> Result<FieldMappings, CoreError> {
    let mut mapping = FieldMappings::new();
    for arg in args {
        let arg = arg.as_ref();
        match arg.split_once('=') {
            Some((field, column)) if !field.trim().is_empty() && !column.trim().is_empty() => {
                mapping.insert(field.trim().to_string(), column.trim().to_string());
            }
            _ => return Err(CoreError::Config(format!("mapeo inválido '{arg}', se espera campo=columna"))),
        }
    }
    Ok(mapping)
}

/// Ejecuta el análisis y devuelve el reporte de la corrida. Con
/// `train_fraction` el dataset se particiona antes de correr.
pub fn run_analysis(analysis: &mut Analysis,
                    runtime: &Runtime,
                    table: &mut Table,
                    mapping: &FieldMappings,
                    train_fraction: Option<f64>)
                    -> Result<Value, CoreError> {
    if let Some(fraction) = train_fraction {
        table.train_partition(fraction)?;
    }
    let (data, results) = analysis.run_with_progress(runtime, &*table, mapping, &mut |step_id, name| {
                                      info!("step finished step_id={} name={}", step_id, name)
                                  })?;
    report::run_report(analysis, data.as_ref(), &results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_mappings() {
        let m = parse_mappings(&["text=review", " y = label "]).unwrap();
        assert_eq!(m["text"], "review");
        assert_eq!(m["y"], "label");
        assert!(parse_mappings(&["nope"]).is_err());
        assert!(parse_mappings(&["=col"]).is_err());
    }

    #[test]
    fn registry_knows_builtin_steps() {
        let r = registry();
        assert_eq!(r.len(), 6);
        assert!(r.contains(review_adapters::STEPS_MODULE, "RatingAnalyser"));
    }
}
