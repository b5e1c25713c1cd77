//! Reportes JSON impresos por el CLI.
use chrono::Utc;
use review_core::{Analysis, AnalysisResults, Dataset};
use serde_json::{json, Map, Value};

use crate::errors::CoreError;

/// Contrato de campos del análisis.
pub fn fields_report(analysis: &Analysis) -> Result<Value, CoreError> {
    Ok(serde_json::to_value(analysis.get_fields()?)?)
}

/// Contrato de resultados por workflow.
pub fn results_report(analysis: &Analysis) -> Result<Value, CoreError> {
    Ok(serde_json::to_value(analysis.get_results()?)?)
}

/// Resumen de una ejecución: campos finales y resultados por workflow y step.
pub fn run_report(analysis: &Analysis, data: &dyn Dataset, results: &AnalysisResults) -> Result<Value, CoreError> {
    let fields: Map<String, Value> = data.fields()
                                         .into_iter()
                                         .map(|(name, dtype)| (name, Value::String(dtype.to_string())))
                                         .collect();
    let mut workflows = Map::new();
    for (wf_id, by_step) in results {
        let steps: Map<String, Value> =
            by_step.iter()
                   .map(|(step_id, produced)| {
                       (step_id.clone(), Value::Array(produced.iter().map(|r| r.to_json()).collect()))
                   })
                   .collect();
        workflows.insert(wf_id.clone(), Value::Object(steps));
    }
    Ok(json!({
        "analysis_id": analysis.id(),
        "definition_hash": analysis.definition_hash()?,
        "finished_at": Utc::now().to_rfc3339(),
        "rows": data.row_count(),
        "fields": fields,
        "results": workflows,
    }))
}
