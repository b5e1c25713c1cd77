//! Esquema serializado de workflows y análisis (JSON).
//!
//! `{id, config, workflows: [{id, config: {name, sql_filter?,
//! post_drop_columns?}, steps: [{id, module, classname, config}]}]}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::AnalysisConfig;
use crate::errors::CoreEngineError;
use crate::workflow::WorkflowConfig;

/// Descriptor de un step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSchema {
    #[serde(default)]
    pub id: Option<String>,
    pub module: String,
    pub classname: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSchema {
    #[serde(default)]
    pub id: Option<String>,
    pub config: WorkflowConfig,
    #[serde(default)]
    pub steps: Vec<StepSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSchema {
    #[serde(default)]
    pub id: Option<String>,
    pub config: AnalysisConfig,
    #[serde(default)]
    pub workflows: Vec<WorkflowSchema>,
}

impl StepSchema {
    fn without_id(&self) -> Self {
        Self { id: None,
               ..self.clone() }
    }
}

impl WorkflowSchema {
    pub fn from_json(s: &str) -> Result<Self, CoreEngineError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, CoreEngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copia sin ids (base del `definition_hash`).
    pub fn without_ids(&self) -> Self {
        Self { id: None,
               config: self.config.clone(),
               steps: self.steps.iter().map(StepSchema::without_id).collect() }
    }
}

impl AnalysisSchema {
    pub fn from_json(s: &str) -> Result<Self, CoreEngineError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, CoreEngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn without_ids(&self) -> Self {
        Self { id: None,
               config: self.config.clone(),
               workflows: self.workflows.iter().map(WorkflowSchema::without_ids).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_analysis() {
        let raw = json!({
            "config": {"name": "demo"},
            "workflows": [{
                "id": "wf-1",
                "config": {"name": "wf", "post_drop_columns": ["x"]},
                "steps": [{"module": "m", "classname": "C"}]
            }]
        });
        let schema = AnalysisSchema::from_json(&raw.to_string()).unwrap();
        assert_eq!(schema.id, None);
        assert_eq!(schema.workflows[0].id.as_deref(), Some("wf-1"));
        assert_eq!(schema.workflows[0].config.sql_filter, None);
        assert_eq!(schema.workflows[0].config.post_drop_columns, vec!["x".to_string()]);
        assert!(schema.workflows[0].steps[0].config.is_empty());
    }

    #[test]
    fn missing_required_keys_are_malformed() {
        let err = AnalysisSchema::from_json(r#"{"workflows": []}"#).unwrap_err();
        assert!(matches!(err, CoreEngineError::MalformedSchema(_)));
    }

    #[test]
    fn without_ids_strips_every_level() {
        let raw = json!({"id": "a", "config": {"name": "n"}, "workflows": [
            {"id": "w", "config": {"name": "w"}, "steps": [{"id": "s", "module": "m", "classname": "C"}]}
        ]});
        let s: AnalysisSchema = serde_json::from_value(raw).unwrap();
        let stripped = s.without_ids();
        assert!(stripped.id.is_none());
        assert!(stripped.workflows[0].id.is_none());
        assert!(stripped.workflows[0].steps[0].id.is_none());
        assert_eq!(stripped.workflows[0].steps[0].module, "m");
    }
}
