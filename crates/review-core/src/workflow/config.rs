use serde::{Deserialize, Serialize};

use crate::step::Config;

/// Configuración de un workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub name: String,
    /// Expresión de filtrado de filas aplicada antes del primer step.
    #[serde(default)]
    pub sql_filter: Option<String>,
    /// Campos eliminados al terminar la ejecución.
    #[serde(default)]
    pub post_drop_columns: Vec<String>,
}

impl WorkflowConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               sql_filter: None,
               post_drop_columns: Vec::new() }
    }

    pub fn with_filter(mut self, rule: impl Into<String>) -> Self {
        self.sql_filter = Some(rule.into());
        self
    }

    pub fn with_drops<I, S>(mut self, fields: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.post_drop_columns = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Filtro efectivo (los vacíos se ignoran).
    pub fn filter(&self) -> Option<&str> {
        self.sql_filter.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::new("Default workflow")
    }
}

impl Config for WorkflowConfig {}
