use serde::{Deserialize, Serialize};

use crate::step::Config;

/// Configuración de un análisis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub name: String,
}

impl AnalysisConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new("Default analysis")
    }
}

impl Config for AnalysisConfig {}
