//! review-adapters: steps integrados del motor de análisis de reseñas.
//!
//! Implementaciones delgadas y deterministas de cada rol:
//! - `TextPreprocessor` (Preprocessor)
//! - `TokenCountEmbedder` (Embedder + Analyser)
//! - `RatingAnalyser` (Analyser)
//! - `CentroidClassifier` (Predictor)
//! - `BinaryEvaluationMetric` (Evaluator)
//! - `BarChartVisualizer` (Visualizer)
//!
//! Todas se registran bajo el módulo `review_adapters::steps`.

pub mod stats;
pub mod steps;
pub mod text;

use review_core::StepRegistry;

pub use steps::{BarChartConfig, BarChartVisualizer, BinaryEvaluationMetric, BinaryEvaluationMetricConfig, CentroidClassifier,
                CentroidClassifierConfig, RatingAnalyser, RatingAnalyserConfig, TextPreprocessor, TextPreprocessorConfig,
                TokenCountEmbedder, TokenCountEmbedderConfig};

/// Módulo bajo el que se registran los steps integrados.
pub const STEPS_MODULE: &str = "review_adapters::steps";

/// Registra todas las clases integradas.
pub fn register_builtin_steps(registry: &mut StepRegistry) {
    registry.register::<TextPreprocessor>()
            .register::<TokenCountEmbedder>()
            .register::<RatingAnalyser>()
            .register::<CentroidClassifier>()
            .register::<BinaryEvaluationMetric>()
            .register::<BarChartVisualizer>();
}

/// Registro nuevo con las clases integradas.
pub fn builtin_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    register_builtin_steps(&mut registry);
    registry
}
