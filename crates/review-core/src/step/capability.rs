//! Traits de capacidad (roles) de un step.
//!
//! Los métodos devuelven `StepError`; el workflow los envuelve en
//! `CoreEngineError::StepFailed` con el id del step.

use super::definition::ResultContract;
use crate::data::Dataset;
use crate::errors::StepError;
use crate::model::{NamedResults, StepResult};
use crate::runtime::{Colormap, DatasetFactory, FigureFactory, Palette};

/// Limpieza / transformación del dataset.
pub trait Preprocessor {
    fn preprocess(&self, dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError>;
}

/// Roles entrenables. `train` debe ser idempotente: no hace nada si el step
/// ya está entrenado.
pub trait Trainable {
    fn is_trained(&self) -> bool;
    fn train(&mut self, dataset: &dyn Dataset) -> Result<(), StepError>;
}

/// Agrega columnas de representación (embeddings) al dataset.
pub trait Embedder: Trainable {
    fn embed(&self, dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError>;
}

/// Describe el dataset y publica resultados.
pub trait Analyser: ResultContract {
    fn analyse(&self,
               dataset: &dyn Dataset,
               results: &NamedResults,
               datasets: &dyn DatasetFactory)
               -> Result<Vec<StepResult>, StepError>;
}

/// Agrega columnas de predicción.
pub trait Predictor: Trainable {
    fn predict(&self, dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError>;
}

/// Evalúa predicciones y publica métricas.
pub trait Evaluator: ResultContract {
    fn evaluate(&self, dataset: &dyn Dataset, datasets: &dyn DatasetFactory) -> Result<Vec<StepResult>, StepError>;
}

/// Produce figuras a partir del dataset y de resultados previos.
pub trait Visualizer: ResultContract {
    fn visualize(&self,
                 dataset: &dyn Dataset,
                 results: &NamedResults,
                 palette: Palette,
                 colormap: &Colormap,
                 figures: &dyn FigureFactory)
                 -> Result<Vec<StepResult>, StepError>;
}
