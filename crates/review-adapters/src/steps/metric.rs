//! BinaryEvaluationMetric (Evaluator)
//!
//! Calcula métricas de clasificación binaria sobre la partición de prueba,
//! una fila por cada campo de probabilidad con el prefijo configurado.

use std::sync::Arc;

use review_core::ids::{IdGenerator, UuidIdGenerator};
use review_core::{impl_step, CellValue, Config, DType, Dataset, DatasetFactory, Evaluator, FieldColumns, FieldContract,
                  FieldMap, FieldSchema, ResultContract, ResultMap, ResultType, ResultValue, StepError, StepResult};
use serde::{Deserialize, Serialize};

use crate::stats::{self, BinaryScores};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryEvaluationMetricConfig {
    pub input_field: String,
    pub prediction_field_prefix: String,
    pub output_name: String,
    pub do_accuracy: bool,
    pub do_precision: bool,
    pub do_recall: bool,
    pub do_f1: bool,
    pub classification_threshold: f64,
}

impl Default for BinaryEvaluationMetricConfig {
    fn default() -> Self {
        Self { input_field: "y".into(),
               prediction_field_prefix: "y_prob".into(),
               output_name: "metric".into(),
               do_accuracy: true,
               do_precision: true,
               do_recall: true,
               do_f1: true,
               classification_threshold: 0.5 }
    }
}

impl Config for BinaryEvaluationMetricConfig {}

#[derive(Debug, Clone)]
pub struct BinaryEvaluationMetric {
    id: String,
    config: BinaryEvaluationMetricConfig,
}

impl BinaryEvaluationMetric {
    pub fn new(config: BinaryEvaluationMetricConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: BinaryEvaluationMetricConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: String, config: BinaryEvaluationMetricConfig) -> Self {
        Self { id, config }
    }

    /// Columnas de métricas seleccionadas, en orden fijo.
    fn selected(&self) -> Vec<(&'static str, fn(&BinaryScores) -> f64)> {
        let mut out: Vec<(&'static str, fn(&BinaryScores) -> f64)> = Vec::new();
        if self.config.do_accuracy {
            out.push(("accuracy", |s: &BinaryScores| s.accuracy));
        }
        if self.config.do_precision {
            out.push(("precision", |s: &BinaryScores| s.precision));
        }
        if self.config.do_recall {
            out.push(("recall", |s: &BinaryScores| s.recall));
        }
        if self.config.do_f1 {
            out.push(("f1", |s: &BinaryScores| s.f1));
        }
        out
    }
}

impl FieldContract for BinaryEvaluationMetric {
    fn required_fields(&self) -> FieldMap {
        FieldMap::from([(self.config.input_field.clone(),
                         FieldSchema::new(DType::Int).describe("Binary target variable (0 or 1)")),
                        (self.config.prediction_field_prefix.clone(),
                         FieldSchema::new(DType::Float).prefixed().describe("Prefix of predicted probability fields"))])
    }

    fn created_fields(&self) -> FieldMap {
        FieldMap::new()
    }
}

impl ResultContract for BinaryEvaluationMetric {
    fn created_results(&self) -> ResultMap {
        ResultMap::from([(self.config.output_name.clone(), ResultType::Dataset)])
    }
}

impl Evaluator for BinaryEvaluationMetric {
    fn evaluate(&self, dataset: &dyn Dataset, datasets: &dyn DatasetFactory) -> Result<Vec<StepResult>, StepError> {
        let test = dataset.test_data();
        let target: Vec<i64> = test.field_values(&self.config.input_field)
                                   .iter()
                                   .map(|v| v.as_i64().unwrap_or(0))
                                   .collect();
        let variables: Vec<String> = test.fields()
                                         .into_keys()
                                         .filter(|f| f.starts_with(&self.config.prediction_field_prefix))
                                         .collect();
        let selected = self.selected();

        let mut columns = FieldColumns::new();
        columns.insert("variable".into(), variables.iter().map(|v| CellValue::Str(v.clone())).collect());
        for (name, _) in &selected {
            columns.insert((*name).into(), Vec::with_capacity(variables.len()));
        }
        for var in &variables {
            let predicted: Vec<i64> =
                test.field_values(var)
                    .iter()
                    .map(|v| v.as_f64().is_some_and(|p| p >= self.config.classification_threshold) as i64)
                    .collect();
            let scores = stats::binary_scores(&target, &predicted);
            for (name, get) in &selected {
                if let Some(col) = columns.get_mut(*name) {
                    col.push(CellValue::Float(get(&scores)));
                }
            }
        }

        let table = datasets.new_dataset(columns)?;
        Ok(vec![StepResult::new(self.id.clone(),
                                self.config.output_name.clone(),
                                ResultValue::Dataset(Arc::from(table)))])
    }
}

impl_step!(BinaryEvaluationMetric {
    name: "Binary evaluation metric",
    module: crate::STEPS_MODULE,
    config: BinaryEvaluationMetricConfig,
    roles: [evaluator],
    results: contract,
});
