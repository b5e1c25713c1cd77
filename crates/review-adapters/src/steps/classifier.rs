//! CentroidClassifier (Predictor)
//!
//! Clasificador binario de centroide más cercano sobre las columnas de
//! embedding (y regresores adicionales). La probabilidad de la clase 1 es
//! `d0 / (d0 + d1)`.

use log::debug;
use review_core::ids::{IdGenerator, UuidIdGenerator};
use review_core::{impl_step, CellValue, Config, DType, Dataset, FieldContract, FieldMap, FieldSchema, Predictor, StepError,
                  Trainable, TypeSet};
use serde::{Deserialize, Serialize};

use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidClassifierConfig {
    pub input_field: String,
    pub output_prob_field: String,
    pub output_class_field: String,
    pub embedding_prefix: String,
    pub additional_regressor_fields: Vec<String>,
    pub classification_threshold: f64,
}

impl Default for CentroidClassifierConfig {
    fn default() -> Self {
        Self { input_field: "y".into(),
               output_prob_field: "y_prob".into(),
               output_class_field: "y_pred".into(),
               embedding_prefix: "emb_".into(),
               additional_regressor_fields: Vec::new(),
               classification_threshold: 0.5 }
    }
}

impl Config for CentroidClassifierConfig {}

#[derive(Debug, Clone, PartialEq)]
struct Model {
    features: Vec<String>,
    negative: Vec<f64>,
    positive: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct CentroidClassifier {
    id: String,
    config: CentroidClassifierConfig,
    model: Option<Model>,
}

impl CentroidClassifier {
    pub fn new(config: CentroidClassifierConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: CentroidClassifierConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: String, config: CentroidClassifierConfig) -> Self {
        Self { id,
               config,
               model: None }
    }

    /// Columnas regresoras: prefijo de embedding y campos adicionales.
    fn feature_names(&self, dataset: &dyn Dataset) -> Vec<String> {
        let mut names: Vec<String> = dataset.fields()
                                            .into_keys()
                                            .filter(|f| f.starts_with(&self.config.embedding_prefix))
                                            .collect();
        for extra in &self.config.additional_regressor_fields {
            if !names.contains(extra) {
                names.push(extra.clone());
            }
        }
        names
    }

    /// Matriz fila x feature (nulos como 0).
    fn rows(dataset: &dyn Dataset, features: &[String]) -> Result<Vec<Vec<f64>>, StepError> {
        let columns: Vec<Vec<CellValue>> = features.iter().map(|f| dataset.field_values(f)).collect();
        for (name, col) in features.iter().zip(&columns) {
            if col.len() != dataset.row_count() {
                return Err(format!("missing regressor field '{name}'").into());
            }
        }
        Ok((0..dataset.row_count()).map(|i| columns.iter().map(|c| c[i].as_f64().unwrap_or(0.0)).collect())
                                   .collect())
    }
}

fn centroid(rows: &[&Vec<f64>], width: usize) -> Vec<f64> {
    let mut c = vec![0.0; width];
    for r in rows {
        for (acc, v) in c.iter_mut().zip(r.iter()) {
            *acc += v;
        }
    }
    let n = rows.len().max(1) as f64;
    c.iter_mut().for_each(|v| *v /= n);
    c
}

impl FieldContract for CentroidClassifier {
    fn required_fields(&self) -> FieldMap {
        let mut fields = FieldMap::from([(self.config.input_field.clone(),
                                          FieldSchema::new(DType::Int).describe("Binary target variable (0 or 1)")),
                                         (self.config.embedding_prefix.clone(),
                                          FieldSchema::new(TypeSet::of([DType::Int, DType::Float])).prefixed()
                                                                                                   .describe("Prefix for embedding fields"))]);
        for field in &self.config.additional_regressor_fields {
            fields.insert(field.clone(),
                          FieldSchema::new(DType::Float).describe(format!("Regressor variable '{field}'")));
        }
        fields
    }

    fn created_fields(&self) -> FieldMap {
        FieldMap::from([(self.config.output_prob_field.clone(),
                         FieldSchema::new(DType::Float).describe("Predicted probability score")),
                        (self.config.output_class_field.clone(),
                         FieldSchema::new(DType::Int).describe("Predicted binary class"))])
    }
}

impl Trainable for CentroidClassifier {
    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn train(&mut self, dataset: &dyn Dataset) -> Result<(), StepError> {
        if self.is_trained() {
            return Ok(());
        }
        let train = dataset.train_data();
        let features = self.feature_names(train.as_ref());
        if features.is_empty() {
            return Err(format!("no regressor fields with prefix '{}'", self.config.embedding_prefix).into());
        }
        let rows = Self::rows(train.as_ref(), &features)?;
        let target = train.field_values(&self.config.input_field);
        let (mut neg, mut pos) = (Vec::new(), Vec::new());
        for (row, t) in rows.iter().zip(&target) {
            match t.as_i64() {
                Some(1) => pos.push(row),
                Some(0) => neg.push(row),
                _ => {}
            }
        }
        if neg.is_empty() || pos.is_empty() {
            return Err("training data must contain both classes (0 and 1)".into());
        }
        debug!("classifier trained step_id={} features={} negatives={} positives={}",
               self.id,
               features.len(),
               neg.len(),
               pos.len());
        self.model = Some(Model { negative: centroid(&neg, features.len()),
                                  positive: centroid(&pos, features.len()),
                                  features });
        Ok(())
    }
}

impl Predictor for CentroidClassifier {
    fn predict(&self, mut dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        let model = self.model.as_ref().ok_or("model has not been trained")?;
        let rows = Self::rows(dataset.as_ref(), &model.features)?;
        let probs: Vec<f64> = rows.iter()
                                  .map(|r| {
                                      let d0 = stats::euclidean(r, &model.negative);
                                      let d1 = stats::euclidean(r, &model.positive);
                                      if d0 + d1 == 0.0 {
                                          0.5
                                      } else {
                                          d0 / (d0 + d1)
                                      }
                                  })
                                  .collect();
        let classes = probs.iter()
                           .map(|p| CellValue::Int((*p >= self.config.classification_threshold) as i64))
                           .collect();
        dataset.set_field_values(&self.config.output_prob_field, probs.into_iter().map(CellValue::Float).collect())?;
        dataset.set_field_values(&self.config.output_class_field, classes)?;
        Ok(dataset)
    }
}

impl_step!(CentroidClassifier {
    name: "Centroid classifier",
    module: crate::STEPS_MODULE,
    config: CentroidClassifierConfig,
    roles: [predictor],
});

#[cfg(test)]
mod tests {
    use super::*;
    use review_domain::Table;
    use serde_json::json;

    fn classifier() -> CentroidClassifier {
        CentroidClassifier::with_id("c".into(), CentroidClassifierConfig::default())
    }

    #[test]
    fn predicts_nearest_centroid() {
        let table = Table::from_json(&json!({
            "y": [1, 1, 0, 0],
            "emb_0": [3, 2, 0, 0],
            "emb_1": [0, 0, 2, 3]
        })).unwrap();
        let mut clf = classifier();
        clf.train(&table).unwrap();
        let out = clf.predict(Box::new(table)).unwrap();
        assert_eq!(out.field_values("y_pred"), out.field_values("y"));
        let probs: Vec<f64> = out.field_values("y_prob").iter().filter_map(CellValue::as_f64).collect();
        assert!(probs[0] > 0.5 && probs[3] < 0.5);
    }

    #[test]
    fn training_requires_both_classes() {
        let table = Table::from_json(&json!({"y": [1, 1], "emb_0": [1, 2]})).unwrap();
        assert!(classifier().train(&table).is_err());
        assert!(classifier().predict(Box::new(table)).is_err());
    }

    #[test]
    fn additional_regressors_are_required_as_float() {
        let clf = CentroidClassifier::with_id("c".into(),
                                              CentroidClassifierConfig { additional_regressor_fields: vec!["len".into()],
                                                                         ..Default::default() });
        let fields = clf.required_fields();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["y", "emb_", "len"]);
        assert!(fields["emb_"].prefix);
    }
}
