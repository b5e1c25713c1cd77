//! TokenCountEmbedder (Embedder + Analyser)
//!
//! Aprende un vocabulario top-k sobre la partición de entrenamiento y agrega
//! una columna de conteo por token (`<output_prefix><i>`). Publica el
//! vocabulario como resultado DATASET.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use review_core::ids::{IdGenerator, UuidIdGenerator};
use review_core::{impl_step, Analyser, CellValue, Config, DType, Dataset, DatasetFactory, Embedder, FieldColumns,
                  FieldContract, FieldMap, FieldSchema, NamedResults, ResultContract, ResultMap, ResultType, ResultValue,
                  StepError, StepResult, Trainable};
use serde::{Deserialize, Serialize};

use crate::text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCountEmbedderConfig {
    pub input_field: String,
    pub output_prefix: String,
    pub max_features: i64,
    pub vocabulary_name: String,
}

impl Default for TokenCountEmbedderConfig {
    fn default() -> Self {
        Self { input_field: "text".into(),
               output_prefix: "emb_".into(),
               max_features: 32,
               vocabulary_name: "vocabulary".into() }
    }
}

impl Config for TokenCountEmbedderConfig {}

#[derive(Debug, Clone)]
pub struct TokenCountEmbedder {
    id: String,
    config: TokenCountEmbedderConfig,
    /// Token -> frecuencia en entrenamiento, en orden de columna.
    vocabulary: Option<IndexMap<String, i64>>,
}

impl TokenCountEmbedder {
    pub fn new(config: TokenCountEmbedderConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: TokenCountEmbedderConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: String, config: TokenCountEmbedderConfig) -> Self {
        Self { id,
               config,
               vocabulary: None }
    }

    pub fn vocabulary(&self) -> Option<&IndexMap<String, i64>> {
        self.vocabulary.as_ref()
    }

    fn texts(&self, dataset: &dyn Dataset) -> Vec<String> {
        dataset.field_values(&self.config.input_field)
               .into_iter()
               .map(|v| match v {
                   CellValue::Null => String::new(),
                   CellValue::Str(s) => s,
                   other => other.to_string(),
               })
               .collect()
    }
}

impl FieldContract for TokenCountEmbedder {
    fn required_fields(&self) -> FieldMap {
        FieldMap::from([(self.config.input_field.clone(),
                         FieldSchema::new(DType::Str).describe("Preprocessed text"))])
    }

    fn created_fields(&self) -> FieldMap {
        FieldMap::from([(self.config.output_prefix.clone(),
                         FieldSchema::new(DType::Int).prefixed().describe("Token count fields"))])
    }
}

impl Trainable for TokenCountEmbedder {
    fn is_trained(&self) -> bool {
        self.vocabulary.is_some()
    }

    fn train(&mut self, dataset: &dyn Dataset) -> Result<(), StepError> {
        if self.is_trained() {
            return Ok(());
        }
        let train = dataset.train_data();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for t in self.texts(train.as_ref()) {
            for token in text::tokens(&t) {
                *counts.entry(token.to_string()).or_default() += 1;
            }
        }
        let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.config.max_features.max(0) as usize);
        debug!("embedder trained step_id={} vocabulary={}", self.id, ranked.len());
        self.vocabulary = Some(ranked.into_iter().collect());
        Ok(())
    }
}

impl Embedder for TokenCountEmbedder {
    fn embed(&self, mut dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        let vocab = self.vocabulary.as_ref().ok_or("embedder has not been trained yet")?;
        let texts = self.texts(dataset.as_ref());
        for (i, token) in vocab.keys().enumerate() {
            let column = texts.iter()
                              .map(|t| CellValue::Int(text::tokens(t).filter(|w| *w == token.as_str()).count() as i64))
                              .collect();
            dataset.set_field_values(&format!("{}{}", self.config.output_prefix, i), column)?;
        }
        Ok(dataset)
    }
}

impl ResultContract for TokenCountEmbedder {
    fn created_results(&self) -> ResultMap {
        ResultMap::from([(self.config.vocabulary_name.clone(), ResultType::Dataset)])
    }
}

impl Analyser for TokenCountEmbedder {
    fn analyse(&self,
               _dataset: &dyn Dataset,
               _results: &NamedResults,
               datasets: &dyn DatasetFactory)
               -> Result<Vec<StepResult>, StepError> {
        let vocab = self.vocabulary.as_ref().ok_or("embedder has not been trained yet")?;
        let mut cols = FieldColumns::new();
        cols.insert("field".into(),
                    (0..vocab.len()).map(|i| CellValue::Str(format!("{}{}", self.config.output_prefix, i))).collect());
        cols.insert("token".into(), vocab.keys().map(|k| CellValue::Str(k.clone())).collect());
        cols.insert("frequency".into(), vocab.values().map(|f| CellValue::Int(*f)).collect());
        let table = datasets.new_dataset(cols)?;
        Ok(vec![StepResult::new(self.id.clone(),
                                self.config.vocabulary_name.clone(),
                                ResultValue::Dataset(Arc::from(table)))])
    }
}

impl_step!(TokenCountEmbedder {
    name: "Token count embedder",
    module: crate::STEPS_MODULE,
    config: TokenCountEmbedderConfig,
    roles: [embedder, analyser],
    results: contract,
});

#[cfg(test)]
mod tests {
    use super::*;
    use review_domain::Table;
    use serde_json::json;

    #[test]
    fn vocabulary_ranks_by_count_then_alphabetically() {
        let table = Table::from_json(&json!({"text": ["beta alpha beta", "gamma alpha beta", ""]})).unwrap();
        let mut emb = TokenCountEmbedder::with_id("e".into(),
                                                  TokenCountEmbedderConfig { max_features: 2,
                                                                             ..Default::default() });
        emb.train(&table).unwrap();
        let vocab: Vec<(&str, i64)> = emb.vocabulary().unwrap().iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(vocab, vec![("beta", 3), ("alpha", 2)]);

        let out = emb.embed(Box::new(table)).unwrap();
        assert_eq!(out.field_values("emb_0"), vec![CellValue::Int(2), CellValue::Int(1), CellValue::Int(0)]);
        assert_eq!(out.field_values("emb_1"), vec![CellValue::Int(1), CellValue::Int(1), CellValue::Int(0)]);
        assert!(!out.has_field("emb_2"));
    }

    #[test]
    fn embedding_before_training_fails() {
        let emb = TokenCountEmbedder::with_id("e".into(), TokenCountEmbedderConfig::default());
        let table = Table::from_json(&json!({"text": ["a"]})).unwrap();
        assert!(emb.embed(Box::new(table)).is_err());
    }
}
