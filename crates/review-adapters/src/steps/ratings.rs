//! RatingAnalyser (Analyser): histograma y cuantiles de un campo de rating.

use std::collections::BTreeMap;
use std::sync::Arc;

use review_core::ids::{IdGenerator, UuidIdGenerator};
use review_core::{impl_step, Analyser, CellValue, Config, DType, Dataset, DatasetFactory, FieldColumns, FieldContract,
                  FieldMap, FieldSchema, NamedResults, ResultContract, ResultMap, ResultType, ResultValue, StepError,
                  StepResult};
use serde::{Deserialize, Serialize};

use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAnalyserConfig {
    pub input_field: String,
    pub output_histogram_name: String,
    pub output_quantile_name: String,
    pub quantiles: Vec<f64>,
    pub min_rating: i64,
    pub max_rating: i64,
    pub fill_rating_gaps: bool,
}

impl Default for RatingAnalyserConfig {
    fn default() -> Self {
        Self { input_field: "rating".into(),
               output_histogram_name: "rating_histogram".into(),
               output_quantile_name: "rating_quantiles".into(),
               quantiles: vec![0.05, 0.25, 0.50, 0.75, 0.95],
               min_rating: 1,
               max_rating: 5,
               fill_rating_gaps: false }
    }
}

impl Config for RatingAnalyserConfig {}

#[derive(Debug, Clone)]
pub struct RatingAnalyser {
    id: String,
    config: RatingAnalyserConfig,
}

impl RatingAnalyser {
    pub fn new(config: RatingAnalyserConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: RatingAnalyserConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: String, config: RatingAnalyserConfig) -> Self {
        Self { id, config }
    }

    /// Frecuencia por rating, ordenada por rating.
    pub fn histogram(&self, ratings: &[i64]) -> BTreeMap<i64, i64> {
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for r in ratings {
            *counts.entry(*r).or_default() += 1;
        }
        if self.config.fill_rating_gaps {
            for r in self.config.min_rating..=self.config.max_rating {
                counts.entry(r).or_insert(0);
            }
        }
        counts
    }
}

impl FieldContract for RatingAnalyser {
    fn required_fields(&self) -> FieldMap {
        FieldMap::from([(self.config.input_field.clone(),
                         FieldSchema::new(DType::Int).describe("Numerical rating of the review"))])
    }

    fn created_fields(&self) -> FieldMap {
        FieldMap::new()
    }
}

impl ResultContract for RatingAnalyser {
    fn created_results(&self) -> ResultMap {
        ResultMap::from([(self.config.output_histogram_name.clone(), ResultType::Dataset),
                         (self.config.output_quantile_name.clone(), ResultType::Dataset)])
    }
}

impl Analyser for RatingAnalyser {
    fn analyse(&self,
               dataset: &dyn Dataset,
               _results: &NamedResults,
               datasets: &dyn DatasetFactory)
               -> Result<Vec<StepResult>, StepError> {
        let values = dataset.field_values(&self.config.input_field);
        let ratings: Vec<i64> = values.iter().filter_map(CellValue::as_i64).collect();
        if ratings.len() != values.iter().filter(|v| !v.is_null()).count() {
            return Err(format!("not all values of '{}' are integer ratings", self.config.input_field).into());
        }

        let hist = self.histogram(&ratings);
        let mut hist_cols = FieldColumns::new();
        hist_cols.insert("rating".into(), hist.keys().map(|r| CellValue::Int(*r)).collect());
        hist_cols.insert("frequency".into(), hist.values().map(|f| CellValue::Int(*f)).collect());

        let mut sorted: Vec<f64> = ratings.iter().map(|r| *r as f64).collect();
        sorted.sort_by(f64::total_cmp);
        let (qs, vals): (Vec<CellValue>, Vec<CellValue>) =
            self.config
                .quantiles
                .iter()
                .filter_map(|q| stats::quantile(&sorted, *q).map(|v| (CellValue::Float(*q), CellValue::Float(v))))
                .unzip();
        let mut quant_cols = FieldColumns::new();
        quant_cols.insert("quantile".into(), qs);
        quant_cols.insert("value".into(), vals);

        Ok(vec![StepResult::new(self.id.clone(),
                                self.config.output_histogram_name.clone(),
                                ResultValue::Dataset(Arc::from(datasets.new_dataset(hist_cols)?))),
                StepResult::new(self.id.clone(),
                                self.config.output_quantile_name.clone(),
                                ResultValue::Dataset(Arc::from(datasets.new_dataset(quant_cols)?)))])
    }
}

impl_step!(RatingAnalyser {
    name: "Rating analyser",
    module: crate::STEPS_MODULE,
    config: RatingAnalyserConfig,
    roles: [analyser],
    results: contract,
});
