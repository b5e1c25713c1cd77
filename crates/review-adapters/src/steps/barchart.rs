//! BarChartVisualizer (Visualizer)
//!
//! Dibuja un gráfico de barras a partir del dataset o de un resultado
//! DATASET publicado por un step anterior (`use_result`). Con
//! `use_result = "a.b"` se toma la entrada `b` del DATASET_DICT `a`.

use std::sync::Arc;

use indexmap::IndexMap;
use review_core::ids::{IdGenerator, UuidIdGenerator};
use review_core::{impl_step, CellValue, Colormap, Config, DType, Dataset, FieldContract, FieldMap, FieldSchema,
                  FigureFactory, NamedResults, Palette, ResultContract, ResultMap, ResultType, ResultValue, StepError,
                  StepResult, TypeSet, Visualizer};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartConfig {
    pub category_field: String,
    pub target_field: String,
    pub output_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub calculate_average_y: bool,
    pub use_result: Option<String>,
    pub use_category_colors: bool,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self { category_field: "x".into(),
               target_field: "y".into(),
               output_name: "barchart".into(),
               title: "Bar chart".into(),
               x_label: "x".into(),
               y_label: "y".into(),
               calculate_average_y: true,
               use_result: None,
               use_category_colors: false }
    }
}

impl Config for BarChartConfig {}

#[derive(Debug, Clone)]
pub struct BarChartVisualizer {
    id: String,
    config: BarChartConfig,
}

impl BarChartVisualizer {
    pub fn new(config: BarChartConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: BarChartConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: String, config: BarChartConfig) -> Self {
        Self { id, config }
    }

    /// `use_result` separado en (resultado, clave opcional del diccionario).
    fn result_source(&self) -> Option<(&str, Option<&str>)> {
        let source = self.config.use_result.as_deref().filter(|s| !s.is_empty())?;
        Some(match source.split_once('.') {
            Some((name, key)) => (name, Some(key)),
            None => (source, None),
        })
    }

    fn source<'a>(&self,
                  dataset: &'a dyn Dataset,
                  results: &'a NamedResults)
                  -> Result<&'a dyn Dataset, StepError> {
        let Some((name, key)) = self.result_source() else {
            return Ok(dataset);
        };
        let result = results.get(name).ok_or_else(|| format!("result '{name}' is not available"))?;
        match (&result.value, key) {
            (ResultValue::Dataset(d), None) => Ok(&**d),
            (ResultValue::DatasetDict(dict), Some(k)) => dict.get(k)
                                                             .map(|d| &**d)
                                                             .ok_or_else(|| format!("result '{name}' has no entry '{k}'").into()),
            _ => Err(format!("result '{name}' does not hold a usable dataset").into()),
        }
    }

    /// Agrupa `y` por `x` en orden de primera aparición (promedio o suma).
    pub fn aggregate(&self, xs: &[CellValue], ys: &[CellValue]) -> (Vec<CellValue>, Vec<f64>) {
        let mut groups: IndexMap<String, (CellValue, Vec<f64>)> = IndexMap::new();
        for (x, y) in xs.iter().zip(ys) {
            let Some(y) = y.as_f64() else { continue };
            groups.entry(x.to_string()).or_insert_with(|| (x.clone(), Vec::new())).1.push(y);
        }
        groups.into_values()
              .map(|(x, ys)| {
                  let v = if self.config.calculate_average_y {
                      stats::mean(&ys).unwrap_or(0.0)
                  } else {
                      ys.iter().sum()
                  };
                  (x, v)
              })
              .unzip()
    }
}

impl FieldContract for BarChartVisualizer {
    fn required_fields(&self) -> FieldMap {
        if self.result_source().is_some() {
            return FieldMap::new();
        }
        let numeric = || TypeSet::of([DType::Int, DType::Float]);
        FieldMap::from([(self.config.category_field.clone(),
                         FieldSchema::new(numeric()).describe("Category variable (x axis)")),
                        (self.config.target_field.clone(),
                         FieldSchema::new(numeric()).describe("Target variable (y axis)"))])
    }

    fn created_fields(&self) -> FieldMap {
        FieldMap::new()
    }
}

impl ResultContract for BarChartVisualizer {
    fn required_results(&self) -> ResultMap {
        match self.result_source() {
            Some((name, Some(_))) => ResultMap::from([(name.to_string(), ResultType::DatasetDict)]),
            Some((name, None)) => ResultMap::from([(name.to_string(), ResultType::Dataset)]),
            None => ResultMap::new(),
        }
    }

    fn created_results(&self) -> ResultMap {
        ResultMap::from([(self.config.output_name.clone(), ResultType::Figure)])
    }
}

impl Visualizer for BarChartVisualizer {
    fn visualize(&self,
                 dataset: &dyn Dataset,
                 results: &NamedResults,
                 mut palette: Palette,
                 _colormap: &Colormap,
                 figures: &dyn FigureFactory)
                 -> Result<Vec<StepResult>, StepError> {
        let source = self.source(dataset, results)?;
        let xs = source.field_values(&self.config.category_field);
        let ys = source.field_values(&self.config.target_field);
        if xs.is_empty() && source.row_count() > 0 {
            return Err(format!("category field '{}' not found", self.config.category_field).into());
        }
        let (categories, values) = self.aggregate(&xs, &ys);

        let colors: Vec<String> = if self.config.use_category_colors {
            // Un color por categoría, asignado en orden de categoría.
            let mut sorted: Vec<String> = categories.iter().map(ToString::to_string).collect();
            sorted.sort();
            let by_category: IndexMap<String, String> =
                sorted.into_iter().zip(palette.by_ref()).collect();
            categories.iter()
                      .map(|c| by_category.get(&c.to_string()).cloned().unwrap_or_default())
                      .collect()
        } else {
            let color = palette.next().unwrap_or_default();
            vec![color; categories.len()]
        };

        let raw = json!({
            "kind": "bar",
            "title": self.config.title,
            "spec": {
                "x": categories,
                "y": values,
                "colors": colors,
                "x_label": self.config.x_label,
                "y_label": self.config.y_label,
            }
        });
        let figure = figures.new_figure(raw)?;
        Ok(vec![StepResult::new(self.id.clone(),
                                self.config.output_name.clone(),
                                ResultValue::Figure(Arc::from(figure)))])
    }
}

impl_step!(BarChartVisualizer {
    name: "Bar chart visualizer",
    module: crate::STEPS_MODULE,
    config: BarChartConfig,
    roles: [visualizer],
    results: contract,
});

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(use_result: Option<&str>) -> BarChartVisualizer {
        BarChartVisualizer::with_id("b".into(),
                                    BarChartConfig { use_result: use_result.map(str::to_string),
                                                     ..Default::default() })
    }

    #[test]
    fn use_result_switches_contracts() {
        let plain = chart(None);
        assert_eq!(plain.required_fields().len(), 2);
        assert!(plain.required_results().is_empty());

        let single = chart(Some("rating_histogram"));
        assert!(single.required_fields().is_empty());
        assert_eq!(single.required_results()["rating_histogram"], ResultType::Dataset);

        let dict = chart(Some("scores.test"));
        assert_eq!(dict.required_results()["scores"], ResultType::DatasetDict);
    }

    #[test]
    fn aggregate_averages_in_first_appearance_order() {
        let c = chart(None);
        let xs = [CellValue::Int(2), CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)];
        let ys = [CellValue::Float(1.0), CellValue::Int(4), CellValue::Float(3.0), CellValue::Null];
        let (cats, vals) = c.aggregate(&xs, &ys);
        assert_eq!(cats, vec![CellValue::Int(2), CellValue::Int(1)]);
        assert_eq!(vals, vec![2.0, 4.0]);
    }
}
