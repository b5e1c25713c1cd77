//! Steps de prueba configurables por JSON.
//!
//! Los contratos se declaran como mapas `nombre -> tipo`; un nombre que
//! termina en `*` es un prefijo. `Tracer` implementa todos los roles y deja
//! rastro del orden de despacho en la columna `trace`.
#![allow(dead_code)]

use std::sync::Arc;

use indexmap::IndexMap;
use review_core::{impl_step, Analyser, CellValue, Colormap, Config, Dataset, DatasetFactory, Embedder, Evaluator,
                  FieldColumns, FieldContract, FieldMap, FieldSchema, FigureFactory, NamedResults, Palette, Predictor,
                  Preprocessor, ResultContract, ResultMap, ResultType, ResultValue, StepError, StepRegistry, StepResult,
                  Trainable, TypeSet, Visualizer};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const MODULE: &str = "tests::fakes";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractConfig {
    #[serde(default)]
    pub requires: IndexMap<String, String>,
    #[serde(default)]
    pub creates: IndexMap<String, String>,
    #[serde(default)]
    pub requires_results: IndexMap<String, String>,
    #[serde(default)]
    pub creates_results: IndexMap<String, String>,
}

impl Config for ContractConfig {}

impl ContractConfig {
    pub fn requires(mut self, name: &str, ty: &str) -> Self {
        self.requires.insert(name.into(), ty.into());
        self
    }

    pub fn creates(mut self, name: &str, ty: &str) -> Self {
        self.creates.insert(name.into(), ty.into());
        self
    }

    pub fn requires_result(mut self, name: &str, ty: &str) -> Self {
        self.requires_results.insert(name.into(), ty.into());
        self
    }

    pub fn creates_result(mut self, name: &str, ty: &str) -> Self {
        self.creates_results.insert(name.into(), ty.into());
        self
    }
}

fn field_map(spec: &IndexMap<String, String>) -> FieldMap {
    spec.iter()
        .map(|(name, ty)| {
            let dtype = ty.parse::<TypeSet>().unwrap_or(TypeSet::Any);
            match name.strip_suffix('*') {
                Some(prefix) => (prefix.to_string(), FieldSchema::new(dtype).prefixed()),
                None => (name.clone(), FieldSchema::new(dtype)),
            }
        })
        .collect()
}

fn result_map(spec: &IndexMap<String, String>) -> ResultMap {
    spec.iter()
        .map(|(name, ty)| (name.clone(), ty.parse::<ResultType>().unwrap_or(ResultType::String)))
        .collect()
}

fn fill(dtype: &TypeSet, rows: usize) -> Vec<CellValue> {
    let cell = match dtype {
        TypeSet::Of(types) if types.contains(&review_core::DType::Float) => CellValue::Float(0.5),
        TypeSet::Of(types) if types.contains(&review_core::DType::Str) => CellValue::from("x"),
        TypeSet::Of(types) if types.contains(&review_core::DType::Bool) => CellValue::Bool(true),
        _ => CellValue::Int(1),
    };
    vec![cell; rows]
}

macro_rules! contract_step {
    ($ty:ident) => {
        #[derive(Debug, Clone)]
        pub struct $ty {
            id: String,
            config: ContractConfig,
        }

        impl $ty {
            pub fn with_id(id: impl Into<String>, config: ContractConfig) -> Self {
                Self { id: id.into(),
                       config }
            }
        }

        impl FieldContract for $ty {
            fn required_fields(&self) -> FieldMap {
                field_map(&self.config.requires)
            }

            fn created_fields(&self) -> FieldMap {
                field_map(&self.config.creates)
            }
        }

        impl ResultContract for $ty {
            fn required_results(&self) -> ResultMap {
                result_map(&self.config.requires_results)
            }

            fn created_results(&self) -> ResultMap {
                result_map(&self.config.creates_results)
            }
        }
    };
}

contract_step!(Writer);
contract_step!(Reporter);
contract_step!(Liar);

/// Preprocessor: escribe cada campo creado con un valor del tipo declarado.
impl Preprocessor for Writer {
    fn preprocess(&self, mut dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        let rows = dataset.row_count();
        for (name, schema) in self.created_fields() {
            dataset.set_field_values(&name, fill(&schema.dtype, rows))?;
        }
        Ok(dataset)
    }
}

impl_step!(Writer { name: "Writer", module: MODULE, config: ContractConfig, roles: [preprocessor] });

fn report(step: &dyn ResultContract,
          dataset: &dyn Dataset,
          datasets: &dyn DatasetFactory,
          lie: bool)
          -> Result<Vec<StepResult>, StepError> {
    let mut out = Vec::new();
    for (name, ty) in step.created_results() {
        let value = match (ty, lie) {
            (_, true) => ResultValue::String("wrong".into()),
            (ResultType::Dataset, _) => {
                let mut cols = FieldColumns::new();
                cols.insert("rows".into(), vec![CellValue::Int(dataset.row_count() as i64)]);
                ResultValue::Dataset(Arc::from(datasets.new_dataset(cols)?))
            }
            (ResultType::Integer, _) => ResultValue::Integer(dataset.row_count() as i64),
            (ResultType::Float, _) => ResultValue::Float(dataset.row_count() as f64),
            (ResultType::Percent, _) => ResultValue::Percent(1.0),
            _ => ResultValue::String(format!("{} rows", dataset.row_count())),
        };
        // El engine completa step_id y result_type.
        out.push(StepResult::new("", name, value));
    }
    Ok(out)
}

/// Analyser: publica un valor por cada resultado declarado.
impl Analyser for Reporter {
    fn analyse(&self,
               dataset: &dyn Dataset,
               _results: &NamedResults,
               datasets: &dyn DatasetFactory)
               -> Result<Vec<StepResult>, StepError> {
        report(self, dataset, datasets, false)
    }
}

impl_step!(Reporter {
    name: "Reporter",
    module: MODULE,
    config: ContractConfig,
    roles: [analyser],
    results: contract,
});

/// Evaluator que publica valores de tipo distinto al declarado.
impl Evaluator for Liar {
    fn evaluate(&self, dataset: &dyn Dataset, datasets: &dyn DatasetFactory) -> Result<Vec<StepResult>, StepError> {
        report(self, dataset, datasets, true)
    }
}

impl_step!(Liar {
    name: "Liar",
    module: MODULE,
    config: ContractConfig,
    roles: [evaluator],
    results: contract,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracerConfig {
    pub label: String,
}

impl Config for TracerConfig {}

/// Implementa los seis roles; cada uno agrega su etiqueta a `trace`.
#[derive(Debug, Clone)]
pub struct Tracer {
    id: String,
    config: TracerConfig,
    trainings: usize,
}

impl Tracer {
    pub fn with_id(id: impl Into<String>, config: TracerConfig) -> Self {
        Self { id: id.into(),
               config,
               trainings: 0 }
    }
}

fn current_trace(dataset: &dyn Dataset) -> String {
    dataset.field_values("trace")
           .first()
           .and_then(|c| c.as_str().map(str::to_string))
           .unwrap_or_default()
}

fn push_trace(mut dataset: Box<dyn Dataset>, tag: &str) -> Result<Box<dyn Dataset>, StepError> {
    let trace = current_trace(dataset.as_ref());
    let next = if trace.is_empty() { tag.to_string() } else { format!("{trace},{tag}") };
    let rows = dataset.row_count();
    dataset.set_field_values("trace", vec![CellValue::Str(next); rows])?;
    Ok(dataset)
}

impl FieldContract for Tracer {
    fn required_fields(&self) -> FieldMap {
        FieldMap::new()
    }

    fn created_fields(&self) -> FieldMap {
        FieldMap::from([("trace".to_string(), FieldSchema::new(review_core::DType::Str))])
    }
}

impl ResultContract for Tracer {
    fn created_results(&self) -> ResultMap {
        ResultMap::from([("analysed".to_string(), ResultType::String),
                         ("evaluated".to_string(), ResultType::String),
                         ("chart".to_string(), ResultType::Figure)])
    }
}

impl Preprocessor for Tracer {
    fn preprocess(&self, dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        push_trace(dataset, "pre")
    }
}

impl Trainable for Tracer {
    fn is_trained(&self) -> bool {
        self.trainings > 0
    }

    fn train(&mut self, _dataset: &dyn Dataset) -> Result<(), StepError> {
        self.trainings += 1;
        Ok(())
    }
}

impl Embedder for Tracer {
    fn embed(&self, dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        push_trace(dataset, "emb")
    }
}

impl Analyser for Tracer {
    fn analyse(&self,
               dataset: &dyn Dataset,
               _results: &NamedResults,
               _datasets: &dyn DatasetFactory)
               -> Result<Vec<StepResult>, StepError> {
        Ok(vec![StepResult::new("", "analysed", ResultValue::String(current_trace(dataset)))])
    }
}

impl Predictor for Tracer {
    fn predict(&self, dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        push_trace(dataset, "pred")
    }
}

impl Evaluator for Tracer {
    fn evaluate(&self, dataset: &dyn Dataset, _datasets: &dyn DatasetFactory) -> Result<Vec<StepResult>, StepError> {
        Ok(vec![StepResult::new("", "evaluated", ResultValue::String(current_trace(dataset)))])
    }
}

impl Visualizer for Tracer {
    fn visualize(&self,
                 _dataset: &dyn Dataset,
                 results: &NamedResults,
                 mut palette: Palette,
                 _colormap: &Colormap,
                 figures: &dyn FigureFactory)
                 -> Result<Vec<StepResult>, StepError> {
        let seen: Vec<&String> = results.keys().collect();
        let figure = figures.new_figure(json!({
                                "kind": "trace",
                                "title": self.config.label,
                                "spec": {"seen": seen, "color": palette.next(), "trainings": self.trainings}
                            }))?;
        Ok(vec![StepResult::new("", "chart", ResultValue::Figure(Arc::from(figure)))])
    }
}

impl_step!(Tracer {
    name: "Tracer",
    module: MODULE,
    config: TracerConfig,
    roles: [preprocessor, embedder, analyser, predictor, evaluator, visualizer],
    results: contract,
});

pub fn registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register::<Writer>().register::<Reporter>().register::<Liar>().register::<Tracer>();
    registry
}
