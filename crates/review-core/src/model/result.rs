//! Resultados producidos por los steps.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::data::Dataset;
use crate::runtime::Figure;

/// Tipo declarado de un resultado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Dataset,
    DatasetDict,
    Figure,
    Percent,
    Float,
    Integer,
    String,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Dataset => "dataset",
            ResultType::DatasetDict => "dataset_dict",
            ResultType::Figure => "figure",
            ResultType::Percent => "percent",
            ResultType::Float => "float",
            ResultType::Integer => "integer",
            ResultType::String => "string",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dataset" => Ok(ResultType::Dataset),
            "dataset_dict" => Ok(ResultType::DatasetDict),
            "figure" => Ok(ResultType::Figure),
            "percent" => Ok(ResultType::Percent),
            "float" => Ok(ResultType::Float),
            "integer" => Ok(ResultType::Integer),
            "string" => Ok(ResultType::String),
            other => Err(format!("unknown result type '{other}'")),
        }
    }
}

/// Valor de un resultado. Datasets y figuras se comparten por `Arc` para que
/// el registro por nombre y el registro por step apunten al mismo valor.
#[derive(Debug, Clone)]
pub enum ResultValue {
    Dataset(Arc<dyn Dataset>),
    DatasetDict(IndexMap<String, Arc<dyn Dataset>>),
    Figure(Arc<dyn Figure>),
    Percent(f64),
    Float(f64),
    Integer(i64),
    String(String),
}

impl ResultValue {
    /// Tipo que corresponde al valor.
    pub fn result_type(&self) -> ResultType {
        match self {
            ResultValue::Dataset(_) => ResultType::Dataset,
            ResultValue::DatasetDict(_) => ResultType::DatasetDict,
            ResultValue::Figure(_) => ResultType::Figure,
            ResultValue::Percent(_) => ResultType::Percent,
            ResultValue::Float(_) => ResultType::Float,
            ResultValue::Integer(_) => ResultType::Integer,
            ResultValue::String(_) => ResultType::String,
        }
    }

    pub fn as_dataset(&self) -> Option<&Arc<dyn Dataset>> {
        match self {
            ResultValue::Dataset(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_figure(&self) -> Option<&Arc<dyn Figure>> {
        match self {
            ResultValue::Figure(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ResultValue::Percent(v) | ResultValue::Float(v) => Some(*v),
            ResultValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Representación serializable (persistencia / CLI).
    pub fn to_json(&self) -> Value {
        match self {
            ResultValue::Dataset(d) => d.to_dict(),
            ResultValue::DatasetDict(map) => {
                Value::Object(map.iter().map(|(k, d)| (k.clone(), d.to_dict())).collect())
            }
            ResultValue::Figure(f) => f.to_json(),
            ResultValue::Percent(v) | ResultValue::Float(v) => json!(v),
            ResultValue::Integer(v) => json!(v),
            ResultValue::String(s) => json!(s),
        }
    }
}

/// Resultado producido por un step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_id: String,
    pub name: String,
    pub result_type: ResultType,
    pub value: ResultValue,
}

impl StepResult {
    /// Construye un resultado tomando el tipo del propio valor.
    pub fn new(step_id: impl Into<String>, name: impl Into<String>, value: ResultValue) -> Self {
        Self { step_id: step_id.into(),
               name: name.into(),
               result_type: value.result_type(),
               value }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "step_id": self.step_id,
            "name": self.name,
            "type": self.result_type,
            "value": self.value.to_json(),
        })
    }
}

/// Contrato de resultados: nombre -> tipo.
pub type ResultMap = IndexMap<String, ResultType>;

/// Registro por nombre visible a los steps posteriores de una ejecución.
pub type NamedResults = IndexMap<String, StepResult>;

/// Resultados de un workflow agrupados por id de step (en orden).
pub type WorkflowResults = IndexMap<String, Vec<StepResult>>;

/// Resultados de un análisis agrupados por id de workflow.
pub type AnalysisResults = IndexMap<String, WorkflowResults>;
