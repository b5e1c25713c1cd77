use std::fmt::Debug;

use serde::Serialize;
use serde_json::{Map, Value};

use super::capability::{Analyser, Embedder, Evaluator, Predictor, Preprocessor, Visualizer};
use crate::errors::CoreEngineError;
use crate::model::{FieldMap, ResultMap};

/// Contrato de campos que todo step expone, sea cual sea su rol.
pub trait FieldContract {
    /// Campos que el step lee del dataset.
    fn required_fields(&self) -> FieldMap;
    /// Campos que el step agrega al dataset.
    fn created_fields(&self) -> FieldMap;
}

/// Contrato de resultados de los roles que producen resultados
/// (Analyser, Evaluator, Visualizer).
pub trait ResultContract {
    fn required_results(&self) -> ResultMap {
        ResultMap::new()
    }
    fn created_results(&self) -> ResultMap;
}

/// Step configurado e identificado.
///
/// Los accesores `as_*` devuelven `Some` para cada rol que el step
/// implementa. `Workflow` los consulta una sola vez al agregar el step (ver
/// `Capabilities::probe`).
pub trait Step: FieldContract + Debug + Send + Sync {
    /// Identificador estable (se preserva en la serialización).
    fn id(&self) -> &str;

    /// Nombre legible.
    fn name(&self) -> &str;

    /// Referencia de módulo usada por el registro de clases.
    fn module(&self) -> &str;

    /// Referencia de clase usada por el registro de clases.
    fn classname(&self) -> &str;

    /// Configuración actual como mapa JSON.
    fn config(&self) -> Result<Map<String, Value>, CoreEngineError>;

    /// Actualiza la configuración campo a campo (ver `Config::update`).
    fn update_config(&mut self, values: &Map<String, Value>) -> Result<(), CoreEngineError>;

    fn result_contract(&self) -> Option<&dyn ResultContract> {
        None
    }

    fn as_preprocessor(&self) -> Option<&dyn Preprocessor> {
        None
    }

    fn as_embedder(&mut self) -> Option<&mut dyn Embedder> {
        None
    }

    fn as_analyser(&self) -> Option<&dyn Analyser> {
        None
    }

    fn as_predictor(&mut self) -> Option<&mut dyn Predictor> {
        None
    }

    fn as_evaluator(&self) -> Option<&dyn Evaluator> {
        None
    }

    fn as_visualizer(&self) -> Option<&dyn Visualizer> {
        None
    }
}

/// Roles implementados por un step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub preprocessor: bool,
    pub embedder: bool,
    pub analyser: bool,
    pub predictor: bool,
    pub evaluator: bool,
    pub visualizer: bool,
}

impl Capabilities {
    /// Sondea los accesores de rol del step.
    ///
    /// Un rol productor de resultados sin contrato de resultados es un error
    /// de implementación del step.
    pub fn probe(step: &mut dyn Step) -> Result<Self, CoreEngineError> {
        let caps = Self { preprocessor: step.as_preprocessor().is_some(),
                          embedder: step.as_embedder().is_some(),
                          analyser: step.as_analyser().is_some(),
                          predictor: step.as_predictor().is_some(),
                          evaluator: step.as_evaluator().is_some(),
                          visualizer: step.as_visualizer().is_some() };
        if caps.produces_results() && step.result_contract().is_none() {
            return Err(CoreEngineError::Internal(format!("step '{}' ({}) produces results but exposes no result contract",
                                                         step.id(),
                                                         step.classname())));
        }
        Ok(caps)
    }

    pub fn produces_results(&self) -> bool {
        self.analyser || self.evaluator || self.visualizer
    }

    /// Nombres de los roles en orden de despacho.
    pub fn roles(&self) -> Vec<&'static str> {
        let flags = [(self.preprocessor, "preprocessor"),
                     (self.embedder, "embedder"),
                     (self.analyser, "analyser"),
                     (self.predictor, "predictor"),
                     (self.evaluator, "evaluator"),
                     (self.visualizer, "visualizer")];
        flags.into_iter().filter(|(on, _)| *on).map(|(_, n)| n).collect()
    }
}
