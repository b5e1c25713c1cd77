//! Registro de clases de step para reconstruir workflows serializados.
//!
//! Cada clase se identifica por `(module, classname)` y se construye con su
//! configuración por defecto, el id serializado y luego `Config::update` con
//! la configuración serializada.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::errors::CoreEngineError;
use crate::ids::IdGenerator;
use crate::schema::StepSchema;
use crate::step::Step;

/// Fábrica de una clase de step.
pub type StepFactory = fn(String, &Map<String, Value>) -> Result<Box<dyn Step>, CoreEngineError>;

/// Clase de step registrable (implementada por `impl_step!`).
pub trait StepClass {
    const MODULE: &'static str;
    const CLASSNAME: &'static str;

    fn build(id: String, config: &Map<String, Value>) -> Result<Box<dyn Step>, CoreEngineError>;
}

#[derive(Default, Clone)]
pub struct StepRegistry {
    factories: IndexMap<(String, String), StepFactory>,
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una fábrica arbitraria. Reemplaza una registración previa.
    pub fn register_factory(&mut self, module: &str, classname: &str, factory: StepFactory) {
        if self.factories
               .insert((module.to_string(), classname.to_string()), factory)
               .is_some()
        {
            log::warn!("step class re-registered module={module} classname={classname}");
        }
    }

    pub fn register<T: StepClass>(&mut self) -> &mut Self {
        self.register_factory(T::MODULE, T::CLASSNAME, T::build);
        self
    }

    pub fn contains(&self, module: &str, classname: &str) -> bool {
        self.factories.contains_key(&(module.to_string(), classname.to_string()))
    }

    /// Clases registradas `(module, classname)` en orden de registro.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.factories.keys().map(|(m, c)| (m.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construye un step desde su descriptor. Si el descriptor no trae id se
    /// genera uno nuevo.
    pub fn build(&self, schema: &StepSchema, ids: &dyn IdGenerator) -> Result<Box<dyn Step>, CoreEngineError> {
        let factory = self.factories
                          .get(&(schema.module.clone(), schema.classname.clone()))
                          .ok_or_else(|| CoreEngineError::UnknownStep { module: schema.module.clone(),
                                                                        classname: schema.classname.clone() })?;
        let id = schema.id.clone().unwrap_or_else(|| ids.next_id());
        factory(id, &schema.config)
    }
}
