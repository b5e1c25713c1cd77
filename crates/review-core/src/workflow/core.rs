//! Implementación de `Workflow`: composición validada y ejecución con
//! despacho por roles.

use log::{debug, info, warn};
use serde_json::{json, Map, Value};

use super::contract::{FieldFold, ResultFold};
use super::WorkflowConfig;
use crate::constants::ENGINE_VERSION;
use crate::data::Dataset;
use crate::errors::{CoreEngineError, StepError};
use crate::hashing::hash_value;
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::model::{AnalysisFields, NamedResults, ResultMap, StepResult, WorkflowId, WorkflowResults};
use crate::registry::StepRegistry;
use crate::runtime::Runtime;
use crate::schema::{StepSchema, WorkflowSchema};
use crate::step::{Capabilities, Config, Step};

/// Callback de progreso: `(step_id, step_name)` tras cada step completado.
pub type ProgressFn<'a> = &'a mut dyn FnMut(&str, &str);

#[derive(Debug)]
struct StepEntry {
    step: Box<dyn Step>,
    caps: Capabilities,
}

/// Cadena ordenada de steps que comparten un dataset y un registro de
/// resultados.
#[derive(Debug)]
pub struct Workflow {
    id: WorkflowId,
    config: WorkflowConfig,
    steps: Vec<StepEntry>,
}

impl Workflow {
    /// Workflow vacío con id UUID.
    pub fn new(config: WorkflowConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: WorkflowConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: impl Into<String>, config: WorkflowConfig) -> Self {
        Self { id: id.into(),
               config,
               steps: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Reemplaza la configuración y revalida (la lista de eliminación afecta
    /// a `available`).
    pub fn configure(&mut self, config: WorkflowConfig) -> Result<(), CoreEngineError> {
        let previous = std::mem::replace(&mut self.config, config);
        if let Err(e) = self.validate() {
            self.config = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Actualiza la configuración campo a campo.
    pub fn update_config(&mut self, values: &Map<String, Value>) -> Result<(), CoreEngineError> {
        let mut config = self.config.clone();
        config.update(values)?;
        self.configure(config)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps en orden.
    pub fn steps(&self) -> impl Iterator<Item = &dyn Step> {
        self.steps.iter().map(|e| e.step.as_ref())
    }

    /// Roles del step en la posición `index`.
    pub fn capabilities(&self, index: usize) -> Option<Capabilities> {
        self.steps.get(index).map(|e| e.caps)
    }

    /// Agrega un step y revalida el contrato completo (encadenable).
    pub fn add<S: Step + 'static>(mut self, step: S) -> Result<Self, CoreEngineError> {
        self.add_boxed(Box::new(step))?;
        Ok(self)
    }

    /// Agrega un step ya encajonado. Si el contrato resultante es inválido el
    /// step se descarta y el workflow queda como estaba. El id del step debe
    /// ser único dentro del workflow: agrupa sus resultados.
    pub fn add_boxed(&mut self, mut step: Box<dyn Step>) -> Result<(), CoreEngineError> {
        if self.steps.iter().any(|e| e.step.id() == step.id()) {
            warn!("workflow add rejected workflow_id={} duplicate step_id={}", self.id, step.id());
            return Err(CoreEngineError::DuplicateId { kind: "step".into(),
                                                      id: step.id().to_string() });
        }
        let caps = Capabilities::probe(step.as_mut())?;
        debug!("workflow add workflow_id={} step_id={} class={} roles={:?}",
               self.id,
               step.id(),
               step.classname(),
               caps.roles());
        self.steps.push(StepEntry { step, caps });
        if let Err(e) = self.validate() {
            self.steps.pop();
            warn!("workflow add rejected workflow_id={} error={}", self.id, e);
            return Err(e);
        }
        Ok(())
    }

    /// Quita el último step (para recomponer interactivamente).
    pub fn pop(&mut self) -> Option<Box<dyn Step>> {
        self.steps.pop().map(|e| e.step)
    }

    fn validate(&self) -> Result<(), CoreEngineError> {
        self.get_fields()?;
        self.get_results()?;
        Ok(())
    }

    /// Contrato de campos del workflow (plegado izquierda-derecha).
    pub fn get_fields(&self) -> Result<AnalysisFields, CoreEngineError> {
        let mut fold = FieldFold::new();
        for entry in &self.steps {
            for (name, schema) in &entry.step.required_fields() {
                fold.require(name, schema)?;
            }
            for (name, schema) in &entry.step.created_fields() {
                fold.create(name, schema)?;
            }
        }
        Ok(fold.finish(&self.config.post_drop_columns))
    }

    /// Contrato de resultados del workflow.
    pub fn get_results(&self) -> Result<ResultMap, CoreEngineError> {
        let mut fold = ResultFold::new();
        for entry in &self.steps {
            let Some(contract) = entry.step.result_contract() else {
                continue;
            };
            for (name, ty) in contract.required_results() {
                fold.require(entry.step.id(), &name, ty)?;
            }
            for (name, ty) in contract.created_results() {
                fold.create(&name, ty)?;
            }
        }
        Ok(fold.finish())
    }

    /// Ejecuta el workflow sobre una copia del dataset.
    pub fn run(&mut self,
               runtime: &Runtime,
               dataset: &dyn Dataset)
               -> Result<(Box<dyn Dataset>, WorkflowResults), CoreEngineError> {
        self.run_with_progress(runtime, dataset, &mut |_, _| {})
    }

    /// Igual que `run`, invocando `progress` tras cada step completado.
    pub fn run_with_progress(&mut self,
                             runtime: &Runtime,
                             dataset: &dyn Dataset,
                             progress: ProgressFn<'_>)
                             -> Result<(Box<dyn Dataset>, WorkflowResults), CoreEngineError> {
        let hash = self.definition_hash()?;
        info!("workflow start workflow_id={} name={} steps={} definition_hash={}",
              self.id,
              self.config.name,
              self.steps.len(),
              hash);

        let mut data = dataset.copy();
        if let Some(rule) = self.config.filter() {
            data.apply_filter(rule)?;
            debug!("workflow filter workflow_id={} rule={} rows={}", self.id, rule, data.row_count());
        }

        let mut named = NamedResults::new();
        let mut by_step = WorkflowResults::new();

        for entry in self.steps.iter_mut() {
            let step_id = entry.step.id().to_string();
            let caps = entry.caps;
            debug!("workflow dispatch workflow_id={} step_id={} roles={:?}", self.id, step_id, caps.roles());
            let fail = |e: StepError| CoreEngineError::StepFailed { step_id: step_id.clone(),
                                                                    message: e.to_string() };
            let missing = |role: &str| CoreEngineError::Internal(format!("step '{step_id}' lost its {role} role"));
            let declared = entry.step.result_contract().map(|c| c.created_results()).unwrap_or_default();
            let mut produced: Vec<StepResult> = Vec::new();

            if caps.preprocessor {
                let p = entry.step.as_preprocessor().ok_or_else(|| missing("preprocessor"))?;
                data = p.preprocess(data).map_err(fail)?;
            }
            if caps.embedder {
                let e = entry.step.as_embedder().ok_or_else(|| missing("embedder"))?;
                if !e.is_trained() {
                    e.train(data.as_ref()).map_err(fail)?;
                }
                data = e.embed(data).map_err(fail)?;
            }
            if caps.analyser {
                let a = entry.step.as_analyser().ok_or_else(|| missing("analyser"))?;
                let out = a.analyse(data.as_ref(), &named, runtime.dataset_factory()).map_err(fail)?;
                publish(&step_id, out, &declared, &mut named, &mut produced)?;
            }
            if caps.predictor {
                let p = entry.step.as_predictor().ok_or_else(|| missing("predictor"))?;
                if !p.is_trained() {
                    p.train(data.as_ref()).map_err(fail)?;
                }
                data = p.predict(data).map_err(fail)?;
            }
            if caps.evaluator {
                let e = entry.step.as_evaluator().ok_or_else(|| missing("evaluator"))?;
                let out = e.evaluate(data.as_ref(), runtime.dataset_factory()).map_err(fail)?;
                publish(&step_id, out, &declared, &mut named, &mut produced)?;
            }
            if caps.visualizer {
                let v = entry.step.as_visualizer().ok_or_else(|| missing("visualizer"))?;
                let out = v.visualize(data.as_ref(),
                                      &named,
                                      runtime.palette(),
                                      runtime.colormap(),
                                      runtime.figure_factory())
                           .map_err(fail)?;
                publish(&step_id, out, &declared, &mut named, &mut produced)?;
            }

            debug!("workflow step done workflow_id={} step_id={} results={} fields={}",
                   self.id,
                   step_id,
                   produced.len(),
                   data.fields().len());
            by_step.insert(step_id.clone(), produced);
            progress(&step_id, entry.step.name());
        }

        if !self.config.post_drop_columns.is_empty() {
            data.drop_fields(&self.config.post_drop_columns);
            debug!("workflow drop workflow_id={} fields={:?}", self.id, self.config.post_drop_columns);
        }

        info!("workflow finish workflow_id={} results={}", self.id, named.len());
        Ok((data, by_step))
    }

    /// Esquema serializable (ids incluidos).
    pub fn to_schema(&self) -> Result<WorkflowSchema, CoreEngineError> {
        let steps = self.steps
                        .iter()
                        .map(|e| -> Result<StepSchema, CoreEngineError> {
                            Ok(StepSchema { id: Some(e.step.id().to_string()),
                                            module: e.step.module().to_string(),
                                            classname: e.step.classname().to_string(),
                                            config: e.step.config()? })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
        Ok(WorkflowSchema { id: Some(self.id.clone()),
                            config: self.config.clone(),
                            steps })
    }

    /// Reconstruye el workflow re-ejecutando `add` por cada step. La primera
    /// falla se envuelve en `InvalidSchema`.
    pub fn from_schema(schema: &WorkflowSchema,
                       registry: &StepRegistry,
                       ids: &dyn IdGenerator)
                       -> Result<Self, CoreEngineError> {
        let id = schema.id.clone().unwrap_or_else(|| ids.next_id());
        let mut wf = Self::with_id(id, schema.config.clone());
        for step_schema in &schema.steps {
            let step = registry.build(step_schema, ids).map_err(CoreEngineError::into_invalid_schema)?;
            wf.add_boxed(step).map_err(CoreEngineError::into_invalid_schema)?;
        }
        Ok(wf)
    }

    /// Hash estable de la definición (sin ids).
    pub fn definition_hash(&self) -> Result<String, CoreEngineError> {
        let schema = self.to_schema()?.without_ids();
        Ok(hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "workflow": serde_json::to_value(schema)?,
        })))
    }
}

/// Registra los resultados de un step: id del dueño, verificación de tipo
/// contra lo declarado y publicación en el registro por nombre.
fn publish(step_id: &str,
           out: Vec<StepResult>,
           declared: &ResultMap,
           named: &mut NamedResults,
           produced: &mut Vec<StepResult>)
           -> Result<(), CoreEngineError> {
    for mut result in out {
        result.step_id = step_id.to_string();
        result.result_type = result.value.result_type();
        match declared.get(&result.name) {
            Some(ty) if *ty != result.result_type => {
                return Err(CoreEngineError::ResultTypeMismatch { result: result.name.clone(),
                                                                 expected: ty.to_string(),
                                                                 found: result.result_type.to_string() });
            }
            Some(_) => {}
            None => warn!("undeclared result step_id={} name={}", step_id, result.name),
        }
        named.insert(result.name.clone(), result.clone());
        produced.push(result);
    }
    Ok(())
}
