use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::{json, Map, Value};

use super::AnalysisConfig;
use crate::constants::ENGINE_VERSION;
use crate::data::Dataset;
use crate::errors::CoreEngineError;
use crate::hashing::hash_value;
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::model::{AnalysisFields, AnalysisId, AnalysisResults, FieldMappings, ResultMap, WorkflowId};
use crate::registry::StepRegistry;
use crate::runtime::Runtime;
use crate::schema::AnalysisSchema;
use crate::step::Config;
use crate::workflow::{FieldFold, ProgressFn, Workflow};

/// Cadena de workflows que comparten el dataset entre fronteras de
/// workflow. Los resultados se agrupan por id de workflow.
#[derive(Debug)]
pub struct Analysis {
    id: AnalysisId,
    config: AnalysisConfig,
    workflows: Vec<Workflow>,
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: AnalysisConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: impl Into<String>, config: AnalysisConfig) -> Self {
        Self { id: id.into(),
               config,
               workflows: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn update_config(&mut self, values: &Map<String, Value>) -> Result<(), CoreEngineError> {
        self.config.update(values)
    }

    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    pub fn workflow(&self, id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id() == id)
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    /// Agrega un workflow y revalida (encadenable).
    pub fn add(mut self, workflow: Workflow) -> Result<Self, CoreEngineError> {
        self.add_workflow(workflow)?;
        Ok(self)
    }

    /// Agrega un workflow; si el contrato resultante es inválido, o su id ya
    /// está en uso, se descarta.
    pub fn add_workflow(&mut self, workflow: Workflow) -> Result<(), CoreEngineError> {
        if self.workflow(workflow.id()).is_some() {
            warn!("analysis add rejected analysis_id={} duplicate workflow_id={}", self.id, workflow.id());
            return Err(CoreEngineError::DuplicateId { kind: "workflow".into(),
                                                      id: workflow.id().to_string() });
        }
        self.workflows.push(workflow);
        if let Err(e) = self.get_fields().and_then(|_| self.get_results().map(|_| ())) {
            self.workflows.pop();
            warn!("analysis add rejected analysis_id={} error={}", self.id, e);
            return Err(e);
        }
        Ok(())
    }

    /// Contrato de campos del análisis: el plegado del workflow aplicado
    /// sobre workflows, omitiendo el requerido centinela sin mapeo.
    pub fn get_fields(&self) -> Result<AnalysisFields, CoreEngineError> {
        let mut fold = FieldFold::skipping_unmapped();
        let mut dropped: Vec<String> = Vec::new();
        for wf in &self.workflows {
            let fields = wf.get_fields()?;
            for (name, schema) in &fields.required {
                fold.require(name, schema)?;
            }
            for (name, schema) in &fields.created {
                fold.create(name, schema)?;
            }
            dropped.extend(fields.required
                                 .keys()
                                 .chain(fields.created.keys())
                                 .filter(|k| !fields.available.contains_key(*k))
                                 .cloned());
        }
        Ok(fold.finish(&dropped))
    }

    /// Contrato de resultados por workflow (los resultados no cruzan
    /// fronteras de workflow).
    pub fn get_results(&self) -> Result<IndexMap<WorkflowId, ResultMap>, CoreEngineError> {
        self.workflows
            .iter()
            .map(|wf| -> Result<(WorkflowId, ResultMap), CoreEngineError> { Ok((wf.id().to_string(), wf.get_results()?)) })
            .collect()
    }

    /// Verifica y aplica el mapeo de campos requeridos sobre `dataset`.
    pub fn map_fields(&self, dataset: &mut dyn Dataset, mapping: &FieldMappings) -> Result<(), CoreEngineError> {
        let fields = self.get_fields()?;
        for (field, schema) in &fields.required {
            let mapped = mapping.get(field)
                                .ok_or_else(|| CoreEngineError::MappingMissing { field: field.clone() })?;
            let mismatch = |column: String| CoreEngineError::SchemaMismatch { field: field.clone(),
                                                                              column,
                                                                              expected: schema.dtype.to_string() };
            let columns: Vec<String> = if schema.prefix {
                dataset.fields().into_keys().filter(|c| c.starts_with(mapped.as_str())).collect()
            } else {
                vec![mapped.clone()]
            };
            if columns.is_empty() {
                return Err(mismatch(format!("{mapped}*")));
            }
            for column in &columns {
                if !dataset.verify_schema(column, &schema.dtype) {
                    return Err(mismatch(column.clone()));
                }
            }
            if !schema.prefix {
                dataset.map_field(mapped, field)?;
            }
            debug!("analysis mapping analysis_id={} field={} columns={:?}", self.id, field, columns);
        }
        Ok(())
    }

    /// Ejecuta el análisis sobre una copia del dataset.
    pub fn run(&mut self,
               runtime: &Runtime,
               dataset: &dyn Dataset,
               mapping: &FieldMappings)
               -> Result<(Box<dyn Dataset>, AnalysisResults), CoreEngineError> {
        self.run_with_progress(runtime, dataset, mapping, &mut |_, _| {})
    }

    pub fn run_with_progress(&mut self,
                             runtime: &Runtime,
                             dataset: &dyn Dataset,
                             mapping: &FieldMappings,
                             progress: ProgressFn<'_>)
                             -> Result<(Box<dyn Dataset>, AnalysisResults), CoreEngineError> {
        let hash = self.definition_hash()?;
        info!("analysis start analysis_id={} name={} workflows={} definition_hash={}",
              self.id,
              self.config.name,
              self.workflows.len(),
              hash);

        let mut data = dataset.copy();
        self.map_fields(data.as_mut(), mapping)?;

        let mut results = AnalysisResults::new();
        for wf in self.workflows.iter_mut() {
            let (next, wf_results) = wf.run_with_progress(runtime, data.as_ref(), &mut *progress)?;
            data = next;
            results.insert(wf.id().to_string(), wf_results);
        }

        info!("analysis finish analysis_id={} rows={} fields={}",
              self.id,
              data.row_count(),
              data.fields().len());
        Ok((data, results))
    }

    pub fn to_schema(&self) -> Result<AnalysisSchema, CoreEngineError> {
        Ok(AnalysisSchema { id: Some(self.id.clone()),
                            config: self.config.clone(),
                            workflows: self.workflows
                                           .iter()
                                           .map(Workflow::to_schema)
                                           .collect::<Result<Vec<_>, _>>()? })
    }

    /// Reconstruye el análisis; la primera falla se envuelve en
    /// `InvalidSchema`.
    pub fn from_schema(schema: &AnalysisSchema,
                       registry: &StepRegistry,
                       ids: &dyn IdGenerator)
                       -> Result<Self, CoreEngineError> {
        let id = schema.id.clone().unwrap_or_else(|| ids.next_id());
        let mut analysis = Self::with_id(id, schema.config.clone());
        for wf_schema in &schema.workflows {
            let wf = Workflow::from_schema(wf_schema, registry, ids)?;
            analysis.add_workflow(wf).map_err(CoreEngineError::into_invalid_schema)?;
        }
        Ok(analysis)
    }

    pub fn from_json(raw: &str, registry: &StepRegistry, ids: &dyn IdGenerator) -> Result<Self, CoreEngineError> {
        let schema = AnalysisSchema::from_json(raw).map_err(CoreEngineError::into_invalid_schema)?;
        Self::from_schema(&schema, registry, ids)
    }

    pub fn definition_hash(&self) -> Result<String, CoreEngineError> {
        let schema = self.to_schema()?.without_ids();
        Ok(hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "analysis": serde_json::to_value(schema)?,
        })))
    }
}
