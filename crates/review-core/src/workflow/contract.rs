//! Plegado de contratos de campos y resultados.
//!
//! El mismo algoritmo se usa a nivel de workflow (sobre steps) y de análisis
//! (sobre workflows). Los contratos se recalculan en cada llamada.

use crate::constants::UNMAPPED_FIELD;
use crate::errors::CoreEngineError;
use crate::model::{compatible, AnalysisFields, FieldMap, FieldSchema, ResultMap, ResultType};

/// Acumulador del contrato de campos.
#[derive(Debug, Default)]
pub struct FieldFold {
    required: FieldMap,
    created: FieldMap,
    skip_unmapped: bool,
}

impl FieldFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variante de análisis: los requeridos con nombre vacío no necesitan
    /// mapeo y se omiten.
    pub fn skipping_unmapped() -> Self {
        Self { skip_unmapped: true,
               ..Self::default() }
    }

    /// Declara un campo requerido.
    ///
    /// Un requerido cubierto por un campo ya creado (mismo nombre, o por
    /// prefijo si el requerido es un prefijo) se satisface internamente y no
    /// pasa a `required`; igual debe ser compatible con el creado.
    pub fn require(&mut self, name: &str, schema: &FieldSchema) -> Result<(), CoreEngineError> {
        if self.skip_unmapped && name == UNMAPPED_FIELD {
            return Ok(());
        }
        if let Some((_, creator)) = self.created.iter().find(|(c, _)| covers(name, schema, c)) {
            if !compatible(&creator.dtype, &schema.dtype) {
                return Err(conflict(name, creator, schema));
            }
            return Ok(());
        }
        if let Some(existing) = self.required.get(name) {
            if !compatible(&existing.dtype, &schema.dtype) {
                return Err(conflict(name, existing, schema));
            }
        }
        self.required.insert(name.to_string(), schema.clone());
        Ok(())
    }

    /// Declara un campo creado. Crear dos veces, o crear un campo ya
    /// requerido, es un error.
    pub fn create(&mut self, name: &str, schema: &FieldSchema) -> Result<(), CoreEngineError> {
        if self.created.contains_key(name) {
            return Err(CoreEngineError::DuplicateFieldCreation { field: name.to_string(),
                                                                 reason: "already created".into() });
        }
        if self.required.contains_key(name) {
            return Err(CoreEngineError::DuplicateFieldCreation { field: name.to_string(),
                                                                 reason: "already required".into() });
        }
        if let Some((_, req)) = self.required.iter().find(|(r, s)| covers(r, s, name)) {
            if !compatible(&req.dtype, &schema.dtype) {
                return Err(conflict(name, req, schema));
            }
        }
        self.created.insert(name.to_string(), schema.clone());
        Ok(())
    }

    /// Cierra el plegado: los requeridos cubiertos por algún creado salen de
    /// `required`; `available` = `required` ∪ `created` menos `dropped`.
    pub fn finish<S: AsRef<str>>(mut self, dropped: &[S]) -> AnalysisFields {
        let created = &self.created;
        self.required.retain(|name, schema| !created.keys().any(|c| covers(name, schema, c)));
        let available = self.required
                            .iter()
                            .chain(self.created.iter())
                            .filter(|(name, _)| !dropped.iter().any(|d| d.as_ref() == name.as_str()))
                            .map(|(n, s)| (n.clone(), s.clone()))
                            .collect();
        AnalysisFields { required: self.required,
                         created: self.created,
                         available }
    }
}

fn covers(required: &str, schema: &FieldSchema, created: &str) -> bool {
    created == required || (schema.prefix && created.starts_with(required))
}

fn conflict(name: &str, existing: &FieldSchema, requested: &FieldSchema) -> CoreEngineError {
    CoreEngineError::FieldConflict { field: name.to_string(),
                                     existing: existing.dtype.to_string(),
                                     requested: requested.dtype.to_string() }
}

/// Acumulador del contrato de resultados.
#[derive(Debug, Default)]
pub struct ResultFold {
    results: ResultMap,
}

impl ResultFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Un resultado requerido debe haber sido creado antes con el mismo tipo.
    pub fn require(&self, step_id: &str, name: &str, ty: ResultType) -> Result<(), CoreEngineError> {
        match self.results.get(name) {
            None => Err(CoreEngineError::ResultMissing { result: name.to_string(),
                                                         step_id: step_id.to_string() }),
            Some(found) if *found != ty => Err(CoreEngineError::ResultTypeMismatch { result: name.to_string(),
                                                                                     expected: ty.to_string(),
                                                                                     found: found.to_string() }),
            Some(_) => Ok(()),
        }
    }

    pub fn create(&mut self, name: &str, ty: ResultType) -> Result<(), CoreEngineError> {
        if self.results.contains_key(name) {
            return Err(CoreEngineError::DuplicateResultCreation { result: name.to_string() });
        }
        self.results.insert(name.to_string(), ty);
        Ok(())
    }

    pub fn finish(self) -> ResultMap {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DType;

    fn int() -> FieldSchema {
        FieldSchema::new(DType::Int)
    }

    fn float() -> FieldSchema {
        FieldSchema::new(DType::Float)
    }

    #[test]
    fn earlier_creation_satisfies_requirement() {
        let mut f = FieldFold::new();
        f.require("x", &int()).unwrap();
        f.create("y", &float()).unwrap();
        f.require("y", &float()).unwrap();
        let fields = f.finish::<&str>(&[]);
        assert_eq!(fields.required.keys().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(fields.created.keys().collect::<Vec<_>>(), vec!["y"]);
        assert_eq!(fields.available.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn prefix_requirement_is_covered_by_prefixed_creation() {
        let mut f = FieldFold::new();
        f.create("emb_0", &int()).unwrap();
        f.require("emb_", &int().prefixed()).unwrap();
        assert!(f.finish::<&str>(&[]).required.is_empty());
    }

    #[test]
    fn prefix_requirement_is_covered_by_later_creation() {
        let mut f = FieldFold::new();
        f.require("emb_", &int().prefixed()).unwrap();
        f.create("emb_0", &int()).unwrap();
        let fields = f.finish::<&str>(&[]);
        assert!(fields.required.is_empty());
        assert_eq!(fields.available.keys().collect::<Vec<_>>(), vec!["emb_0"]);
    }

    #[test]
    fn later_creation_incompatible_with_prefix_requirement_conflicts() {
        let mut f = FieldFold::new();
        f.require("emb_", &int().prefixed()).unwrap();
        let err = f.create("emb_0", &FieldSchema::new(DType::Str)).unwrap_err();
        assert!(matches!(err, CoreEngineError::FieldConflict { ref field, .. } if field == "emb_0"));
    }

    #[test]
    fn exact_requirement_is_not_covered_by_longer_name() {
        let mut f = FieldFold::new();
        f.create("emb_0", &int()).unwrap();
        f.require("emb_", &int()).unwrap();
        assert!(f.finish::<&str>(&[]).required.contains_key("emb_"));
    }

    #[test]
    fn requirement_against_incompatible_creation_conflicts() {
        let mut f = FieldFold::new();
        f.create("y", &float()).unwrap();
        let err = f.require("y", &FieldSchema::new(DType::Str)).unwrap_err();
        assert!(matches!(err, CoreEngineError::FieldConflict { ref field, .. } if field == "y"));
    }

    #[test]
    fn duplicate_creation_reasons() {
        let mut f = FieldFold::new();
        f.require("x", &int()).unwrap();
        f.create("y", &int()).unwrap();
        assert!(matches!(f.create("y", &int()),
                         Err(CoreEngineError::DuplicateFieldCreation { ref reason, .. }) if reason == "already created"));
        assert!(matches!(f.create("x", &int()),
                         Err(CoreEngineError::DuplicateFieldCreation { ref reason, .. }) if reason == "already required"));
    }

    #[test]
    fn rerequired_field_keeps_latest_compatible_schema() {
        let mut f = FieldFold::new();
        f.require("r", &FieldSchema::any()).unwrap();
        f.require("r", &int()).unwrap();
        assert_eq!(f.finish::<&str>(&[]).required["r"], int());
    }

    #[test]
    fn unmapped_sentinel_only_skipped_at_analysis_level() {
        let mut wf = FieldFold::new();
        wf.require(UNMAPPED_FIELD, &int()).unwrap();
        assert!(wf.finish::<&str>(&[]).required.contains_key(UNMAPPED_FIELD));

        let mut an = FieldFold::skipping_unmapped();
        an.require(UNMAPPED_FIELD, &int()).unwrap();
        assert!(an.finish::<&str>(&[]).required.is_empty());
    }

    #[test]
    fn result_fold_checks_order_and_type() {
        let mut r = ResultFold::new();
        assert!(matches!(r.require("s1", "ngrams", ResultType::Dataset), Err(CoreEngineError::ResultMissing { .. })));
        r.create("ngrams", ResultType::Dataset).unwrap();
        r.require("s2", "ngrams", ResultType::Dataset).unwrap();
        assert!(matches!(r.require("s2", "ngrams", ResultType::Figure),
                         Err(CoreEngineError::ResultTypeMismatch { .. })));
        assert!(matches!(r.create("ngrams", ResultType::Dataset),
                         Err(CoreEngineError::DuplicateResultCreation { .. })));
    }
}
