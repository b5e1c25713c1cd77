//! Contrato de campos: tipo esperado de un campo con nombre.
//!
//! `TypeSet` modela el tipo declarado por un step: un comodín (`Any`) o un
//! conjunto finito de tipos concretos. Existe una única regla de
//! compatibilidad (`compatible`): dos declaraciones son compatibles si alguna
//! es comodín o si sus conjuntos se intersectan.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tipo concreto de una columna.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int,
    Float,
    Bool,
    Str,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Int => "int",
            DType::Float => "float",
            DType::Bool => "bool",
            DType::Str => "str",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "int" => Ok(DType::Int),
            "float" => Ok(DType::Float),
            "bool" => Ok(DType::Bool),
            "str" => Ok(DType::Str),
            other => Err(format!("unknown dtype '{other}'")),
        }
    }
}

/// Tipo declarado: comodín o conjunto de tipos aceptables.
///
/// Se serializa como texto (`"any"`, `"int"`, `"int | float"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TypeSet {
    Any,
    Of(BTreeSet<DType>),
}

impl TypeSet {
    pub fn any() -> Self {
        TypeSet::Any
    }

    pub fn of<I: IntoIterator<Item = DType>>(types: I) -> Self {
        TypeSet::Of(types.into_iter().collect())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeSet::Any)
    }

    /// Indica si un tipo concreto es aceptado por la declaración.
    pub fn accepts(&self, dtype: DType) -> bool {
        match self {
            TypeSet::Any => true,
            TypeSet::Of(set) => set.contains(&dtype),
        }
    }

    pub fn compatible(&self, other: &TypeSet) -> bool {
        compatible(self, other)
    }
}

impl From<DType> for TypeSet {
    fn from(d: DType) -> Self {
        TypeSet::of([d])
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSet::Any => f.write_str("any"),
            TypeSet::Of(set) => {
                let names: Vec<&str> = set.iter().map(DType::as_str).collect();
                f.write_str(&names.join(" | "))
            }
        }
    }
}

impl From<TypeSet> for String {
    fn from(t: TypeSet) -> Self {
        t.to_string()
    }
}

impl TryFrom<String> for TypeSet {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for TypeSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "any" {
            return Ok(TypeSet::Any);
        }
        let types = s.split('|').map(str::parse).collect::<Result<BTreeSet<DType>, _>>()?;
        if types.is_empty() {
            return Err("empty type set".into());
        }
        Ok(TypeSet::Of(types))
    }
}

/// Regla única de compatibilidad entre dos declaraciones de tipo.
pub fn compatible(a: &TypeSet, b: &TypeSet) -> bool {
    match (a, b) {
        (TypeSet::Any, _) | (_, TypeSet::Any) => true,
        (TypeSet::Of(x), TypeSet::Of(y)) => !x.is_disjoint(y),
    }
}

/// Coincidencia de nombre: exacta, o por prefijo si la declaración es un
/// espacio de nombres.
pub fn matches(declared: &str, actual: &str, prefix: bool) -> bool {
    if prefix {
        actual.starts_with(declared)
    } else {
        declared == actual
    }
}

/// Declaración de un campo del dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub dtype: TypeSet,
    #[serde(default)]
    pub prefix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSchema {
    pub fn new(dtype: impl Into<TypeSet>) -> Self {
        Self { dtype: dtype.into(),
               prefix: false,
               description: None }
    }

    /// Declaración de tipo comodín.
    pub fn any() -> Self {
        Self::new(TypeSet::Any)
    }

    /// Marca la declaración como prefijo (espacio de nombres de columnas).
    pub fn prefixed(mut self) -> Self {
        self.prefix = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn compatible_with(&self, other: &FieldSchema) -> bool {
        compatible(&self.dtype, &other.dtype)
    }
}

/// Mapa ordenado nombre de campo -> declaración.
pub type FieldMap = IndexMap<String, FieldSchema>;

/// Contrato agregado de campos de un workflow o análisis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFields {
    /// Campos que deben existir en el dataset original.
    pub required: FieldMap,
    /// Campos creados internamente (aunque luego se eliminen).
    pub created: FieldMap,
    /// Campos disponibles al terminar la ejecución.
    pub available: FieldMap,
}

/// Mapeo de campo requerido -> columna del dataset del usuario.
pub type FieldMappings = IndexMap<String, String>;
