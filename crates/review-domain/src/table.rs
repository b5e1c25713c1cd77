use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;
use review_core::{CellValue, CoreEngineError, DType, Dataset, FieldColumns, TypeSet};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::filter::parse_filter;
use crate::DomainError;

#[derive(Debug, Clone, PartialEq)]
struct Column {
    dtype: DType,
    values: Vec<CellValue>,
}

/// Dataset tabular en memoria, columnar y tipado.
///
/// Las columnas conservan el orden de inserción. La partición
/// entrenamiento/prueba se guarda como una marca por fila y sobrevive a los
/// filtros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Column>,
    rows: usize,
    /// `true` = fila de entrenamiento.
    partition: Option<Vec<bool>>,
}

/// Infere el tipo de una columna: int+float se ensancha a float, otras
/// mezclas se rechazan. Una columna sin valores no nulos es `str`, pero
/// `verify_schema` la acepta con cualquier tipo declarado.
fn infer_dtype(field: &str, values: &[CellValue]) -> Result<DType, DomainError> {
    let kinds: BTreeSet<DType> = values.iter().filter_map(CellValue::dtype).collect();
    match kinds.len() {
        0 => Ok(DType::Str),
        1 => Ok(*kinds.iter().next().unwrap_or(&DType::Str)),
        2 if kinds.contains(&DType::Int) && kinds.contains(&DType::Float) => Ok(DType::Float),
        _ => {
            let names: Vec<&str> = kinds.iter().map(DType::as_str).collect();
            Err(DomainError::ValidationError(format!("column '{field}' mixes types: {}", names.join(", "))))
        }
    }
}

fn build_column(field: &str, mut values: Vec<CellValue>) -> Result<Column, DomainError> {
    let dtype = infer_dtype(field, &values)?;
    if dtype == DType::Float {
        for v in values.iter_mut() {
            if let CellValue::Int(i) = v {
                *v = CellValue::Float(*i as f64);
            }
        }
    }
    Ok(Column { dtype, values })
}

fn cell_from_json(field: &str, v: &Value) -> Result<CellValue, DomainError> {
    match v {
        Value::Null => Ok(CellValue::Null),
        Value::Bool(b) => Ok(CellValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(CellValue::Int(i)),
            None => n.as_f64()
                     .map(CellValue::Float)
                     .ok_or_else(|| DomainError::ValidationError(format!("column '{field}': number {n} out of range"))),
        },
        Value::String(s) => Ok(CellValue::Str(s.clone())),
        other => Err(DomainError::ValidationError(format!("column '{field}': nested value {other} not supported"))),
    }
}

fn cell_to_json(v: &CellValue) -> Value {
    match v {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::from(*i),
        CellValue::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        CellValue::Str(s) => Value::String(s.clone()),
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye desde columnas con nombre (todas de la misma longitud).
    pub fn from_columns(columns: FieldColumns) -> Result<Self, DomainError> {
        let mut table = Table::new();
        for (name, values) in columns {
            table.insert_column(&name, values)?;
        }
        Ok(table)
    }

    /// Construye desde JSON: `{"col": [..]}` o `[{"col": v}, ..]`.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(map) => {
                let mut cols = FieldColumns::new();
                for (name, v) in map {
                    let Value::Array(items) = v else {
                        return Err(DomainError::ValidationError(format!("column '{name}' is not a list")));
                    };
                    let cells = items.iter().map(|x| cell_from_json(name, x)).collect::<Result<Vec<_>, _>>()?;
                    cols.insert(name.clone(), cells);
                }
                Self::from_columns(cols)
            }
            Value::Array(records) => {
                let mut cols = FieldColumns::new();
                for record in records {
                    let Value::Object(obj) = record else {
                        return Err(DomainError::ValidationError("records must be objects".into()));
                    };
                    for name in obj.keys() {
                        cols.entry(name.clone()).or_default();
                    }
                }
                for record in records {
                    let obj = record.as_object();
                    for (name, cells) in cols.iter_mut() {
                        let v = obj.and_then(|o| o.get(name)).unwrap_or(&Value::Null);
                        cells.push(cell_from_json(name, v)?);
                    }
                }
                Self::from_columns(cols)
            }
            _ => Err(DomainError::ValidationError("dataset JSON must be an object of lists or a list of records".into())),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(&value)
    }

    fn insert_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), DomainError> {
        if self.columns.is_empty() && self.partition.is_none() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(DomainError::LengthMismatch { field: name.to_string(),
                                                     expected: self.rows,
                                                     found: values.len() });
        }
        let column = build_column(name, values)?;
        self.columns.insert(name.to_string(), column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(|c| c.values.as_slice())
    }

    pub fn dtype(&self, name: &str) -> Option<DType> {
        self.columns.get(name).map(|c| c.dtype)
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition.is_some()
    }

    /// Conserva las filas cuya marca es `true`.
    fn retain_rows(&mut self, keep: &[bool]) {
        for col in self.columns.values_mut() {
            let mut it = keep.iter();
            col.values.retain(|_| *it.next().unwrap_or(&false));
        }
        if let Some(part) = self.partition.as_mut() {
            let mut it = keep.iter();
            part.retain(|_| *it.next().unwrap_or(&false));
        }
        self.rows = keep.iter().filter(|k| **k).count();
    }

    fn subset(&self, want_train: bool) -> Table {
        let mut out = Table { columns: self.columns.clone(),
                              rows: self.rows,
                              partition: None };
        if let Some(part) = &self.partition {
            let keep: Vec<bool> = part.iter().map(|t| *t == want_train).collect();
            out.retain_rows(&keep);
        }
        out
    }

    fn row_json(&self, i: usize) -> String {
        let obj: Map<String, Value> = self.columns
                                          .iter()
                                          .map(|(k, c)| (k.clone(), cell_to_json(&c.values[i])))
                                          .collect();
        Value::Object(obj).to_string()
    }

    fn filter_rows(&mut self, rule: &str) -> Result<(), DomainError> {
        let expr = parse_filter(rule)?;
        for field in expr.fields() {
            if !self.columns.contains_key(field) {
                return Err(DomainError::UnknownField(field.to_string()));
            }
        }
        let keep: Vec<bool> = (0..self.rows).map(|i| {
                                                 expr.eval(&|name: &str| {
                                                         self.columns.get(name).and_then(|c| c.values.get(i))
                                                     })
                                             })
                                             .collect();
        self.retain_rows(&keep);
        Ok(())
    }

    fn partition_rows(&mut self, fraction: f64) -> Result<(), DomainError> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(DomainError::ValidationError(format!("train fraction {fraction} outside (0, 1]")));
        }
        if self.partition.is_some() {
            debug!("table partition already applied rows={}", self.rows);
            return Ok(());
        }
        let n_train = ((fraction * self.rows as f64).round() as usize).min(self.rows);
        let mut ranked: Vec<(String, usize)> = (0..self.rows).map(|i| {
                                                                  let digest = Sha256::digest(format!("{i}:{}", self.row_json(i)).as_bytes());
                                                                  (format!("{digest:x}"), i)
                                                              })
                                                              .collect();
        ranked.sort();
        let mut part = vec![false; self.rows];
        for (_, i) in ranked.into_iter().take(n_train) {
            part[i] = true;
        }
        debug!("table partition rows={} train={}", self.rows, n_train);
        self.partition = Some(part);
        Ok(())
    }
}

impl Dataset for Table {
    fn copy(&self) -> Box<dyn Dataset> {
        Box::new(self.clone())
    }

    fn apply_filter(&mut self, rule: &str) -> Result<(), CoreEngineError> {
        Ok(self.filter_rows(rule)?)
    }

    fn field_values(&self, name: &str) -> Vec<CellValue> {
        self.column(name).map(<[CellValue]>::to_vec).unwrap_or_default()
    }

    fn set_field_values(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), CoreEngineError> {
        Ok(self.insert_column(name, values)?)
    }

    fn drop_fields(&mut self, names: &[String]) {
        for name in names {
            self.columns.shift_remove(name);
        }
    }

    fn map_field(&mut self, src: &str, dst: &str) -> Result<(), CoreEngineError> {
        if self.columns.contains_key(dst) {
            return Ok(());
        }
        let column = self.columns
                         .get(src)
                         .cloned()
                         .ok_or_else(|| DomainError::UnknownField(src.to_string()))?;
        self.columns.insert(dst.to_string(), column);
        Ok(())
    }

    fn fields(&self) -> IndexMap<String, DType> {
        self.columns.iter().map(|(k, c)| (k.clone(), c.dtype)).collect()
    }

    fn verify_schema(&self, name: &str, dtype: &TypeSet) -> bool {
        match self.columns.get(name) {
            Some(c) if c.values.iter().all(|v| matches!(v, CellValue::Null)) => true,
            Some(c) => dtype.accepts(c.dtype),
            None => false,
        }
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn train_partition(&mut self, fraction: f64) -> Result<(), CoreEngineError> {
        Ok(self.partition_rows(fraction)?)
    }

    fn train_data(&self) -> Box<dyn Dataset> {
        Box::new(self.subset(true))
    }

    fn test_data(&self) -> Box<dyn Dataset> {
        Box::new(self.subset(false))
    }

    fn to_dict(&self) -> Value {
        Value::Object(self.columns
                          .iter()
                          .map(|(k, c)| (k.clone(), Value::Array(c.values.iter().map(cell_to_json).collect())))
                          .collect())
    }
}
