//! Configuración de steps, workflows y análisis.
//!
//! Cada tipo de configuración es un struct plano con serde derivado. La
//! actualización desde un mapa castea cada valor según el tipo JSON del
//! valor actual del campo (ver `cast_like`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::errors::CoreEngineError;

pub trait Config: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Configuración como mapa JSON (orden de declaración).
    fn to_dict(&self) -> Result<Map<String, Value>, CoreEngineError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(CoreEngineError::Internal(format!("config serialized as non-object: {other}"))),
        }
    }

    /// Actualiza campo a campo. Las claves desconocidas se ignoran; un valor
    /// que no puede castearse deja la configuración intacta.
    fn update(&mut self, values: &Map<String, Value>) -> Result<(), CoreEngineError> {
        let mut current = self.to_dict()?;
        for (key, new) in values {
            let Some(old) = current.get(key) else {
                log::debug!("config update ignored key={key}");
                continue;
            };
            let cast = cast_like(key, old, new)?;
            let previous = current.insert(key.clone(), cast);
            // Validación inmediata para reportar la clave culpable.
            if let Err(e) = serde_json::from_value::<Self>(Value::Object(current.clone())) {
                if let Some(prev) = previous {
                    current.insert(key.clone(), prev);
                }
                return Err(CoreEngineError::InvalidConfig { key: key.clone(),
                                                            reason: e.to_string() });
            }
        }
        *self = serde_json::from_value(Value::Object(current)).map_err(|e| CoreEngineError::InvalidConfig { key: "*".into(),
                                                                                                          reason: e.to_string() })?;
        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> CoreEngineError {
    CoreEngineError::InvalidConfig { key: key.to_string(),
                                     reason: reason.into() }
}

/// Castea `new` al tipo JSON de `current`.
pub fn cast_like(key: &str, current: &Value, new: &Value) -> Result<Value, CoreEngineError> {
    match current {
        Value::Null => Ok(new.clone()),
        Value::String(_) => match new {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(invalid(key, "expected a scalar for a string field")),
        },
        Value::Bool(_) => cast_bool(key, new).map(Value::Bool),
        Value::Number(n) if n.is_f64() => cast_float(key, new),
        Value::Number(_) => cast_int(key, new),
        Value::Array(items) => {
            let template = items.first();
            let raw: Vec<Value> = match new {
                Value::Array(a) => a.clone(),
                Value::String(s) if s.trim().is_empty() => Vec::new(),
                Value::String(s) => s.split(',').map(|p| Value::String(p.trim().to_string())).collect(),
                _ => return Err(invalid(key, "expected a list or a comma-separated string")),
            };
            match template {
                Some(t) => raw.iter().map(|v| cast_like(key, t, v)).collect::<Result<Vec<_>, _>>().map(Value::Array),
                None => Ok(Value::Array(raw)),
            }
        }
        Value::Object(_) => match new {
            Value::Object(_) => Ok(new.clone()),
            _ => Err(invalid(key, "expected an object")),
        },
    }
}

fn cast_bool(key: &str, new: &Value) -> Result<bool, CoreEngineError> {
    match new {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(invalid(key, format!("'{other}' is not a boolean"))),
        },
        _ => Err(invalid(key, "expected a boolean")),
    }
}

fn cast_int(key: &str, new: &Value) -> Result<Value, CoreEngineError> {
    match new {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            if let Some(u) = n.as_u64() {
                return Ok(Value::from(u));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Value::from(f.trunc() as i64)),
                _ => Err(invalid(key, format!("{n} is not an integer"))),
            }
        }
        Value::String(s) => {
            s.trim().parse::<i64>().map(Value::from).map_err(|_| invalid(key, format!("'{s}' is not an integer")))
        }
        _ => Err(invalid(key, "expected an integer")),
    }
}

fn cast_float(key: &str, new: &Value) -> Result<Value, CoreEngineError> {
    let f = match new {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.and_then(Number::from_f64)
     .map(Value::Number)
     .ok_or_else(|| invalid(key, format!("{new} is not a finite float")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        k: i64,
        ratio: f64,
        lower: bool,
        fields: Vec<String>,
        sizes: Vec<i64>,
        threshold: Option<f64>,
    }

    impl Config for Sample {}

    fn sample() -> Sample {
        Sample { name: "s".into(),
                 k: 3,
                 ratio: 0.5,
                 lower: true,
                 fields: vec![],
                 sizes: vec![1],
                 threshold: None }
    }

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn casts_strings_by_current_type() {
        let mut c = sample();
        c.update(&map(json!({"k": "12", "ratio": "0.25", "lower": "FALSE", "name": 7}))).unwrap();
        assert_eq!(c.k, 12);
        assert_eq!(c.ratio, 0.25);
        assert!(!c.lower);
        assert_eq!(c.name, "7");
    }

    #[test]
    fn integer_fields_truncate_floats() {
        let mut c = sample();
        c.update(&map(json!({"k": -2.9}))).unwrap();
        assert_eq!(c.k, -2);
    }

    #[test]
    fn lists_from_comma_separated_strings() {
        let mut c = sample();
        c.update(&map(json!({"fields": "a, b ,c", "sizes": "4,5"}))).unwrap();
        assert_eq!(c.fields, vec!["a", "b", "c"]);
        assert_eq!(c.sizes, vec![4, 5]);
    }

    #[test]
    fn null_fields_take_value_and_unknown_keys_are_ignored() {
        let mut c = sample();
        c.update(&map(json!({"threshold": 0.7, "nope": 1}))).unwrap();
        assert_eq!(c.threshold, Some(0.7));
        assert_eq!(c.to_dict().unwrap().len(), 7);
    }

    #[test]
    fn failed_cast_reports_key_and_keeps_config() {
        let mut c = sample();
        let err = c.update(&map(json!({"k": "many"}))).unwrap_err();
        assert!(matches!(err, CoreEngineError::InvalidConfig { ref key, .. } if key == "k"));
        assert_eq!(c, sample());

        let err = c.update(&map(json!({"threshold": "high"}))).unwrap_err();
        assert!(matches!(err, CoreEngineError::InvalidConfig { ref key, .. } if key == "threshold"));
        assert_eq!(c, sample());
    }
}
