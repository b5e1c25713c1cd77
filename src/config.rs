//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
use std::env;

use log::warn;
use once_cell::sync::Lazy;
use review_core::constants::{DEFAULT_COLORS, DEFAULT_PALETTE_STEP};
use review_core::{IdGenerator, Runtime, TimestampIdGenerator, UuidIdGenerator};

use crate::errors::CoreError;

/// Estrategia de generación de ids para steps, workflows y análisis nuevos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMode {
    #[default]
    Uuid,
    Timestamp,
}

impl IdMode {
    pub fn generator(&self) -> Box<dyn IdGenerator> {
        match self {
            IdMode::Uuid => Box::new(UuidIdGenerator),
            IdMode::Timestamp => Box::new(TimestampIdGenerator::default()),
        }
    }
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Filtro de logging (sintaxis `EnvFilter`).
    pub log_filter: String,
    /// Colores `#RRGGBB` del colormap del runtime.
    pub palette: Vec<String>,
    pub palette_step: f64,
    pub id_mode: IdMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_filter: "info".into(),
               palette: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
               palette_step: DEFAULT_PALETTE_STEP,
               id_mode: IdMode::Uuid }
    }
}

impl AppConfig {
    /// Lee la configuración de las variables de entorno del proceso.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();
        if let Some(filter) = lookup("REVIEWFLOW_LOG").filter(|v| !v.trim().is_empty()) {
            cfg.log_filter = filter;
        }
        if let Some(raw) = lookup("REVIEWFLOW_PALETTE") {
            let colors: Vec<String> = raw.split(',')
                                         .map(str::trim)
                                         .filter(|c| !c.is_empty())
                                         .map(str::to_string)
                                         .collect();
            if colors.is_empty() {
                return Err(CoreError::Config("REVIEWFLOW_PALETTE no contiene colores".into()));
            }
            cfg.palette = colors;
        }
        if let Some(raw) = lookup("REVIEWFLOW_PALETTE_STEP") {
            let step = raw.trim()
                          .parse::<f64>()
                          .map_err(|_| CoreError::Config(format!("REVIEWFLOW_PALETTE_STEP inválido: '{raw}'")))?;
            if !(step > 0.0 && step <= 1.0) {
                return Err(CoreError::Config(format!("REVIEWFLOW_PALETTE_STEP fuera de (0, 1]: {step}")));
            }
            cfg.palette_step = step;
        }
        if let Some(raw) = lookup("REVIEWFLOW_ID_MODE") {
            cfg.id_mode = match raw.trim().to_ascii_lowercase().as_str() {
                "uuid" | "" => IdMode::Uuid,
                "timestamp" => IdMode::Timestamp,
                other => return Err(CoreError::Config(format!("REVIEWFLOW_ID_MODE desconocido: '{other}'"))),
            };
        }
        Ok(cfg)
    }

    /// Runtime por defecto con la paleta configurada.
    pub fn runtime(&self) -> Result<Runtime, CoreError> {
        Ok(review_domain::runtime_with_colors(&self.palette, self.palette_step)?)
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
/// Una configuración inválida se reporta y se reemplaza por los valores por
/// defecto.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
    AppConfig::from_env().unwrap_or_else(|e| {
                             warn!("config fallback reason={}", e);
                             AppConfig::default()
                         })
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.palette.len(), 5);
    }

    #[test]
    fn reads_every_variable() {
        let cfg = AppConfig::from_lookup(lookup(&[("REVIEWFLOW_LOG", "debug"),
                                                  ("REVIEWFLOW_PALETTE", "#000000, #FFFFFF"),
                                                  ("REVIEWFLOW_PALETTE_STEP", "0.5"),
                                                  ("REVIEWFLOW_ID_MODE", "Timestamp")])).unwrap();
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.palette, vec!["#000000", "#FFFFFF"]);
        assert_eq!(cfg.palette_step, 0.5);
        assert_eq!(cfg.id_mode, IdMode::Timestamp);
        let first: Vec<String> = cfg.runtime().unwrap().palette().take(2).collect();
        assert_eq!(first, vec!["#000000", "#FFFFFF"]);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("REVIEWFLOW_PALETTE_STEP", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("REVIEWFLOW_PALETTE_STEP", "abc")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("REVIEWFLOW_ID_MODE", "random")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("REVIEWFLOW_PALETTE", " , ")])).is_err());

        let bad_color = AppConfig::from_lookup(lookup(&[("REVIEWFLOW_PALETTE", "blue")])).unwrap();
        assert!(matches!(bad_color.runtime(), Err(CoreError::Engine(_))));
    }
}
