//! Constantes del motor.
//!
//! `ENGINE_VERSION` participa en el `definition_hash` de workflows y análisis:
//! un cambio incompatible del motor debe incrementarla.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "R1.0";

/// Nombre de campo requerido que no necesita mapeo (centinela).
pub const UNMAPPED_FIELD: &str = "";

/// Colores base del colormap del runtime.
pub const DEFAULT_COLORS: [&str; 5] = ["#1D3557", "#457B9D", "#A8DADC", "#F1FAEE", "#E63946"];

/// Paso por defecto de la paleta.
pub const DEFAULT_PALETTE_STEP: f64 = 0.1;
