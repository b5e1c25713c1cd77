//! Runtime: colaborador de fábrica inyectado en la ejecución.
//!
//! Construye datasets de resultado y figuras, y entrega la secuencia
//! determinista de colores usada por los visualizadores. No se valida.

pub mod color;

use serde_json::Value;

pub use color::{Colormap, Palette, Rgb};

use crate::constants::{DEFAULT_COLORS, DEFAULT_PALETTE_STEP};
use crate::data::{Dataset, FieldColumns};
use crate::errors::CoreEngineError;

/// Figura producida por un visualizador.
pub trait Figure: std::fmt::Debug + Send + Sync {
    /// Tipo de figura (p.ej. "bar").
    fn kind(&self) -> &str;
    /// Representación serializable.
    fn to_json(&self) -> Value;
}

/// Construye datasets nuevos a partir de columnas con nombre.
pub trait DatasetFactory: Send + Sync {
    fn new_dataset(&self, fields: FieldColumns) -> Result<Box<dyn Dataset>, CoreEngineError>;
}

impl<F> DatasetFactory for F where F: Fn(FieldColumns) -> Result<Box<dyn Dataset>, CoreEngineError> + Send + Sync
{
    fn new_dataset(&self, fields: FieldColumns) -> Result<Box<dyn Dataset>, CoreEngineError> {
        self(fields)
    }
}

/// Construye figuras a partir de su descripción cruda.
pub trait FigureFactory: Send + Sync {
    fn new_figure(&self, raw: Value) -> Result<Box<dyn Figure>, CoreEngineError>;
}

impl<F> FigureFactory for F where F: Fn(Value) -> Result<Box<dyn Figure>, CoreEngineError> + Send + Sync
{
    fn new_figure(&self, raw: Value) -> Result<Box<dyn Figure>, CoreEngineError> {
        self(raw)
    }
}

/// Fábricas y colores disponibles para los steps durante `run`.
pub struct Runtime {
    datasets: Box<dyn DatasetFactory>,
    figures: Box<dyn FigureFactory>,
    colormap: Colormap,
    palette_step: f64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
         .field("colormap", &self.colormap)
         .field("palette_step", &self.palette_step)
         .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Runtime con los colores por defecto.
    pub fn new(datasets: impl DatasetFactory + 'static, figures: impl FigureFactory + 'static) -> Self {
        Self { datasets: Box::new(datasets),
               figures: Box::new(figures),
               colormap: Colormap::default(),
               palette_step: DEFAULT_PALETTE_STEP }
    }

    /// Reemplaza los colores base del colormap (`#RRGGBB`).
    pub fn with_colors<S: AsRef<str>>(mut self, colors: &[S]) -> Result<Self, CoreEngineError> {
        self.colormap = Colormap::from_hex(colors)?;
        Ok(self)
    }

    /// Paso de la paleta; valores fuera de `(0, 1]` se ignoran.
    pub fn with_palette_step(mut self, step: f64) -> Self {
        if step > 0.0 && step <= 1.0 {
            self.palette_step = step;
        }
        self
    }

    pub fn new_dataset(&self, fields: FieldColumns) -> Result<Box<dyn Dataset>, CoreEngineError> {
        self.datasets.new_dataset(fields)
    }

    pub fn new_figure(&self, raw: Value) -> Result<Box<dyn Figure>, CoreEngineError> {
        self.figures.new_figure(raw)
    }

    pub fn dataset_factory(&self) -> &dyn DatasetFactory {
        self.datasets.as_ref()
    }

    pub fn figure_factory(&self) -> &dyn FigureFactory {
        self.figures.as_ref()
    }

    /// Secuencia infinita de colores; cada llamada reinicia la secuencia.
    pub fn palette(&self) -> Palette {
        Palette::new(self.colormap.clone(), self.palette_step)
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::from_hex(&DEFAULT_COLORS).unwrap_or_else(|_| Colormap::single(Rgb::new(0, 0, 0)))
    }
}
