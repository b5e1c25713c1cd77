//! Runtime por defecto: datasets `Table` y figuras `ChartFigure`.
use review_core::{CoreEngineError, Dataset, FieldColumns, Figure, Runtime};
use serde_json::Value;

use crate::{ChartFigure, Table};

fn new_table(fields: FieldColumns) -> Result<Box<dyn Dataset>, CoreEngineError> {
    Ok(Box::new(Table::from_columns(fields)?))
}

fn new_chart(raw: Value) -> Result<Box<dyn Figure>, CoreEngineError> {
    Ok(Box::new(ChartFigure::from_raw(raw)?))
}

/// Runtime con los colores por defecto.
pub fn default_runtime() -> Runtime {
    Runtime::new(new_table, new_chart)
}

/// Runtime con colores y paso de paleta propios.
pub fn runtime_with_colors<S: AsRef<str>>(colors: &[S], palette_step: f64) -> Result<Runtime, CoreEngineError> {
    Ok(default_runtime().with_colors(colors)?.with_palette_step(palette_step))
}
