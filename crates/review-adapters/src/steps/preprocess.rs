//! TextPreprocessor (Preprocessor)
//!
//! Normaliza un campo de texto: ascii, minúsculas, puntuación, stopwords y
//! tokens cortos. Crea `output_field` sólo si difiere de `input_field`.

use review_core::ids::{IdGenerator, UuidIdGenerator};
use review_core::{impl_step, CellValue, Config, DType, Dataset, FieldContract, FieldMap, FieldSchema, Preprocessor,
                  StepError};
use serde::{Deserialize, Serialize};

use crate::text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPreprocessorConfig {
    pub input_field: String,
    pub output_field: String,
    pub do_lowercase: bool,
    pub do_remove_nonascii: bool,
    pub do_remove_punctuation: bool,
    pub do_remove_stopwords: bool,
    pub do_remove_short: bool,
    pub min_token_len: i64,
}

impl Default for TextPreprocessorConfig {
    fn default() -> Self {
        Self { input_field: "text".into(),
               output_field: "text".into(),
               do_lowercase: true,
               do_remove_nonascii: true,
               do_remove_punctuation: true,
               do_remove_stopwords: true,
               do_remove_short: true,
               min_token_len: 3 }
    }
}

impl Config for TextPreprocessorConfig {}

#[derive(Debug, Clone)]
pub struct TextPreprocessor {
    id: String,
    config: TextPreprocessorConfig,
}

impl TextPreprocessor {
    pub fn new(config: TextPreprocessorConfig) -> Self {
        Self::with_generator(config, &UuidIdGenerator)
    }

    pub fn with_generator(config: TextPreprocessorConfig, ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id(), config)
    }

    pub fn with_id(id: String, config: TextPreprocessorConfig) -> Self {
        Self { id, config }
    }

    /// Aplica la normalización configurada a un texto.
    pub fn normalize(&self, raw: &str) -> String {
        let cfg = &self.config;
        let mut s = raw.to_string();
        if cfg.do_remove_nonascii {
            s = text::remove_nonascii(&s);
        }
        if cfg.do_lowercase {
            s = s.to_lowercase();
        }
        if cfg.do_remove_punctuation {
            s = text::remove_punctuation(&s);
        }
        if cfg.do_remove_stopwords {
            s = text::remove_stopwords(&s);
        }
        if cfg.do_remove_short {
            s = text::remove_short(&s, cfg.min_token_len.max(0) as usize);
        }
        text::squash(&s)
    }
}

impl FieldContract for TextPreprocessor {
    fn required_fields(&self) -> FieldMap {
        FieldMap::from([(self.config.input_field.clone(),
                         FieldSchema::new(DType::Str).describe("To be preprocessed text"))])
    }

    fn created_fields(&self) -> FieldMap {
        if self.config.input_field == self.config.output_field {
            return FieldMap::new();
        }
        FieldMap::from([(self.config.output_field.clone(), FieldSchema::new(DType::Str).describe("Preprocessed text"))])
    }
}

impl Preprocessor for TextPreprocessor {
    fn preprocess(&self, mut dataset: Box<dyn Dataset>) -> Result<Box<dyn Dataset>, StepError> {
        let values = dataset.field_values(&self.config.input_field)
                            .into_iter()
                            .map(|v| match v {
                                CellValue::Null => CellValue::Null,
                                CellValue::Str(s) => CellValue::Str(self.normalize(&s)),
                                other => CellValue::Str(self.normalize(&other.to_string())),
                            })
                            .collect();
        dataset.set_field_values(&self.config.output_field, values)?;
        Ok(dataset)
    }
}

impl_step!(TextPreprocessor {
    name: "Text preprocessor",
    module: crate::STEPS_MODULE,
    config: TextPreprocessorConfig,
    roles: [preprocessor],
});
