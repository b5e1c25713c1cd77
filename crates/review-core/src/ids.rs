//! Generación de identificadores de steps, workflows y análisis.
//!
//! Los ids se inyectan explícitamente (`with_id`) o se obtienen de un
//! generador. Los round trips de esquema preservan los ids tal cual.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use uuid::Uuid;

pub trait IdGenerator: Debug + Send + Sync {
    fn next_id(&self) -> String;
}

/// UUID v4 (por defecto).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `"{segundos_unix}_{contador}"`: forma histórica basada en el reloj.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator {
    counter: AtomicU64,
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", Utc::now().timestamp(), n)
    }
}

/// `"{prefijo}{n}"` determinista (tests).
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(),
               counter: AtomicU64::new(1) }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}
