//! Combined-report accumulator.
//!
//! In all-in-one mode every item's records land in one insertion-ordered
//! JSON object, emitted as exactly one line on stdout at the end of the run.
//! The top-level `status` field is always `"success"`; callers must inspect
//! per-item fields to detect partial failure.

use serde_json::{Map, Value};

const FALLBACK_LINE: &str = "{\"status\":\"error\"}";

#[derive(Debug, Default)]
pub struct ResultAggregate {
    fields: Map<String, Value>,
}

impl ResultAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: Value) {
        self.fields.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Seal the aggregate and render the single report line. Consumes the
    /// aggregate, so the report is written exactly once per run.
    pub fn finish(mut self) -> String {
        self.fields
            .insert("status".to_string(), Value::String("success".to_string()));
        serde_json::to_string(&self.fields).unwrap_or_else(|_| FALLBACK_LINE.to_string())
    }
}
