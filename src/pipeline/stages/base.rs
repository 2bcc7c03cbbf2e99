use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

use crate::error::Result;
use crate::pipeline::mapping::{lookup, project, target_fields, FieldMapping};
use crate::pipeline::{Accepted, Stage};
use crate::types::Record;

/// One output record per input record, built from a mapping table.
pub struct ProjectionStage {
    entity: &'static str,
    mappings: &'static [FieldMapping],
}

impl ProjectionStage {
    pub fn new(entity: &'static str, mappings: &'static [FieldMapping]) -> Self {
        Self { entity, mappings }
    }
}

impl Stage for ProjectionStage {
    fn entity(&self) -> &str {
        self.entity
    }

    fn fields(&self) -> Vec<String> {
        target_fields(self.mappings)
    }

    fn accept(&mut self, record: Record) -> Result<Accepted> {
        Ok(Accepted::Emit(project(&record, self.mappings)?))
    }
}

/// Collects the distinct string values found at `key_path` and emits each once
/// as `{target: value}` when input ends, sorted by value.
pub struct DistinctStage {
    entity: &'static str,
    key_path: &'static str,
    target: &'static str,
    seen: BTreeSet<String>,
}

impl DistinctStage {
    pub fn new(entity: &'static str, key_path: &'static str, target: &'static str) -> Self {
        Self {
            entity,
            key_path,
            target,
            seen: BTreeSet::new(),
        }
    }
}

impl Stage for DistinctStage {
    fn entity(&self) -> &str {
        self.entity
    }

    fn fields(&self) -> Vec<String> {
        vec![self.target.to_string()]
    }

    fn accept(&mut self, record: Record) -> Result<Accepted> {
        match lookup(&record, self.key_path) {
            Some(Value::String(value)) => {
                self.seen.insert(value.clone());
                Ok(Accepted::Buffered)
            }
            other => {
                warn!(
                    entity = self.entity,
                    key = self.key_path,
                    found = ?other,
                    "record has no usable key; skipping"
                );
                Ok(Accepted::Skipped)
            }
        }
    }

    fn finish(&mut self) -> Result<Vec<Record>> {
        let target = self.target;
        Ok(std::mem::take(&mut self.seen)
            .into_iter()
            .map(|value| {
                let mut record = Record::new();
                record.insert(target.to_string(), Value::String(value));
                record
            })
            .collect())
    }
}
