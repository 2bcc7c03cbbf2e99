use std::collections::BTreeMap;

use super::stages::{dim_conference_stage, dim_division_stage, dim_team_stage, fact_game_stage};
use super::Stage;
use crate::constants::{
    DIM_CONFERENCE_ENTITY, DIM_DIVISION_ENTITY, DIM_TEAM_ENTITY, FACT_GAME_ENTITY,
};
use crate::error::{EtlError, Result};

pub type StageFactory = fn() -> Box<dyn Stage>;

/// Registry of transform stages by name
pub struct StageRegistry {
    factories: BTreeMap<String, StageFactory>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StageRegistry {
    /// Create a registry with every built-in stage
    pub fn new() -> Self {
        let mut registry = Self {
            factories: BTreeMap::new(),
        };
        registry.register(DIM_TEAM_ENTITY, || Box::new(dim_team_stage()));
        registry.register(DIM_DIVISION_ENTITY, || Box::new(dim_division_stage()));
        registry.register(DIM_CONFERENCE_ENTITY, || Box::new(dim_conference_stage()));
        registry.register(FACT_GAME_ENTITY, || Box::new(fact_game_stage()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: StageFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Builds a fresh stage; set-backed stages carry state, so instances are not reused
    pub fn build(&self, name: &str) -> Result<Box<dyn Stage>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| EtlError::UnknownStage(name.to_string()))
    }

    pub fn list_stages(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }
}
