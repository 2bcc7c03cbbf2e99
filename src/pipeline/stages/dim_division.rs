use crate::constants::DIM_DIVISION_ENTITY;
use crate::pipeline::stages::DistinctStage;

pub fn dim_division_stage() -> DistinctStage {
    DistinctStage::new(DIM_DIVISION_ENTITY, "division.name", "name")
}
