use crate::constants::DIM_CONFERENCE_ENTITY;
use crate::pipeline::stages::DistinctStage;

pub fn dim_conference_stage() -> DistinctStage {
    DistinctStage::new(DIM_CONFERENCE_ENTITY, "conference.name", "name")
}
