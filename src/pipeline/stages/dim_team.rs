use crate::constants::DIM_TEAM_ENTITY;
use crate::pipeline::mapping::{FieldMapping, Normalizer};
use crate::pipeline::stages::ProjectionStage;

/// Team facts (stats API team objects) onto `dim_team`.
pub const DIM_TEAM_MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new("name", "full_name").with(Normalizer::Latinize),
    FieldMapping::new("shortName", "short_name").with(Normalizer::Latinize),
    FieldMapping::new("abbreviation", "abbreviation").with(Normalizer::Latinize),
    FieldMapping::new("locationName", "location").with(Normalizer::Latinize),
    FieldMapping::new("division.name", "division"),
    FieldMapping::new("conference.name", "conference"),
    FieldMapping::new("firstYearOfPlay", "first_year_of_play").with(Normalizer::Integer),
    FieldMapping::new("teamName", "team_name").with(Normalizer::Latinize),
];

pub fn dim_team_stage() -> ProjectionStage {
    ProjectionStage::new(DIM_TEAM_ENTITY, DIM_TEAM_MAPPINGS)
}
