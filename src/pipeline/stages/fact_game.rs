use crate::constants::FACT_GAME_ENTITY;
use crate::pipeline::mapping::{FieldMapping, Normalizer};
use crate::pipeline::stages::ProjectionStage;

use crate::pipeline::mapping::Normalizer::Integer;

/// Gamelog table columns onto `fact_game`.
pub const FACT_GAME_MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new("Date", "date").with(Normalizer::GameDate),
    FieldMapping::new("H/R", "hr"),
    FieldMapping::new("Dec", "dec"),
    FieldMapping::new("O/S", "os"),
    FieldMapping::new("Opp", "opp"),
    FieldMapping::new("GF", "gf").with(Integer),
    FieldMapping::new("GA", "ga").with(Integer),
    FieldMapping::new("PPG", "ppg").with(Integer),
    FieldMapping::new("PP Opp", "pp opp").with(Integer),
    FieldMapping::new("PPGA", "ppga").with(Integer),
    FieldMapping::new("TS", "ts").with(Integer),
    FieldMapping::new("SHGA", "shga").with(Integer),
    FieldMapping::new("SF", "sf").with(Integer),
    FieldMapping::new("SA", "sa").with(Integer),
];

pub fn fact_game_stage() -> ProjectionStage {
    ProjectionStage::new(FACT_GAME_ENTITY, FACT_GAME_MAPPINGS)
}
