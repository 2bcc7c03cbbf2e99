// Generic stage shapes
pub mod base;

// Entity stages
pub mod dim_conference;
pub mod dim_division;
pub mod dim_team;
pub mod fact_game;

pub use base::{DistinctStage, ProjectionStage};
pub use dim_conference::dim_conference_stage;
pub use dim_division::dim_division_stage;
pub use dim_team::dim_team_stage;
pub use fact_game::fact_game_stage;
