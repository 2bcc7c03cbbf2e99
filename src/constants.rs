/// Entity names carried in stream headers.
/// These are the names downstream sinks see in the first line of every stream.
pub const GAMELOG_ENTITY: &str = "gamelog";
pub const TEAM_FACTS_ENTITY: &str = "team_facts";
pub const DIM_TEAM_ENTITY: &str = "dim_team";
pub const DIM_DIVISION_ENTITY: &str = "dim_division";
pub const DIM_CONFERENCE_ENTITY: &str = "dim_conference";
pub const FACT_GAME_ENTITY: &str = "fact_game";

// Upstream endpoints
pub const DEFAULT_GAMELOG_ENDPOINT: &str =
    "http://{team_name}.ice.nhl.com/club/gamelog.htm?season={years}&gameType={game_type}";
pub const DEFAULT_TEAMS_ENDPOINT: &str = "https://statsapi.web.nhl.com/api/v1/teams";
pub const DEFAULT_TEAMS_PAYLOAD_KEY: &str = "teams";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

// Gamelog page layout
pub const DATA_TABLE_SELECTOR: &str = "table.data";

// Environment overrides
pub const GAMELOG_ENDPOINT_ENV: &str = "GAMELOG_ENDPOINT_URL";
pub const TEAMS_ENDPOINT_ENV: &str = "TEAMS_ENDPOINT_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT";

/// Config file picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "nhl_etl.toml";
