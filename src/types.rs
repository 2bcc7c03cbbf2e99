use std::fmt;
use std::str::FromStr;

use crate::error::EtlError;

/// One entity instance flowing through a record stream
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Which part of a season a gamelog covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameType {
    Regular,
    Playoffs,
}

impl GameType {
    /// Numeric code the upstream gamelog page expects in its `gameType` parameter
    pub fn source_code(self) -> u8 {
        match self {
            GameType::Regular => 2,
            GameType::Playoffs => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Regular => "regular",
            GameType::Playoffs => "playoffs",
        }
    }
}

impl FromStr for GameType {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(GameType::Regular),
            "playoffs" => Ok(GameType::Playoffs),
            other => Err(EtlError::UnsupportedGameType(other.to_string())),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_source_codes() {
        assert_eq!("regular".parse::<GameType>().unwrap().source_code(), 2);
        assert_eq!("playoffs".parse::<GameType>().unwrap().source_code(), 3);
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["preseason", "Regular", "", "2"] {
            let err = raw.parse::<GameType>().unwrap_err();
            assert!(matches!(err, EtlError::UnsupportedGameType(ref v) if v == raw));
        }
    }

    #[test]
    fn display_round_trips() {
        for game_type in [GameType::Regular, GameType::Playoffs] {
            assert_eq!(game_type.to_string().parse::<GameType>().unwrap(), game_type);
        }
    }
}
