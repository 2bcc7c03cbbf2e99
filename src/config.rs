use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_GAMELOG_ENDPOINT, DEFAULT_TEAMS_ENDPOINT,
    DEFAULT_TEAMS_PAYLOAD_KEY, DEFAULT_TIMEOUT_SECONDS, GAMELOG_ENDPOINT_ENV, REQUEST_TIMEOUT_ENV,
    TEAMS_ENDPOINT_ENV,
};
use crate::error::{EtlError, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub gamelog: GamelogConfig,
    pub teams: TeamsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GamelogConfig {
    /// URL template with `{team_name}`, `{years}` and `{game_type}` placeholders
    pub endpoint_template: String,
    pub timeout_seconds: u64,
}

impl Default for GamelogConfig {
    fn default() -> Self {
        Self {
            endpoint_template: DEFAULT_GAMELOG_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl GamelogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TeamsConfig {
    pub endpoint_url: String,
    pub timeout_seconds: u64,
    pub payload_key: String,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_TEAMS_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            payload_key: DEFAULT_TEAMS_PAYLOAD_KEY.to_string(),
        }
    }
}

impl TeamsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Replaces the built-in filter when `RUST_LOG` is unset
    pub filter: Option<String>,
    /// Directory for daily-rotated JSON log files; console only when unset
    pub log_dir: Option<String>,
}

impl Config {
    /// Loads defaults, then the TOML file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `nhl_etl.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!("loaded config file {}", path.display());
        Ok(toml::from_str(&content)?)
    }

    /// Applies environment overrides through `lookup` so tests need not touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(GAMELOG_ENDPOINT_ENV) {
            self.gamelog.endpoint_template = url;
        }
        if let Some(url) = lookup(TEAMS_ENDPOINT_ENV) {
            self.teams.endpoint_url = url;
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV) {
            let seconds: u64 = raw.trim().parse().map_err(|_| {
                EtlError::Config(format!("{REQUEST_TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"))
            })?;
            self.gamelog.timeout_seconds = seconds;
            self.teams.timeout_seconds = seconds;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.gamelog.timeout_seconds == 0 || self.teams.timeout_seconds == 0 {
            return Err(EtlError::Config("timeout_seconds must be greater than zero".into()));
        }
        if self.teams.payload_key.is_empty() {
            return Err(EtlError::Config("teams.payload_key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_point_at_gamelog_page() {
        let config = Config::default();
        assert!(config.gamelog.endpoint_template.contains("{team_name}"));
        assert!(config.gamelog.endpoint_template.contains("{years}"));
        assert!(config.gamelog.endpoint_template.contains("{game_type}"));
        assert_eq!(config.gamelog.timeout(), Duration::from_secs(10));
        assert_eq!(config.teams.payload_key, "teams");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[gamelog]\ntimeout_seconds = 3\n\n[logging]\nlog_dir = \"logs\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.gamelog.timeout_seconds, 3);
        assert_eq!(config.gamelog.endpoint_template, DEFAULT_GAMELOG_ENDPOINT);
        assert_eq!(config.logging.log_dir.as_deref(), Some("logs"));
        assert_eq!(config.teams, TeamsConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn env_overrides_apply_to_both_extractors() {
        let env: HashMap<&str, &str> = [
            (GAMELOG_ENDPOINT_ENV, "http://localhost/{team_name}/{years}/{game_type}"),
            (REQUEST_TIMEOUT_ENV, "25"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(
            config.gamelog.endpoint_template,
            "http://localhost/{team_name}/{years}/{game_type}"
        );
        assert_eq!(config.gamelog.timeout_seconds, 25);
        assert_eq!(config.teams.timeout_seconds, 25);
        assert_eq!(config.teams.endpoint_url, DEFAULT_TEAMS_ENDPOINT);
    }

    #[test]
    fn non_numeric_timeout_env_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == REQUEST_TIMEOUT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = Config::default();
        config.teams.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
