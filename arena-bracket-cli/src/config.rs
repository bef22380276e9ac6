use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use arena_bracket_core::scoring::PointsTable;
use arena_bracket_core::SwissOptions;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! from_environment {
    ($config:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            {
                if let Ok(value) = env::var($key) {
                    match value.parse() {
                        Ok(value) => $config.$name = value,
                        Err(_) => log::warn!("Ignoring invalid value for {}: {}", $key, value),
                    }
                }
            }
        )*
    }};
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loglevel: LevelFilter,
    /// The directory tournament records are stored in.
    pub data_dir: PathBuf,
    pub scoring: PointsTable,
    pub swiss: SwissOptions,
}

impl Config {
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let buf = fs::read(path)?;

        Ok(toml::from_slice(&buf)?)
    }

    /// Reads the config file at `path`. A missing file yields the default config.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        match Self::from_file(path) {
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            res => res,
        }
    }

    /// Overrides all values that are set in the environment.
    pub fn with_environment(mut self) -> Self {
        from_environment!(self, "AB_LOGLEVEL", loglevel, "AB_DATA_DIR", data_dir);

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: LevelFilter::Info,
            data_dir: PathBuf::from("data"),
            scoring: PointsTable::default(),
            swiss: SwissOptions::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::PathBuf;

    use arena_bracket_core::scoring::PointsTable;
    use arena_bracket_core::SwissOptions;
    use log::LevelFilter;

    use super::Config;

    #[test]
    fn test_config_parse() {
        let input = r#"
            loglevel = "debug"
            data_dir = "/var/lib/arena-bracket"

            [scoring]
            placement = [10, 5, 1]
            kill = 1

            [swiss]
            score_win = 3
        "#;

        let config: Config = toml::from_str(input).unwrap();

        assert_eq!(config.loglevel, LevelFilter::Debug);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/arena-bracket"));
        assert_eq!(config.scoring.placement.as_ref(), &[10, 5, 1]);
        assert_eq!(config.scoring.kill, 1);
        assert_eq!(config.scoring.win, PointsTable::STANDARD.win);
        assert_eq!(
            config.swiss,
            SwissOptions {
                score_win: 3,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_config_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_missing_file() {
        let config = Config::load("/nonexistent/arena-bracket/config.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_with_environment() {
        env::set_var("AB_DATA_DIR", "/tmp/arena-bracket-env");

        let config = Config::default().with_environment();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/arena-bracket-env"));

        env::remove_var("AB_DATA_DIR");
    }
}
