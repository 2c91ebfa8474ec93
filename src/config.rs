//! `steptrace.toml` settings
//!
//! ```toml
//! [language_features]
//! allow_truthiness = true
//! time_per_frame = 1
//!
//! [playback]
//! auto_play = false
//! speed = 2.0
//!
//! [logging]
//! filter = "steptrace=debug"
//! file = "steptrace.log"
//! ```
//!
//! Every key is optional. A missing file yields [`Config::default`].

use crate::runtime::LanguageFeatures;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PATH: &str = "steptrace.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid config {}: playback speed must be positive, got {speed}", .path.display())]
    InvalidSpeed { path: PathBuf, speed: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub auto_play: bool,
    /// Multiplier on wall time while playing.
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            auto_play: true,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `STEPTRACE_LOG` is unset.
    pub filter: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "warn".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language_features: LanguageFeatures,
    pub playback: PlaybackConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load `path`, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Config::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: error.message().to_string(),
        })?;
        if config.playback.speed <= 0.0 || !config.playback.speed.is_finite() {
            return Err(ConfigError::InvalidSpeed {
                path: path.to_path_buf(),
                speed: config.playback.speed,
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.playback.auto_play);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let content = "[language_features]\nallow_truthiness = true\n\n[playback]\nspeed = 2.5\n";
        let config = Config::parse(content, Path::new("steptrace.toml")).unwrap();
        assert!(config.language_features.allow_truthiness);
        assert!(config.language_features.enforce_strict_equality);
        assert_eq!(config.language_features.time_per_frame, 1);
        assert_eq!(config.playback.speed, 2.5);
        assert!(config.playback.auto_play);
    }

    #[test]
    fn test_logging_file() {
        let content = "[logging]\nfilter = \"steptrace=debug\"\nfile = \"trace.log\"\n";
        let config = Config::parse(content, Path::new("steptrace.toml")).unwrap();
        assert_eq!(config.logging.file, Some(PathBuf::from("trace.log")));
    }

    #[test]
    fn test_errors_name_the_file() {
        let error = Config::parse("[playback]\nspeed = \"fast\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().starts_with("invalid config x.toml"));

        let error = Config::parse("[playback]\nspeed = 0.0\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidSpeed { .. }));
    }
}
