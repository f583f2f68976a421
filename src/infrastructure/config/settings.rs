//! Application configuration loading and validation.
//!
//! Configuration is read from a TOML file. The database location can be
//! overridden with the `FGLPOOL_DATABASE` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use fglpool::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::domain::{Season, DEFAULT_BASE_ALLOWANCE};
use crate::error::{ConfigError, Result};

/// Environment variable that overrides [`Config::database`].
pub const DATABASE_ENV: &str = "FGLPOOL_DATABASE";

/// Defaults used by `fglpool init` when no flags are given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    pub name: String,
    pub base_allowance: Decimal,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            name: "Season".into(),
            base_allowance: DEFAULT_BASE_ALLOWANCE,
        }
    }
}

impl SeasonConfig {
    /// Build validated season settings.
    ///
    /// # Errors
    /// Negative allowance.
    pub fn to_season(&self) -> Result<Season> {
        Ok(Season::try_new(self.name.clone(), self.base_allowance)?)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file. When unset the CLI uses
    /// `~/.fglpool/fglpool.db`.
    #[serde(default)]
    pub database: Option<String>,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Season defaults.
    #[serde(default)]
    pub season: SeasonConfig,
}

impl Config {
    /// Parse configuration from TOML content and apply environment
    /// overrides.
    ///
    /// # Errors
    /// Malformed TOML or a value that fails validation.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// The file cannot be read, or [`Config::parse_toml`] fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// # Errors
    /// The file exists but cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let mut config = Self::default();
            config.apply_env();
            config.validate()?;
            Ok(config)
        }
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(DATABASE_ENV) {
            if !path.trim().is_empty() {
                self.database = Some(path);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.season.base_allowance < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "season.base_allowance",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if self.season.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "season.name",
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }
        if let Some(path) = &self.database {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "database",
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
