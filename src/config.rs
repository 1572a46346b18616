/// Service configuration loaded from a TOML file.
///
/// The database connection string is never stored in the file itself; the
/// file names the environment variable holding it, and `.env` is consulted
/// via dotenv before the lookup.

use chrono::NaiveDate;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::logging::LogLevel;
use crate::months::parse_year_month;

pub const DEFAULT_CONFIG_PATH: &str = "gamestat.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io(String),
    /// The file is not valid TOML or has bad values.
    Parse(String),
    /// The environment variable named by `database.url_env` is unset.
    MissingEnv(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::MissingEnv(var) => write!(f, "Environment variable {} is not set", var),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Name of the environment variable holding the postgres URL.
    pub url_env: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url_env: "DATABASE_URL".to_string(),
        }
    }
}

/// First and last month covered by the imported dataset, as `YYYY-MM`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub first_month: String,
    pub last_month: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            first_month: "2012-07".to_string(),
            last_month: "2021-09".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Parses configuration text and validates the dataset span.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.dataset_span()?;
        Ok(config)
    }

    /// The dataset's first and last month.
    pub fn dataset_span(&self) -> Result<(NaiveDate, NaiveDate), ConfigError> {
        let first = parse_year_month(&self.dataset.first_month)
            .map_err(|e| ConfigError::Parse(format!("dataset.first_month: {}", e)))?;
        let last = parse_year_month(&self.dataset.last_month)
            .map_err(|e| ConfigError::Parse(format!("dataset.last_month: {}", e)))?;
        if first > last {
            return Err(ConfigError::Parse(format!(
                "dataset.first_month {} is after dataset.last_month {}",
                self.dataset.first_month, self.dataset.last_month
            )));
        }
        Ok((first, last))
    }

    /// Resolves the database URL from the environment, loading `.env` first.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        dotenv::dotenv().ok();
        env::var(&self.database.url_env)
            .map_err(|_| ConfigError::MissingEnv(self.database.url_env.clone()))
    }
}

/// Loads the configuration file.
///
/// With no explicit path, `DEFAULT_CONFIG_PATH` is read if it exists and
/// defaults are used otherwise. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(AppConfig::default());
            }
            default
        }
    };
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    AppConfig::from_toml_str(&content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
