//! Application configuration loaded from TOML.

use crate::data::FallbackPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "FOOD_INSIGHTS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "food_insights.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("ONLINE_FOOD_DELIVERY_ANALYSIS.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("online_food_delivery.db"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub group_fallback: FallbackPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub database: DatabaseConfig,
    pub cleaning: CleaningConfig,
    pub logging: LoggingConfig,
    pub window: WindowConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Read the file named by `FOOD_INSIGHTS_CONFIG`, else `food_insights.toml`
    /// when present, else built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [data]
            csv_path = "/data/orders.csv"

            [cleaning]
            group_fallback = "fail"
            "#,
            Path::new("test.toml"),
        )
        .unwrap();

        assert_eq!(config.data.csv_path, PathBuf::from("/data/orders.csv"));
        assert_eq!(config.cleaning.group_fallback, FallbackPolicy::Fail);
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.window.width, 1400.0);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AppConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cleaning.group_fallback, FallbackPolicy::GlobalMedian);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = AppConfig::from_toml_str(
            "[cleaning]\ngroup_fallback = \"guess\"\n",
            Path::new("bad.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("food_insights.toml");
        std::fs::write(&path, "[database]\npath = \"orders.db\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("orders.db"));
        assert!(matches!(
            AppConfig::from_file(&dir.path().join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
