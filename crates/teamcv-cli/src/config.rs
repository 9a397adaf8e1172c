use std::env;
use std::path::PathBuf;

use teamcv_core::StoreConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one JSON file per storage key
    pub data_dir: PathBuf,
    /// Storage key of the resume collection
    pub resume_key: String,
    /// Storage key of the team collection
    pub team_key: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = match env::var("TEAMCV_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => Self::default_data_dir(),
        };
        let defaults = StoreConfig::default();
        let resume_key = env::var("TEAMCV_RESUME_KEY").unwrap_or(defaults.resume_key);
        let team_key = env::var("TEAMCV_TEAM_KEY").unwrap_or(defaults.team_key);

        Ok(Self {
            data_dir,
            resume_key,
            team_key,
        })
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let defaults = StoreConfig::default();
        Self {
            data_dir: data_dir.into(),
            resume_key: defaults.resume_key,
            team_key: defaults.team_key,
        }
    }

    fn default_data_dir() -> PathBuf {
        // XDG data directory or fallback
        match directories::ProjectDirs::from("", "", "teamcv") {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => PathBuf::from("teamcv-data"),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            resume_key: self.resume_key.clone(),
            team_key: self.team_key.clone(),
            ..StoreConfig::default()
        }
    }
}
