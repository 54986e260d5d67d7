//! Configuration file
//!
//! ```json
//! {"data_dir": "data", "reports_dir": "reports", "log_level": "warn"}
//! ```
//!
//! Relative directories resolve against the directory holding the config
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REPORTS_DIR: &str = "reports";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Table files directory (required)
    pub data_dir: PathBuf,

    /// Report output directory (required)
    pub reports_dir: PathBuf,

    /// Minimum log severity: trace, info, warn or error (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Default configuration for a config file at `path`
    pub fn default_for(path: &Path) -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            log_level: default_log_level(),
            base_dir: base_dir(path),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("failed to read config {}: {}", path.display(), e))
        })?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("invalid config JSON: {}", e)))?;
        config.base_dir = base_dir(path);

        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON, failing if the file exists
    pub fn save_new(&self, path: &Path) -> CliResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .and_then(|mut file| std::io::Write::write_all(&mut file, content.as_bytes()))
            .map_err(|e| {
                CliError::config_error(format!("failed to write config {}: {}", path.display(), e))
            })
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        if self.reports_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("reports_dir must not be empty"));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("invalid log_level: {}", e)))
    }

    /// Data directory, resolved
    pub fn data_path(&self) -> PathBuf {
        self.base_dir.join(&self.data_dir)
    }

    /// Reports directory, resolved
    pub fn reports_path(&self) -> PathBuf {
        self.base_dir.join(&self.reports_dir)
    }
}

fn base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
