use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::csv_import::{Dialect, TEMPLATE_FILENAME};
use crate::event::{COLOR_PALETTE, COUNTDOWN_MAX_DAYS, Decorations};
use crate::export::{
    CalendarExporter, DEFAULT_CALENDAR_FILENAME, DEFAULT_CSV_FILENAME, DEFAULT_PRODUCT_ID,
    DEFAULT_UID_DOMAIN,
};
use crate::notifications::{DEFAULT_CAPACITY, DEFAULT_TTL, NotificationQueue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub dialect: Dialect,
    pub palette: Vec<String>,
    pub countdown_max_days: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            palette: COLOR_PALETTE.iter().map(|c| c.to_string()).collect(),
            countdown_max_days: COUNTDOWN_MAX_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub product_id: String,
    pub uid_domain: String,
    pub csv_filename: String,
    pub calendar_filename: String,
    pub template_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            csv_filename: DEFAULT_CSV_FILENAME.to_string(),
            calendar_filename: DEFAULT_CALENDAR_FILENAME.to_string(),
            template_filename: TEMPLATE_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY, ttl_secs: DEFAULT_TTL.as_secs() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    pub state_dir: Option<PathBuf>,
}

impl Config {
    /// Loads from `path`, or the platform config file when `None`.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_path()?,
        };

        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn decorations(&self) -> Decorations {
        Decorations::new(self.import.palette.clone(), self.import.countdown_max_days)
    }

    pub fn calendar_exporter(&self) -> CalendarExporter {
        CalendarExporter::new(self.export.product_id.as_str(), self.export.uid_domain.as_str())
    }

    pub fn notification_queue(&self) -> NotificationQueue {
        NotificationQueue::new(self.notifications.capacity, Duration::from_secs(self.notifications.ttl_secs))
    }

    /// Configured directory, else the platform data directory.
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.state_dir {
            return Ok(dir.clone());
        }
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "eventdesk", "eventdesk").context("Failed to determine config directory")
}

fn get_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.import.dialect, Dialect::Simple);
        assert_eq!(config.import.palette.len(), 5);
        assert_eq!(config.import.countdown_max_days, 30);
        assert_eq!(config.export.calendar_filename, "42_events.ics");
        assert_eq!(config.notifications.capacity, 5);
        assert_eq!(config.storage.state_dir, None);
    }

    #[test]
    fn test_missing_config_is_created() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let loaded = Config::load(Some(&config_path))?;
        assert!(config_path.exists());
        assert_eq!(loaded, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[import]\ndialect = \"rfc4180\"\n\n[storage]\nstate_dir = \"/tmp/eventdesk\"\n",
        )?;

        let loaded = Config::load(Some(&config_path))?;
        assert_eq!(loaded.import.dialect, Dialect::Rfc4180);
        assert_eq!(loaded.import.countdown_max_days, 30);
        assert_eq!(loaded.export, ExportConfig::default());
        assert_eq!(loaded.state_dir()?, PathBuf::from("/tmp/eventdesk"));
        Ok(())
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.export.uid_domain = "events.example.org".to_string();
        config.notifications.ttl_secs = 10;
        config.save_to(&config_path)?;

        let loaded = Config::load(Some(&config_path))?;
        assert_eq!(loaded, config);
        Ok(())
    }
}
