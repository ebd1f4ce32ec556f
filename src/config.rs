//! Config - Where saves live and how many backups are kept

use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result, MAXIMUM_BACKUPS};

const SAVES_PATH_VAR: &str = "SAVEKEEPER_SAVES_PATH";
const TEMP_PATH_VAR: &str = "SAVEKEEPER_TEMP_PATH";
const MAX_BACKUPS_VAR: &str = "SAVEKEEPER_MAX_BACKUPS";

/// How close to now the host's save file must have been written for an
/// override backup commit
const OVERRIDE_BACKUP_MARGIN_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfig {
    /// Directory holding every slot's save, active and backup directories,
    /// next to the host's own save files
    pub saves_path: PathBuf,
    pub temporary_path: PathBuf,
    pub maximum_backups: usize,
    pub override_backup_margin: Duration,
}

impl Default for SaveConfig {
    fn default() -> Self {
        let data_directory = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("savekeeper");

        Self {
            saves_path: data_directory.join("saves"),
            temporary_path: data_directory.join("temp"),
            maximum_backups: MAXIMUM_BACKUPS,
            override_backup_margin: Duration::from_secs(OVERRIDE_BACKUP_MARGIN_SECS),
        }
    }
}

impl SaveConfig {
    /// The default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(saves_path) = lookup(SAVES_PATH_VAR) {
            config.saves_path = PathBuf::from(saves_path);
        }

        if let Some(temporary_path) = lookup(TEMP_PATH_VAR) {
            config.temporary_path = PathBuf::from(temporary_path);
        }

        if let Some(maximum_backups) = lookup(MAX_BACKUPS_VAR) {
            config.maximum_backups = maximum_backups.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a non-negative whole number, got '{}'",
                    MAX_BACKUPS_VAR, maximum_backups
                ))
            })?;
        }

        Ok(config)
    }

    pub fn with_saves_path(mut self, saves_path: impl Into<PathBuf>) -> Self {
        self.saves_path = saves_path.into();
        self
    }

    pub fn with_temporary_path(mut self, temporary_path: impl Into<PathBuf>) -> Self {
        self.temporary_path = temporary_path.into();
        self
    }

    pub fn with_maximum_backups(mut self, maximum_backups: usize) -> Self {
        self.maximum_backups = maximum_backups;
        self
    }

    pub fn with_override_backup_margin(mut self, margin: Duration) -> Self {
        self.override_backup_margin = margin;
        self
    }
}
