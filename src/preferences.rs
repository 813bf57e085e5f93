//! Persisted user preferences.
//!
//! Stored as TOML at `<data_dir>/brief/preferences.toml`. Every setter writes
//! the file immediately.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{BriefError, Result};

pub const DEFAULT_SYNC_INTERVAL_HOURS: u32 = 6;
pub const MIN_SYNC_INTERVAL_HOURS: u32 = 1;
pub const SYNC_INTERVAL_OPTIONS: [u32; 5] = [1, 3, 6, 12, 24];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub dark_theme: bool,
    pub background_sync: bool,
    pub sync_interval_hours: u32,
    pub notifications: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dark_theme: false,
            background_sync: true,
            sync_interval_hours: DEFAULT_SYNC_INTERVAL_HOURS,
            notifications: false,
        }
    }
}

impl UserPreferences {
    /// Sync interval with the minimum applied, for hand-edited files
    pub fn effective_sync_interval_hours(&self) -> u32 {
        self.sync_interval_hours.max(MIN_SYNC_INTERVAL_HOURS)
    }
}

/// Preferences bound to the file they are saved in.
pub struct PreferenceStore {
    path: PathBuf,
    prefs: UserPreferences,
}

impl PreferenceStore {
    /// Load from `path`; a missing file yields the defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let prefs = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| {
                BriefError::Preferences(format!("{}: {}", path.display(), e))
            })?
        } else {
            UserPreferences::default()
        };
        Ok(Self { path, prefs })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| BriefError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("brief").join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> &UserPreferences {
        &self.prefs
    }

    pub fn set_dark_theme(&mut self, enabled: bool) -> Result<()> {
        self.update(|p| p.dark_theme = enabled)
    }

    pub fn set_background_sync(&mut self, enabled: bool) -> Result<()> {
        self.update(|p| p.background_sync = enabled)
    }

    /// Only the values in [`SYNC_INTERVAL_OPTIONS`] are accepted.
    pub fn set_sync_interval_hours(&mut self, hours: u32) -> Result<()> {
        if !SYNC_INTERVAL_OPTIONS.contains(&hours) {
            return Err(BriefError::Preferences(format!(
                "Unsupported sync interval {}h (choose one of {:?})",
                hours, SYNC_INTERVAL_OPTIONS
            )));
        }
        self.update(|p| p.sync_interval_hours = hours)
    }

    pub fn set_notifications(&mut self, enabled: bool) -> Result<()> {
        self.update(|p| p.notifications = enabled)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.update(|p| *p = UserPreferences::default())
    }

    fn update(&mut self, change: impl FnOnce(&mut UserPreferences)) -> Result<()> {
        change(&mut self.prefs);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.prefs)
            .map_err(|e| BriefError::Preferences(e.to_string()))?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "Saved preferences");
        Ok(())
    }
}
