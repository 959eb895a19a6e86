//! Menu settings persistence
//!
//! Settings live in a single TOML file. Loading never fails: a missing or
//! unreadable file yields defaults. Saving writes a temp file under an
//! exclusive lock and renames it over the target.

use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::types::MenuSettings;
use playhost_core::prelude::*;

/// Settings file name inside the playhost home directory
pub const SETTINGS_FILENAME: &str = "menu_settings.toml";

/// Overrides the playhost home directory
pub const HOME_ENV_VAR: &str = "PLAYHOST_HOME";

const HEADER: &str = "# playhost menu settings\n# Written by playhost; edits are kept until the menu changes them\n\n";

/// Resolve the playhost home directory.
///
/// `PLAYHOST_HOME` when set and non-empty, otherwise
/// `<data_local_dir>/playhost`.
pub fn playhost_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::data_local_dir()
        .map(|dir| dir.join("playhost"))
        .ok_or_else(|| Error::config("Could not determine local data directory"))
}

/// Reads and writes [`MenuSettings`] at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<playhost home>/menu_settings.toml`
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(playhost_home()?.join(SETTINGS_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, or defaults if the file is missing or unreadable
    pub fn load(&self) -> MenuSettings {
        match self.try_load() {
            Ok(settings) => {
                debug!("Loaded menu settings from {:?}", self.path);
                settings
            }
            Err(Error::ConfigNotFound { .. }) => {
                debug!("No menu settings at {:?}, using defaults", self.path);
                MenuSettings::default()
            }
            Err(e) => {
                warn!("Failed to load menu settings, using defaults: {}", e);
                MenuSettings::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<MenuSettings> {
        if !self.path.exists() {
            return Err(Error::ConfigNotFound {
                path: self.path.clone(),
            });
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Replace the stored settings with `settings`
    pub fn save(&self, settings: &MenuSettings) -> Result<()> {
        let body = toml::to_string_pretty(settings)
            .map_err(|e| Error::config(format!("Failed to serialize menu settings: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::config(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let temp_path = self.path.with_extension("toml.tmp");
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::config(format!("Failed to open {:?}: {}", temp_path, e)))?;

        // Serializes concurrent writers from other processes
        file.lock_exclusive()
            .map_err(|e| Error::config(format!("Failed to lock {:?}: {}", temp_path, e)))?;

        file.write_all(HEADER.as_bytes())
            .and_then(|_| file.write_all(body.as_bytes()))
            .and_then(|_| file.flush())
            .map_err(|e| Error::config(format!("Failed to write {:?}: {}", temp_path, e)))?;

        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::config(format!("Failed to replace {:?}: {}", self.path, e)))?;

        debug!("Saved menu settings to {:?}", self.path);
        Ok(())
    }
}
