//! Settings file management.
//!
//! Settings are a flat TOML table of string values, keyed the same way as
//! every other [`SettingsStore`]:
//!
//! ```toml
//! api_token = "..."
//! temperature_unit = "fahrenheit"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use airdash_core::{Error, SettingsStore};
use tracing::warn;

/// Default settings file path.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airdash")
        .join("settings.toml")
}

/// A [`SettingsStore`] backed by a TOML file.
///
/// Values are cached in memory and the whole file is rewritten on every
/// `set`.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettings {
    /// Open the settings file at `path`.
    ///
    /// A missing file starts out empty. An unreadable or malformed one is
    /// logged and also treated as empty; it is replaced on the next `set`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = if path.exists() {
            load_values(&path).unwrap_or_else(|e| {
                warn!("Ignoring settings file {}: {}", path.display(), e);
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Open the settings file at the default path.
    pub fn open_default() -> Self {
        Self::open(default_settings_path())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Settings(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(values)
            .map_err(|e| Error::Settings(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&self.path, content).map_err(|e| {
            Error::Settings(format!(
                "Failed to write settings {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

fn load_values(path: &Path) -> Result<BTreeMap<String, String>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map_err(|e| e.to_string())
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> airdash_core::Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }
}

/// Shorten a token for display, keeping only its first characters.
pub fn mask_token(token: &str) -> String {
    const VISIBLE: usize = 4;
    if token.chars().count() <= VISIBLE {
        return "*".repeat(token.chars().count());
    }
    let head: String = token.chars().take(VISIBLE).collect();
    format!("{}…", head)
}
