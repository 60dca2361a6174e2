//! Persisted user preferences.
//!
//! Two keys are used: the last API token and the temperature unit. The
//! storage itself is any [`SettingsStore`]; [`MemorySettings`] keeps values
//! in memory for tests and one-shot runs.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use airdash_types::TemperatureUnit;

use crate::error::Result;
use crate::traits::SettingsStore;

/// Key holding the last API token used.
pub const KEY_API_TOKEN: &str = "api_token";

/// Key holding the temperature unit preference.
pub const KEY_TEMPERATURE_UNIT: &str = "temperature_unit";

/// In-memory [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load the temperature unit, falling back to Celsius.
pub fn load_temperature_unit(store: &dyn SettingsStore) -> TemperatureUnit {
    let Some(saved) = store.get(KEY_TEMPERATURE_UNIT) else {
        return TemperatureUnit::default();
    };

    saved.parse().unwrap_or_else(|e| {
        warn!("Ignoring saved temperature unit: {}", e);
        TemperatureUnit::default()
    })
}

/// Persist a temperature unit.
pub fn save_temperature_unit(store: &dyn SettingsStore, unit: TemperatureUnit) -> Result<()> {
    store.set(KEY_TEMPERATURE_UNIT, unit.as_str())
}

/// Switch to the other temperature unit and persist it.
pub fn toggle_temperature_unit(store: &dyn SettingsStore) -> Result<TemperatureUnit> {
    let unit = load_temperature_unit(store).toggled();
    save_temperature_unit(store, unit)?;
    Ok(unit)
}

/// Persist the token last used to start polling.
pub fn remember_token(store: &dyn SettingsStore, token: &str) -> Result<()> {
    store.set(KEY_API_TOKEN, token.trim())
}

/// The saved token, if any non-blank one exists.
pub fn saved_token(store: &dyn SettingsStore) -> Option<String> {
    store
        .get(KEY_API_TOKEN)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_defaults_to_celsius() {
        let store = MemorySettings::new();
        assert_eq!(load_temperature_unit(&store), TemperatureUnit::Celsius);

        store.set(KEY_TEMPERATURE_UNIT, "kelvin").unwrap();
        assert_eq!(load_temperature_unit(&store), TemperatureUnit::Celsius);
    }

    #[test]
    fn test_toggle_persists() {
        let store = MemorySettings::new();
        assert_eq!(
            toggle_temperature_unit(&store).unwrap(),
            TemperatureUnit::Fahrenheit
        );
        assert_eq!(store.get(KEY_TEMPERATURE_UNIT).as_deref(), Some("fahrenheit"));
        assert_eq!(load_temperature_unit(&store), TemperatureUnit::Fahrenheit);

        assert_eq!(
            toggle_temperature_unit(&store).unwrap(),
            TemperatureUnit::Celsius
        );
    }

    #[test]
    fn test_token_round_trip() {
        let store = MemorySettings::new();
        assert_eq!(saved_token(&store), None);

        remember_token(&store, "  abc-123 ").unwrap();
        assert_eq!(saved_token(&store).as_deref(), Some("abc-123"));

        remember_token(&store, "   ").unwrap();
        assert_eq!(saved_token(&store), None);
    }
}
