use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::{GameResult, KeyValueStore};

pub const SETTINGS_KEY: &str = "wordGameSettings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub sound_enabled: bool,
    pub music_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
        }
    }
}

/// A partial change; unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub sound_enabled: Option<bool>,
    pub music_enabled: Option<bool>,
}

impl Settings {
    pub fn merged(mut self, update: SettingsUpdate) -> Self {
        if let Some(sound) = update.sound_enabled {
            self.sound_enabled = sound;
        }
        if let Some(music) = update.music_enabled {
            self.music_enabled = music;
        }
        self
    }
}

/// Sound and music preferences. Advisory only; nothing in the game rules
/// reads them.
pub struct SettingsStore {
    settings: Settings,
    storage: Box<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let settings = match Self::read(storage.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings: {}", e);
                Settings::default()
            }
        };
        Self { settings, storage }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn update(&mut self, update: SettingsUpdate) -> Settings {
        self.settings = self.settings.merged(update);

        let result = serde_json::to_string(&self.settings)
            .map_err(Into::into)
            .and_then(|json| self.storage.set(SETTINGS_KEY, &json));
        if let Err(e) = result {
            warn!("Settings kept in memory only: {}", e);
        }
        self.settings
    }

    fn read(storage: &dyn KeyValueStore) -> GameResult<Settings> {
        let Some(json) = storage.get(SETTINGS_KEY)? else {
            return Ok(Settings::default());
        };
        let update: SettingsUpdate = serde_json::from_str(&json)?;
        Ok(Settings::default().merged(update))
    }
}
