//! Player settings and difficulty presets
//!
//! Only the two gameplay toggles are persisted, as one JSON value under a
//! single storage key. Difficulty is chosen per session.

use serde::{Deserialize, Serialize};

use crate::platform::storage::KeyValueStore;

/// Difficulty presets, mapped to a level-1 ball speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Base ball speed in pixels per reference frame
    pub fn speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 3.0,
            Difficulty::Normal => 8.0,
            Difficulty::Hard => 10.0,
        }
    }
}

/// Persisted gameplay toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Random urgent blocks mid-level
    pub random_blocks: bool,
    /// Power-up tags on injected blocks
    pub power_ups: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            random_blocks: true,
            power_ups: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "agenda_breaker_settings";

    /// Load from `store`, falling back to defaults when missing or corrupt
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring corrupt settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if store.set(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                } else {
                    log::warn!("Settings could not be saved");
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }

    /// Copy the toggles into a running session
    pub fn apply(&self, state: &mut crate::sim::GameState) {
        state.random_blocks_enabled = self.random_blocks;
        state.power_ups_enabled = self.power_ups;
    }
}
