//! Game settings and preferences
//!
//! Persisted as JSON: LocalStorage on web, a file next to the binary on native.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speed tiers offered on the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedTier {
    Recruit,
    #[default]
    Pilot,
    Ace,
}

impl SpeedTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedTier::Recruit => "RECRUIT",
            SpeedTier::Pilot => "PILOT",
            SpeedTier::Ace => "ACE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "recruit" | "easy" => Some(SpeedTier::Recruit),
            "pilot" | "normal" => Some(SpeedTier::Pilot),
            "ace" | "hard" => Some(SpeedTier::Ace),
            _ => None,
        }
    }

    /// Global speed multiplier for this tier
    pub fn multiplier(&self) -> f32 {
        match self {
            SpeedTier::Recruit => 0.65,
            SpeedTier::Pilot => 1.0,
            SpeedTier::Ace => 1.4,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Format(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tier used when the host starts a run without choosing one
    pub speed_tier: SpeedTier,

    // === Visual Effects ===
    /// Camera shake on explosions/impacts
    pub screen_shake: bool,
    /// Slow-motion on impactful hits
    pub hit_stop: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no hit-stop)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_tier: SpeedTier::Pilot,
            screen_shake: true,
            hit_stop: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective hit-stop (respects reduced_motion)
    pub fn effective_hit_stop(&self) -> bool {
        self.hit_stop && !self.reduced_motion
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "neon-sky-settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file; a missing file yields defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_multipliers() {
        assert_eq!(SpeedTier::Recruit.multiplier(), 0.65);
        assert_eq!(SpeedTier::Pilot.multiplier(), 1.0);
        assert_eq!(SpeedTier::Ace.multiplier(), 1.4);
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!(SpeedTier::from_str("ACE"), Some(SpeedTier::Ace));
        assert_eq!(SpeedTier::from_str("recruit"), Some(SpeedTier::Recruit));
        assert_eq!(SpeedTier::from_str("ludicrous"), None);
    }

    #[test]
    fn test_reduced_motion_overrides_effects() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_hit_stop());
        assert!(Settings::default().effective_hit_stop());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "speed_tier": "Ace" }"#).expect("parse");
        assert_eq!(settings.speed_tier, SpeedTier::Ace);
        assert!(settings.screen_shake);
    }

    #[test]
    fn test_json_roundtrip_preserves_preferences() {
        let settings = Settings {
            speed_tier: SpeedTier::Recruit,
            screen_shake: false,
            ..Default::default()
        };
        let json = settings.to_json().expect("serialize");
        assert_eq!(Settings::from_json(&json).expect("parse"), settings);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "neon-sky-settings-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        assert_eq!(Settings::load_from(&path).expect("missing file"), Settings::default());

        let settings = Settings {
            speed_tier: SpeedTier::Ace,
            hit_stop: false,
            ..Default::default()
        };
        settings.save_to(&path).expect("save");
        assert_eq!(Settings::load_from(&path).expect("load"), settings);
        let _ = std::fs::remove_file(&path);
    }
}
