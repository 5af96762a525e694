//! Player preferences
//!
//! Stored inside the save record (`SaveData::settings`).

use serde::{Deserialize, Serialize};

/// User-facing toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Sound effects on/off
    pub sound_enabled: bool,
    /// Background music on/off
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

impl Settings {
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn toggle_music(&mut self) -> bool {
        self.music_enabled = !self.music_enabled;
        self.music_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(json, r#"{"soundEnabled":true,"musicEnabled":true}"#);
    }

    #[test]
    fn test_missing_fields_default_on() {
        let s: Settings = serde_json::from_str(r#"{"soundEnabled":false}"#).unwrap();
        assert!(!s.sound_enabled);
        assert!(s.music_enabled);
    }

    #[test]
    fn test_toggle() {
        let mut s = Settings::default();
        assert!(!s.toggle_sound());
        assert!(s.toggle_sound());
        assert!(!s.toggle_music());
    }
}
