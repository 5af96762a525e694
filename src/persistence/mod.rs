//! Save record persistence
//!
//! Features:
//! - Versioned JSON envelope `{ "version": n, "data": {...} }`
//! - Bare (pre-envelope) records are migrated on load
//! - Missing or corrupt data falls back to the default record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::platform::storage::Storage;
use crate::settings::Settings;

/// Storage key of the save record
pub const SAVE_KEY: &str = "otter_run_save";

/// Current envelope version
pub const SAVE_VERSION: u32 = 1;

/// Everything that survives between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub high_score: u64,
    pub total_games_played: u32,
    /// Unlocked achievement ids
    pub achievements: BTreeSet<String>,
    pub settings: Settings,
}

impl SaveData {
    /// Fold a finished run into the record. Returns true on a new best.
    pub fn record_run(&mut self, score: u64) -> bool {
        self.total_games_played += 1;
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    data: &'a SaveData,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    data: SaveData,
}

/// Save record load/save over a storage backend
pub struct SaveStore {
    storage: Box<dyn Storage>,
    key: String,
}

impl SaveStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self::with_key(storage, SAVE_KEY)
    }

    pub fn with_key(storage: Box<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Load the record, reporting why it could not be read
    pub fn try_load(&self) -> Result<Option<SaveData>, StorageError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        decode(&raw).map(Some)
    }

    /// Load the record; anything unreadable yields the default
    pub fn load(&self) -> SaveData {
        match self.try_load() {
            Ok(Some(data)) => {
                log::info!(
                    "Loaded save: best={} games={}",
                    data.high_score,
                    data.total_games_played
                );
                data
            }
            Ok(None) => {
                log::info!("No save found, starting fresh");
                SaveData::default()
            }
            Err(e) => {
                log::warn!("Save unreadable ({}), using defaults", e);
                SaveData::default()
            }
        }
    }

    pub fn save(&mut self, data: &SaveData) -> Result<(), StorageError> {
        let json = serde_json::to_string(&EnvelopeRef {
            version: SAVE_VERSION,
            data,
        })?;
        self.storage.set(&self.key, &json)?;
        log::info!("Saved: best={} games={}", data.high_score, data.total_games_played);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }
}

fn decode(raw: &str) -> Result<SaveData, StorageError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value.get("version").and_then(|v| v.as_u64()) {
        Some(version) if version == SAVE_VERSION as u64 => {
            let envelope: Envelope = serde_json::from_value(value)?;
            Ok(envelope.data)
        }
        Some(version) => Err(StorageError::UnsupportedVersion {
            found: u32::try_from(version).unwrap_or(u32::MAX),
            expected: SAVE_VERSION,
        }),
        None => {
            log::info!("Migrating unversioned save record");
            Ok(serde_json::from_value(value)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStorage;

    fn sample() -> SaveData {
        SaveData {
            high_score: 4200,
            total_games_played: 7,
            achievements: ["first_run".to_string(), "coins_50".to_string()]
                .into_iter()
                .collect(),
            settings: Settings {
                sound_enabled: false,
                music_enabled: true,
            },
        }
    }

    #[test]
    fn test_save_then_load() {
        let mem = MemoryStorage::new();
        let mut store = SaveStore::new(Box::new(mem.clone()));
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
        // A second store over the same backend sees it too
        assert_eq!(SaveStore::new(Box::new(mem)).load(), sample());
    }

    #[test]
    fn test_empty_storage_gives_default() {
        let store = SaveStore::new(Box::new(MemoryStorage::new()));
        assert_eq!(store.try_load().unwrap(), None);
        assert_eq!(store.load(), SaveData::default());
    }

    #[test]
    fn test_corrupt_record_gives_default() {
        let mut mem = MemoryStorage::new();
        mem.set(SAVE_KEY, "{not json").unwrap();
        let store = SaveStore::new(Box::new(mem));
        assert!(store.try_load().is_err());
        assert_eq!(store.load(), SaveData::default());
    }

    #[test]
    fn test_unknown_version_gives_default() {
        let mut mem = MemoryStorage::new();
        mem.set(SAVE_KEY, r#"{"version":99,"data":{"highScore":5}}"#)
            .unwrap();
        let store = SaveStore::new(Box::new(mem));
        assert!(matches!(
            store.try_load(),
            Err(StorageError::UnsupportedVersion { found: 99, .. })
        ));
        assert_eq!(store.load(), SaveData::default());
    }

    #[test]
    fn test_bare_record_is_migrated() {
        let mut mem = MemoryStorage::new();
        mem.set(
            SAVE_KEY,
            r#"{"highScore":120,"totalGamesPlayed":3,"achievements":["first_run"]}"#,
        )
        .unwrap();
        let data = SaveStore::new(Box::new(mem)).load();
        assert_eq!(data.high_score, 120);
        assert_eq!(data.total_games_played, 3);
        assert!(data.achievements.contains("first_run"));
        assert_eq!(data.settings, Settings::default());
    }

    #[test]
    fn test_record_run() {
        let mut data = SaveData::default();
        assert!(data.record_run(100));
        assert!(!data.record_run(50));
        assert!(!data.record_run(100));
        assert_eq!(data.high_score, 100);
        assert_eq!(data.total_games_played, 3);
    }
}
