//! Save/load for a running season.
//! MessagePack + LZ4 compression with versioning and integrity checks.

pub mod error;
pub mod format;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, SeasonSave};

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::league::SeasonPhase;
use crate::season::SeasonState;

pub const SAVE_VERSION: u32 = 1;

/// Writes the season atomically: a temp file is written and synced, then
/// renamed over `path`.
pub fn save_to_path(path: impl AsRef<Path>, config: &SimConfig, state: &SeasonState) -> Result<(), SaveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let data = serialize_and_compress(&SeasonSave::new(config.clone(), state.clone()))?;
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;

    log::debug!("Saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

/// Reads a save and checks that both the configuration and the season state
/// are consistent before handing them back.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SeasonSave, SaveError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SaveError::FileNotFound { path: path.display().to_string() });
    }

    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;
    let save = decompress_and_deserialize(&data)?;

    save.config.check().map_err(SimError::from)?;
    save.state.audit().map_err(SimError::from)?;

    log::debug!("Loaded {} bytes from {:?}", data.len(), path);
    Ok(save)
}

/// What a save file holds, for listings.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub version: u32,
    pub saved_at: u64,
    pub phase: SeasonPhase,
    pub matchday: u16,
    pub matchday_count: u16,
    pub teams: usize,
}

impl SaveInfo {
    pub fn from_save(save: &SeasonSave) -> Self {
        Self {
            version: save.version,
            saved_at: save.saved_at,
            phase: save.state.phase(),
            matchday: save.state.current_matchday(),
            matchday_count: save.state.calendar().matchday_count(),
            teams: save.state.teams().len(),
        }
    }

    pub fn format_timestamp(&self) -> String {
        let timestamp = OffsetDateTime::from_unix_timestamp_nanos(self.saved_at as i128 * 1_000_000)
            .unwrap_or_else(|_| OffsetDateTime::now_utc());
        timestamp.format(&Rfc3339).unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn display_text(&self) -> String {
        format!(
            "{:?}: matchday {}/{}, {} teams",
            self.phase, self.matchday, self.matchday_count, self.teams
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::state::test_support::setup;
    use crate::season::Season;
    use tempfile::TempDir;

    fn played(matchdays: usize) -> Season {
        let mut season = Season::new(SimConfig::default(), setup(4, 99)).unwrap();
        season.start().unwrap();
        for _ in 0..matchdays {
            season.advance_matchday().unwrap();
        }
        season
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("season.sav");
        let season = played(2);

        season.save_to_path(&path).unwrap();
        let loaded = Season::load_from_path(&path).unwrap();
        assert_eq!(loaded.state(), season.state());
        assert_eq!(loaded.config(), season.config());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("season.sav");
        save_to_path(&path, &SimConfig::default(), played(1).state()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_resumed_season_matches_uninterrupted_run() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("midseason.sav");

        let mut straight = played(3);
        straight.save_to_path(&path).unwrap();
        let mut resumed = Season::load_from_path(&path).unwrap();

        let a = straight.play_to_end().unwrap();
        let b = resumed.play_to_end().unwrap();
        assert_eq!(a, b);
        assert_eq!(straight.state(), resumed.state());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_from_path(temp_dir.path().join("nope.sav")).unwrap_err();
        assert!(matches!(err, SaveError::FileNotFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_inconsistent_state_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tampered.sav");
        let mut state = played(2).state().clone();
        state.teams[0].stats.points += 3;
        save_to_path(&path, &SimConfig::default(), &state).unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, SaveError::Invalid(SimError::Invariant(_))));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_save_info() {
        let save = SeasonSave::new(SimConfig::default(), played(2).state().clone());
        let info = SaveInfo::from_save(&save);
        assert_eq!(info.matchday, 2);
        assert_eq!(info.matchday_count, 6);
        assert_eq!(info.display_text(), "InProgress: matchday 2/6, 4 teams");
        assert!(info.format_timestamp().contains('T'));
    }
}
