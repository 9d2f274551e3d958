//! Clock persistence.
//!
//! Only hours, minutes and days survive a save. Pause state, the frame
//! accumulator and the configuration are rebuilt from settings on load.

use std::fs;
use std::io::Write;
use std::path::Path;

use gloaming_common::{GloamingError, HeaderError, SaveFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during save/load operations.
#[derive(Debug, Error)]
pub enum SaveError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Not a clock save, or one from an incompatible version
    #[error(transparent)]
    Header(#[from] HeaderError),

    /// Save file corrupted
    #[error("Save file corrupted: {0}")]
    Corrupted(String),
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

impl From<SaveError> for GloamingError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Io(e) => Self::Io(e),
            other => Self::Serialization(other.to_string()),
        }
    }
}

/// Persisted clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSave {
    /// Hours (0-23)
    pub hours: i32,
    /// Raw minutes (0-59)
    pub minutes: i32,
    /// Day count (1+)
    pub days: i64,
}

impl Default for ClockSave {
    fn default() -> Self {
        Self::new(0, 0, 1)
    }
}

impl ClockSave {
    /// Creates save data for the given time.
    #[must_use]
    pub const fn new(hours: i32, minutes: i32, days: i64) -> Self {
        Self {
            hours,
            minutes,
            days,
        }
    }

    /// Serializes to the clock save format: header, then bincode.
    pub fn to_bytes(&self) -> SaveResult<Vec<u8>> {
        let mut buffer = SaveFormat::CLOCK.header();
        let data = bincode::serialize(self).map_err(|e| SaveError::Serialization(e.to_string()))?;
        buffer.extend(data);

        Ok(buffer)
    }

    /// Deserializes from binary format.
    pub fn from_bytes(bytes: &[u8]) -> SaveResult<Self> {
        let payload = SaveFormat::CLOCK.payload(bytes)?;
        bincode::deserialize(payload).map_err(|e| SaveError::Corrupted(e.to_string()))
    }

    /// Writes to disk through a temporary file and a rename.
    pub fn save_to(&self, path: &Path) -> SaveResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = self.to_bytes()?;
        let temp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Reads from disk.
    pub fn load_from(path: &Path) -> SaveResult<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_start_with_magic() {
        let save = ClockSave::new(18, 42, 12);
        let bytes = save.to_bytes().expect("serialization should succeed");

        assert_eq!(&bytes[..SaveFormat::HEADER_LEN], &SaveFormat::CLOCK.header()[..]);
        let loaded = ClockSave::from_bytes(&bytes).expect("deserialization should succeed");
        assert_eq!(loaded, save);
    }

    #[test]
    fn test_save_error_converts() {
        let err: GloamingError = SaveError::Header(HeaderError::WrongMagic("clock")).into();
        assert!(matches!(err, GloamingError::Serialization(_)));

        let missing = ClockSave::load_from(Path::new("/nonexistent/clock.sav"))
            .map_err(GloamingError::from);
        assert!(matches!(missing, Err(GloamingError::Io(_))));
    }

    #[test]
    fn test_invalid_magic() {
        let result = ClockSave::from_bytes(b"NOPE1234");
        assert!(matches!(
            result,
            Err(SaveError::Header(HeaderError::WrongMagic("clock")))
        ));
    }

    #[test]
    fn test_truncated_data() {
        let result = ClockSave::from_bytes(&SaveFormat::CLOCK.header());
        assert!(matches!(result, Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_future_major_version_rejected() {
        let mut bytes = ClockSave::new(1, 2, 3)
            .to_bytes()
            .expect("serialization should succeed");
        bytes[4..6].copy_from_slice(&2u16.to_le_bytes());

        let result = ClockSave::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(SaveError::Header(HeaderError::Unsupported { .. }))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("saves").join("clock.sav");
        let save = ClockSave::new(6, 30, 4);

        save.save_to(&path).expect("save");
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = ClockSave::load_from(&path).expect("load");
        assert_eq!(loaded, save);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = ClockSave::load_from(&dir.path().join("missing.sav"));
        assert!(matches!(result, Err(SaveError::Io(_))));
    }
}
