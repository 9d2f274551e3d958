//! Save file headers.
//!
//! A save file is four magic bytes, the format version as two little-endian
//! `u16` (major, minor) and then the payload. A reader accepts every minor
//! version of its own major version.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version of a save format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Bumped when old readers can no longer decode the payload
    pub major: u16,
    /// Bumped for additions old readers can skip
    pub minor: u16,
}

impl FormatVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Whether a reader at this version can decode data written at `found`.
    #[must_use]
    pub const fn can_read(self, found: Self) -> bool {
        self.major == found.major
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A save file whose header does not fit the expected format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Too short, or another file type
    #[error("not a {0} save")]
    WrongMagic(&'static str),

    /// Written by an incompatible version
    #[error("{name} save version {found} cannot be read by version {expected}")]
    Unsupported {
        /// Format name
        name: &'static str,
        /// Version of this reader
        expected: FormatVersion,
        /// Version found in the file
        found: FormatVersion,
    },
}

/// Header layout of one kind of save file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveFormat {
    name: &'static str,
    magic: [u8; 4],
    version: FormatVersion,
}

impl SaveFormat {
    /// Header size in bytes.
    pub const HEADER_LEN: usize = 8;

    /// Clock time (`clock.sav`).
    pub const CLOCK: Self = Self::new("clock", *b"GLCK", FormatVersion::new(1, 0));

    /// Customized map lighting (`lighting.sav`).
    pub const LIGHTING: Self = Self::new("lighting", *b"GLLT", FormatVersion::new(1, 0));

    /// Describes a format.
    #[must_use]
    pub const fn new(name: &'static str, magic: [u8; 4], version: FormatVersion) -> Self {
        Self {
            name,
            magic,
            version,
        }
    }

    /// Format name used in errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Version written by [`SaveFormat::header`].
    #[must_use]
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// A buffer holding just the header, ready for the payload.
    #[must_use]
    pub fn header(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::HEADER_LEN);
        buffer.extend_from_slice(&self.magic);
        buffer.extend_from_slice(&self.version.major.to_le_bytes());
        buffer.extend_from_slice(&self.version.minor.to_le_bytes());
        buffer
    }

    /// Checks the header of `bytes` and returns the payload after it.
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], HeaderError> {
        if bytes.len() < Self::HEADER_LEN || bytes[..4] != self.magic {
            return Err(HeaderError::WrongMagic(self.name));
        }
        let found = FormatVersion::new(
            u16::from_le_bytes([bytes[4], bytes[5]]),
            u16::from_le_bytes([bytes[6], bytes[7]]),
        );
        if !self.version.can_read(found) {
            return Err(HeaderError::Unsupported {
                name: self.name,
                expected: self.version,
                found,
            });
        }
        Ok(&bytes[Self::HEADER_LEN..])
    }
}
