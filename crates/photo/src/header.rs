//! Fixed-size asset headers shared by photos and object images.

use std::fmt;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};

use crate::error::{PhotoError, Result};

pub const MAX_PHOTO_WIDTH: u16 = 1024;
pub const MAX_PHOTO_HEIGHT: u16 = 1024;
pub const MAX_OBJECT_WIDTH: u16 = 160;
pub const MAX_OBJECT_HEIGHT: u16 = 100;

/// Which asset format a header belongs to; each has its own size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    /// 5:6:5 true-color room photo
    Photo,
    /// Pre-indexed object image (2:2:2 colors plus transparency)
    Object,
}

impl AssetKind {
    /// Largest accepted (width, height).
    pub fn max_dimensions(self) -> (u16, u16) {
        match self {
            AssetKind::Photo => (MAX_PHOTO_WIDTH, MAX_PHOTO_HEIGHT),
            AssetKind::Object => (MAX_OBJECT_WIDTH, MAX_OBJECT_HEIGHT),
        }
    }

    /// Bytes per pixel in the file format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            AssetKind::Photo => 2,
            AssetKind::Object => 1,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Photo => write!(f, "photo"),
            AssetKind::Object => write!(f, "object image"),
        }
    }
}

/// Width and height, stored as two little-endian `u16` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHeader {
    pub width: u16,
    pub height: u16,
}

impl AssetHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 4;

    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut bytes = [0u8; Self::SIZE];
        reader.read_exact(&mut bytes)?;
        Ok(Self {
            width: u16::from_le_bytes([bytes[0], bytes[1]]),
            height: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let [w0, w1] = self.width.to_le_bytes();
        let [h0, h1] = self.height.to_le_bytes();
        [w0, w1, h0, h1]
    }

    /// Check the dimensions against the limits for `kind`.
    pub fn validate(self, kind: AssetKind) -> Result<Self> {
        let (max_width, max_height) = kind.max_dimensions();
        if self.width > max_width || self.height > max_height {
            return Err(PhotoError::Validation {
                kind,
                width: self.width,
                height: self.height,
                max_width,
                max_height,
            });
        }
        Ok(self)
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_is_little_endian() {
        let mut cursor = Cursor::new(vec![0x40, 0x01, 0xB6, 0x00]);
        let header = AssetHeader::read_from(&mut cursor).unwrap();
        assert_eq!(header, AssetHeader::new(320, 182));
        assert_eq!(header.to_bytes(), [0x40, 0x01, 0xB6, 0x00]);
        assert_eq!(header.pixel_count(), 320 * 182);
    }

    #[test]
    fn test_short_header_is_io_error() {
        let mut cursor = Cursor::new(vec![0x40, 0x01, 0xB6]);
        let err = AssetHeader::read_from(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_validate_limits_per_kind() {
        assert!(AssetHeader::new(1024, 1024).validate(AssetKind::Photo).is_ok());
        assert!(AssetHeader::new(160, 100).validate(AssetKind::Object).is_ok());
        assert!(AssetHeader::new(0, 0).validate(AssetKind::Object).is_ok());

        let err = AssetHeader::new(161, 10).validate(AssetKind::Object).unwrap_err();
        assert!(matches!(
            err,
            PhotoError::Validation {
                kind: AssetKind::Object,
                width: 161,
                max_width: 160,
                ..
            }
        ));

        let err = AssetHeader::new(10, 1025).validate(AssetKind::Photo).unwrap_err();
        assert_eq!(
            err.to_string(),
            "photo is 10x1025, larger than the 1024x1024 maximum"
        );
    }
}
