use std::path::PathBuf;

use thiserror::Error;

use crate::header::AssetKind;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("{kind} is {width}x{height}, larger than the {max_width}x{max_height} maximum")]
    Validation {
        kind: AssetKind,
        width: u16,
        height: u16,
        max_width: u16,
        max_height: u16,
    },
    #[error("{kind} expects {expected} pixels, got {actual}")]
    PixelCount {
        kind: AssetKind,
        expected: usize,
        actual: usize,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not allocate {bytes} bytes of pixel storage")]
    Allocation { bytes: usize },
    #[error("invalid room manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("{}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: Box<PhotoError>,
    },
    #[error("unknown room: {0}")]
    UnknownRoom(String),
    #[error("unknown image id {0}")]
    UnknownImage(usize),
    #[error("no room has been bound")]
    NoRoomBound,
}

pub type Result<T> = std::result::Result<T, PhotoError>;
