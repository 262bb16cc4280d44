// src/utils/error.rs

use thiserror::Error;

/// The error type for every fallible operation in the codec.
///
/// Malformed encoded data always ends up here; broken internal invariants
/// (buffer geometry, cursor arithmetic) are debug assertions instead.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    #[error("Truncated input: needed {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Not a tilewave stream (bad magic {0:?})")]
    BadMagic([u8; 4]),

    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown wavelet id {0}")]
    UnknownWavelet(u8),

    #[error("Unknown edge policy id {0}")]
    UnknownEdgePolicy(u8),

    #[error("Invalid frame header: {0}")]
    InvalidHeader(String),

    #[error("Corrupt tile {tile}: {reason}")]
    CorruptTile { tile: usize, reason: String },
}

impl CodecError {
    pub(crate) fn corrupt(tile: usize, reason: impl Into<String>) -> Self {
        CodecError::CorruptTile {
            tile,
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
