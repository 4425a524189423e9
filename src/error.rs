//! Error types for loading audio assets

use std::path::PathBuf;

/// Why an asset could not be turned into a playable buffer.
///
/// None of these are fatal: the track that needed the asset stays silent and
/// the next slot update retries.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// No file for this asset in the bundle directory
    #[error("audio asset not found: {0}")]
    NotFound(PathBuf),

    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but is not decodable PCM
    #[error("decode error: {0}")]
    Decode(#[from] hound::Error),

    /// The file decoded fine but cannot be played in the graph's format
    #[error("format conversion failed: {0}")]
    Conversion(String),

    /// Decoded to zero frames, nothing to loop
    #[error("audio asset has no frames: {0}")]
    Empty(PathBuf),
}

/// Result type for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;
