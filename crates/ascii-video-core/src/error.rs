//! Error types for the ASCII video server.

use std::path::PathBuf;

use thiserror::Error;

use crate::Dimensions;

/// Main error type for ASCII video operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Animation directory or frame file does not exist
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// A single source frame could not be decoded
    #[error("Frame decode error: {0}")]
    Decode(String),

    /// Video/image source could not be opened or probed
    #[error("Source error: {0}")]
    Source(String),

    /// Invalid grid dimensions
    #[error("Invalid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Number of rows
        rows: u32,
        /// Number of columns
        cols: u32,
    },

    /// An animation was assembled from zero frames
    #[error("Animation '{0}' has no frames")]
    EmptyAnimation(String),

    /// A frame's grid size differs from the rest of its animation
    #[error("Frame {index} is {found}, expected {expected}")]
    FrameSizeMismatch {
        /// Position of the offending frame
        index: usize,
        /// Size of the first frame
        expected: Dimensions,
        /// Size of the offending frame
        found: Dimensions,
    },

    /// Malformed HTTP request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
