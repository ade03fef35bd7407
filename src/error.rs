//! Error types raised while loading a map.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the map loader and the map facade.
///
/// Render-time data defects (missing texture, bad animation reference) are
/// never errors: the offending tile is skipped and counted in
/// [`FrameStats`](crate::FrameStats).
#[derive(Debug, Error)]
pub enum MapError {
    /// A map or tileset file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A map or tileset file is not valid Tiled JSON.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Structurally invalid map (wrong file type, bad reference, ...).
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// The map declares no tilesets.
    #[error("map declares no tilesets")]
    NoTilesets,

    /// A layer (or chunk) data length does not match its declared size.
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    InvalidLayerSize {
        /// Layer name.
        layer: String,
        /// `width * height`.
        expected: usize,
        /// Actual number of decoded ids.
        actual: usize,
    },

    /// Layer data uses an encoding or compression this loader does not read.
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'")]
    UnsupportedEncoding {
        /// Layer name.
        layer: String,
        /// Encoding or compression name.
        encoding: String,
    },

    /// Base64 layer data could not be decoded.
    #[error("layer '{layer}' has malformed base64 data: {source}")]
    Base64 {
        /// Layer name.
        layer: String,
        /// Underlying error.
        source: base64::DecodeError,
    },

    /// A tileset has no image reference (e.g. an image-collection tileset).
    #[error("tileset '{tileset}' has no image")]
    MissingImage {
        /// Tileset name.
        tileset: String,
    },

    /// The drawing backend could not open or decode a tileset image.
    #[error("failed to load image {path}: {reason}")]
    ImageLoad {
        /// Resolved image path.
        path: PathBuf,
        /// Backend-provided reason.
        reason: String,
    },
}

impl MapError {
    /// True for failures of the map description itself, as opposed to
    /// tileset image problems.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, MapError::MissingImage { .. } | MapError::ImageLoad { .. })
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, MapError>;
