//! Error type for the library side of videomap.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Frame is {got_width}x{got_height}, texture expects {width}x{height}")]
    FrameSizeMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("Texture size {width}x{height} is outside 1..={max}")]
    InvalidTextureSize { width: u32, height: u32, max: u32 },

    #[error("Frame data is {len} bytes, too short for {width}x{height} RGBA")]
    FrameDataLength { width: u32, height: u32, len: usize },

    #[error("Unknown mode '{0}', expected exhibition, map or setup")]
    UnknownMode(String),

    #[error("Pin '{0}' already exists")]
    DuplicatePin(String),

    #[error("No pin with id '{0}'")]
    UnknownPin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
