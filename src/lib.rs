//! Videomap: video texture material for projection mapping
//!
//! Blends a video texture with a placeholder color on the GPU, tracks the
//! application mode, and defines the pins used to align video to a surface.

pub mod config;
pub mod config_watcher;
pub mod error;
pub mod frame;
pub mod gpu_context;
pub mod material;
pub mod mode;
pub mod output;
pub mod pin;
pub mod shader;
pub mod texture;

pub use error::{Error, Result};
pub use material::{MaterialOptions, VideoTextureMaterial};
pub use mode::{Mode, ModeStore};
pub use pin::{Pin, PinId, PinSet};
