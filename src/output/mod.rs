//! Output backends for displaying the mapped video.

pub mod window_output;

pub use window_output::WindowRenderer;
