//! Media Module
//!
//! Upload format validation, duration probing, and ffmpeg-based segmentation.

mod format;
mod probe;
mod segment;

pub use format::*;
pub use probe::*;
pub use segment::*;
