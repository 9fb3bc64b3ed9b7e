//! Spatial algebra: transforms and coordinate frames

pub mod frames;
pub mod transform;

pub use frames::{FrameError, FrameId, FrameTree, MAX_FRAME_DEPTH};
pub use transform::Transform;
