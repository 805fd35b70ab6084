pub mod v4l2;

use crate::common::Result;
use image::RgbImage;

pub use v4l2::{Camera, DeviceInfo};

/// One captured colour image. Rectangles are drawn onto it in place.
pub type Frame = RgbImage;

/// Anything the main loop can pull frames from.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Frame>;

    /// Give the device back. Must be safe to call more than once.
    fn release(&mut self);
}
