pub mod decoder;
pub mod frame;
pub mod v4l2;

pub use frame::{PixelFormat, RawFrame};
pub use v4l2::V4l2Capture;

use crate::{Frame, Result};

/// Anything that yields decoded frames of a fixed geometry.
///
/// Dropping a source releases the underlying device.
pub trait FrameSource {
    fn is_opened(&self) -> bool;

    /// `(width, height)` of every frame this source produces
    fn geometry(&self) -> (u32, u32);

    /// Pull one frame, blocking until the device delivers it
    fn read(&mut self) -> Result<Frame>;
}
