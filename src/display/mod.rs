pub mod display;

pub use display::Sdl2Display;

use std::time::Duration;

use crate::{Frame, Result};

/// Key value as delivered by the display, ASCII for printable keys
pub type KeyCode = i32;

/// The designated exit trigger
pub const ESCAPE_KEY: KeyCode = 27;

/// Consumes finished frames and reports key presses.
///
/// Dropping a sink releases its window resources.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Wait at most `timeout` for a key press
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>>;
}
