//! SDL2 Window Display Module
//! Provides functionality to create an SDL2 window and display video frames.
//! Uses the sdl2 crate for window management and rendering.

use std::time::{Duration, Instant};

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use tracing::{info, instrument};

use super::{FrameSink, KeyCode, ESCAPE_KEY};
use crate::{DisplayConfig, Error, Frame, Result};

/// SDL2 Window Display
/// Handles window creation, keyboard polling, and frame rendering.
pub struct Sdl2Display {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
    _sdl: sdl2::Sdl,
}

impl Sdl2Display {
    #[instrument(skip(config), fields(title = %config.title))]
    pub fn new(config: &DisplayConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::display)?;
        let video_subsystem = sdl.video().map_err(Error::display)?;

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .position_centered()
            .build()
            .map_err(Error::display)?;

        let mut canvas_builder = window.into_canvas();
        if config.vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(Error::display)?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl.event_pump().map_err(Error::display)?;

        info!("Display window {}x{} ready", config.width, config.height);

        Ok(Self {
            canvas,
            texture_creator,
            event_pump,
            _sdl: sdl,
        })
    }
}

/// Map an SDL key to the value the pipeline understands
fn key_value(keycode: Keycode) -> Option<KeyCode> {
    if keycode == Keycode::Escape {
        return Some(ESCAPE_KEY);
    }
    let name = keycode.name();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Some(c.to_ascii_lowercase() as KeyCode),
        _ => None,
    }
}

impl FrameSink for Sdl2Display {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let (width, height) = frame.dimensions();

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
            .map_err(Error::display)?;

        texture
            .update(None, frame.image.as_raw(), (width * 3) as usize)
            .map_err(Error::display)?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(Error::display)?;

        self.canvas.present();
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(event) = self
                .event_pump
                .wait_event_timeout(remaining.as_millis() as u32)
            else {
                return Ok(None);
            };

            match event {
                Event::Quit { .. } => {
                    info!("Quit event received");
                    return Ok(Some(ESCAPE_KEY));
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(key) = key_value(keycode) {
                        return Ok(Some(key));
                    }
                }
                _ => {}
            }

            if remaining.is_zero() {
                return Ok(None);
            }
        }
    }
}

impl Drop for Sdl2Display {
    fn drop(&mut self) {
        info!("Closing display window");
    }
}
