//! Decoded frame handed through the processing pipeline

use std::time::Instant;

use image::RgbImage;

/// One captured image: 3 channels, 8 bits per channel, geometry fixed by the device
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub sequence: u64,
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self {
            image,
            sequence,
            captured_at: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Same metadata, different pixels
    pub fn with_image(&self, image: RgbImage) -> Self {
        Self {
            image,
            sequence: self.sequence,
            captured_at: self.captured_at,
        }
    }
}
