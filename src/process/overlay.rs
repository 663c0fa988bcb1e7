//! Fixed overlay blended onto the top-left corner of every frame

use std::path::Path;
use std::sync::Arc;

use image::imageops::FilterType;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::saturate_u8;
use crate::{Frame, Result};

/// How overlay pixels combine with frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BlendMode {
    /// `frame * 1.0 + overlay * weight`, the transparency channel is not consulted
    Weighted { weight: f32 },
    /// Per-pixel alpha compositing, `frame * (1 - a) + overlay * a`
    Alpha,
}

impl Default for BlendMode {
    fn default() -> Self {
        BlendMode::Weighted { weight: 0.5 }
    }
}

/// Decoded overlay, immutable once loaded
#[derive(Debug, Clone)]
pub struct Overlay {
    image: RgbaImage,
}

impl Overlay {
    /// Decode `path`, resize it to exactly `size` and expand it to RGBA
    pub fn load(path: &Path, size: (u32, u32)) -> Result<Self> {
        let decoded = image::open(path)?;
        info!(
            "Loaded overlay {} ({}x{}), scaling to {}x{}",
            path.display(),
            decoded.width(),
            decoded.height(),
            size.0,
            size.1
        );
        let image = decoded
            .resize_exact(size.0, size.1, FilterType::Triangle)
            .to_rgba8();
        Ok(Self { image })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Blends a shared overlay onto frames of one fixed geometry
#[derive(Debug, Clone)]
pub struct OverlayCompositor {
    overlay: Option<Arc<Overlay>>,
    mode: BlendMode,
}

impl OverlayCompositor {
    /// Checks once that the overlay fits inside `frame_dims`; if it does not,
    /// compositing stays off for the whole run.
    pub fn new(overlay: Option<Arc<Overlay>>, frame_dims: (u32, u32), mode: BlendMode) -> Self {
        let overlay = overlay.filter(|overlay| {
            let (ow, oh) = overlay.dimensions();
            let fits = ow <= frame_dims.0 && oh <= frame_dims.1;
            if !fits {
                warn!(
                    "Overlay {}x{} does not fit {}x{} frames, compositing disabled",
                    ow, oh, frame_dims.0, frame_dims.1
                );
            }
            fits
        });

        Self { overlay, mode }
    }

    pub fn disabled() -> Self {
        Self {
            overlay: None,
            mode: BlendMode::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    pub fn composite(&self, frame: &mut Frame) {
        let Some(overlay) = &self.overlay else {
            return;
        };

        let target = &mut frame.image;
        for (x, y, src) in overlay.image().enumerate_pixels() {
            let dst = target.get_pixel_mut(x, y);
            let [r, g, b, a] = src.0;
            match self.mode {
                BlendMode::Weighted { weight } => {
                    for (d, s) in dst.0.iter_mut().zip([r, g, b]) {
                        *d = saturate_u8(*d as f32 + s as f32 * weight);
                    }
                }
                BlendMode::Alpha => {
                    let alpha = a as f32 / 255.0;
                    for (d, s) in dst.0.iter_mut().zip([r, g, b]) {
                        *d = saturate_u8(*d as f32 * (1.0 - alpha) + s as f32 * alpha);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba};

    fn frame(width: u32, height: u32, color: [u8; 3]) -> Frame {
        Frame::new(RgbImage::from_pixel(width, height, Rgb(color)), 1)
    }

    fn overlay(width: u32, height: u32, color: [u8; 4]) -> Option<Arc<Overlay>> {
        Some(Arc::new(Overlay::from_image(RgbaImage::from_pixel(
            width,
            height,
            Rgba(color),
        ))))
    }

    #[test]
    fn absent_overlay_is_a_noop() {
        let compositor = OverlayCompositor::new(None, (4, 4), BlendMode::default());
        let mut out = frame(4, 4, [10, 20, 30]);
        let before = out.image.clone();
        compositor.composite(&mut out);
        assert!(!compositor.is_enabled());
        assert_eq!(out.image, before);
    }

    #[test]
    fn weighted_sum_law() {
        let compositor = OverlayCompositor::new(
            overlay(2, 2, [50, 100, 254, 0]),
            (4, 3),
            BlendMode::default(),
        );
        let mut out = frame(4, 3, [100, 100, 100]);
        compositor.composite(&mut out);

        for (x, y, px) in out.image.enumerate_pixels() {
            if x < 2 && y < 2 {
                // alpha 0 is ignored by the weighted blend
                assert_eq!(px.0, [125, 150, 227], "inside at ({x}, {y})");
            } else {
                assert_eq!(px.0, [100, 100, 100], "outside at ({x}, {y})");
            }
        }
    }

    #[test]
    fn weighted_sum_saturates() {
        let compositor = OverlayCompositor::new(
            overlay(1, 1, [255, 255, 255, 255]),
            (1, 1),
            BlendMode::default(),
        );
        let mut out = frame(1, 1, [200, 128, 0]);
        compositor.composite(&mut out);
        assert_eq!(out.image.get_pixel(0, 0).0, [255, 255, 128]);
    }

    #[test]
    fn oversized_overlay_disables_compositing() {
        let compositor = OverlayCompositor::new(
            overlay(5, 2, [255, 0, 0, 255]),
            (4, 4),
            BlendMode::default(),
        );
        assert!(!compositor.is_enabled());

        let mut out = frame(4, 4, [1, 2, 3]);
        compositor.composite(&mut out);
        assert!(out.image.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn alpha_mode_consults_transparency() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([200, 200, 200, 255]));
        image.put_pixel(1, 0, Rgba([200, 200, 200, 0]));
        let compositor = OverlayCompositor::new(
            Some(Arc::new(Overlay::from_image(image))),
            (2, 1),
            BlendMode::Alpha,
        );
        let mut out = frame(2, 1, [40, 40, 40]);
        compositor.composite(&mut out);
        assert_eq!(out.image.get_pixel(0, 0).0, [200, 200, 200]);
        assert_eq!(out.image.get_pixel(1, 0).0, [40, 40, 40]);
    }

    #[test]
    fn load_resizes_and_adds_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        RgbImage::from_pixel(40, 24, Rgb([9, 90, 200]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let overlay = Overlay::load(&path, (80, 48)).unwrap();
        assert_eq!(overlay.dimensions(), (80, 48));
        let px = overlay.image().get_pixel(10, 10).0;
        for (got, want) in px.iter().zip([9u8, 90, 200, 255]) {
            assert!(got.abs_diff(want) <= 1, "{px:?}");
        }
    }

    #[test]
    fn missing_asset_is_an_error() {
        assert!(Overlay::load(Path::new("/nonexistent/overlay.png"), (800, 480)).is_err());
    }
}
