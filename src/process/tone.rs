use image::RgbImage;

use super::saturate_u8;
use crate::{Frame, ToneParameters};

/// `out = in * contrast/50 + brightness`, saturated, into a new frame.
/// The captured frame is left untouched.
pub fn apply(frame: &Frame, params: ToneParameters) -> Frame {
    let mut image = frame.image.clone();
    apply_in_place(&mut image, params);
    frame.with_image(image)
}

pub fn apply_in_place(image: &mut RgbImage, params: ToneParameters) {
    if params.is_identity() {
        return;
    }

    let scale = params.contrast_scale();
    let offset = params.brightness_offset();

    // Only 256 possible inputs per channel
    let mut lut = [0u8; 256];
    for (value, out) in lut.iter_mut().enumerate() {
        *out = saturate_u8(value as f32 * scale + offset);
    }

    for channel in image.iter_mut() {
        *channel = lut[*channel as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient() -> Frame {
        let image = RgbImage::from_fn(16, 16, |x, y| {
            let v = (y * 16 + x) as u8;
            Rgb([v, 255 - v, v / 2])
        });
        Frame::new(image, 1)
    }

    #[test]
    fn neutral_parameters_are_identity() {
        let frame = gradient();
        let out = apply(&frame, ToneParameters::default());
        assert_eq!(out.image, frame.image);
    }

    #[test]
    fn extreme_parameters_saturate() {
        let frame = gradient();

        let out = apply(&frame, ToneParameters::new(1000, 1000));
        assert!(out.image.iter().all(|&c| c == 255));

        let out = apply(&frame, ToneParameters::new(-1000, 50));
        assert!(out.image.iter().all(|&c| c == 0));

        let out = apply(&frame, ToneParameters::new(0, 0));
        assert!(out.image.iter().all(|&c| c == 0));

        // steep curve pushes both ends out of range
        let out = apply(&frame, ToneParameters::new(-1000, 1000));
        assert_eq!(out.image.get_pixel(0, 0).0, [0, 255, 0]);

        // negative contrast inverts into the clamp floor
        let out = apply(&frame, ToneParameters::new(0, -50));
        assert!(out.image.iter().all(|&c| c == 0));
    }

    #[test]
    fn contrast_and_brightness_arithmetic() {
        let frame = Frame::new(RgbImage::from_pixel(2, 2, Rgb([100, 10, 200])), 1);

        let out = apply(&frame, ToneParameters::new(0, 100));
        assert_eq!(out.image.get_pixel(0, 0).0, [200, 20, 255]);

        let out = apply(&frame, ToneParameters::new(-20, 25));
        assert_eq!(out.image.get_pixel(1, 1).0, [30, 0, 80]);

        let out = apply(&frame, ToneParameters::new(5, 75));
        assert_eq!(out.image.get_pixel(1, 0).0, [155, 20, 255]);
    }

    #[test]
    fn source_frame_is_not_mutated() {
        let frame = gradient();
        let before = frame.image.clone();
        let out = apply(&frame, ToneParameters::new(40, 90));
        assert_eq!(frame.image, before);
        assert_ne!(out.image, before);
        assert_eq!(out.sequence, frame.sequence);
    }
}
