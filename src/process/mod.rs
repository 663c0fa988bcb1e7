//! Per-frame image processing stages

pub mod annotate;
pub mod fps;
pub mod overlay;
pub mod tone;

/// Round to nearest and saturate into the 8-bit channel range
#[inline]
pub(crate) fn saturate_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
