use image::RgbImage;
use jpeg_decoder::{Decoder, PixelFormat as JpegPixelFormat};

use super::frame::{PixelFormat, RawFrame};
use crate::{Error, Result};

/// Decode a raw device packet into an RGB24 image of the frame's geometry
pub fn decode_frame(raw: &RawFrame) -> Result<RgbImage> {
    let meta = &raw.meta;
    let pixels = match meta.format {
        PixelFormat::Mjpeg => return decode_mjpeg(raw),
        PixelFormat::Rgb24 => packed(raw, 3)?.to_vec(),
        PixelFormat::Bgr24 => {
            let mut rgb = packed(raw, 3)?.to_vec();
            for px in rgb.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            rgb
        }
        PixelFormat::Yuyv4 => yuyv_to_rgb(packed(raw, 2)?),
    };

    RgbImage::from_raw(meta.width, meta.height, pixels)
        .ok_or_else(|| Error::Decode("buffer does not match frame geometry".into()))
}

/// The packed pixel payload, without any trailing driver padding
fn packed(raw: &RawFrame, bytes_per_pixel: usize) -> Result<&[u8]> {
    let len = raw.meta.width as usize * raw.meta.height as usize * bytes_per_pixel;
    raw.data.get(..len).ok_or_else(|| {
        Error::Decode(format!(
            "{:?} buffer holds {} bytes, expected {}",
            raw.meta.format,
            raw.data.len(),
            len
        ))
    })
}

/// Decoded size must equal the negotiated geometry; frames of any other size
/// would break the overlay fit checked at startup.
fn decode_mjpeg(raw: &RawFrame) -> Result<RgbImage> {
    let mut decoder = Decoder::new(&raw.data[..]);
    let pixels = decoder.decode().map_err(|e| Error::Decode(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| Error::Decode("missing JPEG header".into()))?;

    let decoded = (info.width as u32, info.height as u32);
    if decoded != (raw.meta.width, raw.meta.height) {
        return Err(Error::Decode(format!(
            "JPEG is {}x{}, stream negotiated {}x{}",
            decoded.0, decoded.1, raw.meta.width, raw.meta.height
        )));
    }

    let rgb = match info.pixel_format {
        JpegPixelFormat::RGB24 => pixels,
        JpegPixelFormat::L8 => pixels.iter().flat_map(|&l| [l, l, l]).collect(),
        other => return Err(Error::Decode(format!("unsupported JPEG layout {:?}", other))),
    };

    RgbImage::from_raw(decoded.0, decoded.1, rgb)
        .ok_or_else(|| Error::Decode("JPEG payload shorter than its header".into()))
}

/// BT.601 limited-range YUYV 4:2:2 to RGB24
pub fn yuyv_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 2 * 3);
    for chunk in data.chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&yuv_pixel(y0, u, v));
        rgb.extend_from_slice(&yuv_pixel(y1, u, v));
    }
    rgb
}

fn yuv_pixel(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    let clip = |x: i32| (x >> 8).clamp(0, 255) as u8;
    [
        clip(298 * c + 409 * e + 128),
        clip(298 * c - 100 * d - 208 * e + 128),
        clip(298 * c + 516 * d + 128),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::FrameMetadata;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Instant;

    fn raw(format: PixelFormat, width: u32, height: u32, data: Vec<u8>) -> RawFrame {
        RawFrame {
            data: Bytes::from(data),
            meta: Arc::new(FrameMetadata {
                sequence: 1,
                width,
                height,
                format,
            }),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn bgr_is_swizzled_to_rgb() {
        let img = decode_frame(&raw(PixelFormat::Bgr24, 1, 1, vec![1, 2, 3])).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [3, 2, 1]);
    }

    #[test]
    fn yuyv_black_and_white() {
        // two pixels share chroma; y=16 is black, y=235 is white
        let img = decode_frame(&raw(PixelFormat::Yuyv4, 2, 1, vec![16, 128, 235, 128])).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn short_buffer_is_a_decode_error() {
        assert!(decode_frame(&raw(PixelFormat::Rgb24, 2, 2, vec![0; 12])).is_ok());
        let err = decode_frame(&raw(PixelFormat::Rgb24, 3, 2, vec![0; 12]));
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, image::Rgb([120, 60, 30]))
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn mjpeg_of_negotiated_size_decodes() {
        let img = decode_frame(&raw(PixelFormat::Mjpeg, 16, 16, jpeg(16, 16))).unwrap();
        assert_eq!(img.dimensions(), (16, 16));
    }

    #[test]
    fn mjpeg_of_other_size_is_a_decode_error() {
        let err = decode_frame(&raw(PixelFormat::Mjpeg, 800, 480, jpeg(16, 16)));
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    #[test]
    fn trailing_padding_is_ignored() {
        let img = decode_frame(&raw(PixelFormat::Rgb24, 1, 1, vec![9, 8, 7, 0, 0])).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [9, 8, 7]);
    }
}
