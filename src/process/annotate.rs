//! Text annotation with a built-in 5x7 bitmap font

use image::{Rgb, RgbImage};

use super::fps::format_fps;
use crate::Frame;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;

/// Label colour, pure green
pub const FPS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Pixel scale of one font cell
pub const FPS_SCALE: u32 = 2;
/// Label baseline origin, measured from the top-right corner
pub const FPS_INSET: (u32, u32) = (150, 30);

/// Rows top to bottom, bit 4 is the leftmost column
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => return None,
    };
    Some(rows)
}

/// Horizontal advance of one character at `scale`
pub fn advance(scale: u32) -> u32 {
    (GLYPH_WIDTH + 1) * scale
}

/// Draw `text` with its baseline-left corner at `origin`. Pixels falling
/// outside the image are clipped. Unknown characters render as blanks.
pub fn draw_text(image: &mut RgbImage, text: &str, origin: (i32, i32), scale: u32, color: Rgb<u8>) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let scale = scale.max(1) as i64;
    let top = origin.1 as i64 - GLYPH_HEIGHT as i64 * scale;
    let mut left = origin.0 as i64;

    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH as i64 {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let x0 = left + col * scale;
                    let y0 = top + row as i64 * scale;
                    for y in y0.max(0)..(y0 + scale).min(height) {
                        for x in x0.max(0)..(x0 + scale).min(width) {
                            image.put_pixel(x as u32, y as u32, color);
                        }
                    }
                }
            }
        }
        left += advance(scale as u32) as i64;
    }
}

/// Render the FPS label in the top-right area of the frame
pub fn annotate_fps(frame: &mut Frame, fps: f64) {
    let origin = (
        frame.width() as i32 - FPS_INSET.0 as i32,
        FPS_INSET.1 as i32,
    );
    draw_text(&mut frame.image, &format_fps(fps), origin, FPS_SCALE, FPS_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(image: &RgbImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [0, 0, 0])
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn draws_glyph_above_baseline() {
        let mut image = RgbImage::new(10, 10);
        draw_text(&mut image, "-", (0, 8), 1, FPS_COLOR);
        // middle row of a 7-row cell whose bottom sits on the baseline
        assert_eq!(lit(&image), vec![(0, 4), (1, 4), (2, 4), (3, 4), (4, 4)]);
        assert_eq!(image.get_pixel(2, 4), &FPS_COLOR);
    }

    #[test]
    fn scale_multiplies_cells() {
        let mut image = RgbImage::new(20, 20);
        draw_text(&mut image, ".", (0, 14), 2, FPS_COLOR);
        // the dot is a 2x2 block of cells at columns 1-2, rows 5-6
        let pixels = lit(&image);
        assert_eq!(pixels.len(), 16);
        assert!(pixels.iter().all(|&(x, y)| (2..6).contains(&x) && (10..14).contains(&y)));
    }

    #[test]
    fn clips_at_every_edge() {
        let mut image = RgbImage::new(8, 8);
        draw_text(&mut image, "FPS: 88.8", (-20, 3), 3, FPS_COLOR);
        draw_text(&mut image, "8", (6, 40), 3, FPS_COLOR);
        draw_text(&mut image, "?", (0, 7), 1, FPS_COLOR);
    }

    #[test]
    fn fps_label_sits_in_the_top_right() {
        let mut frame = Frame::new(RgbImage::new(800, 480), 1);
        annotate_fps(&mut frame, 29.97);

        let pixels = lit(&frame.image);
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|&(x, y)| x >= 650 && y < 30));
        assert!(frame.image.pixels().all(|p| p.0 == [0, 0, 0] || *p == FPS_COLOR));
    }

    #[test]
    fn narrow_frames_do_not_panic() {
        let mut frame = Frame::new(RgbImage::new(64, 16), 1);
        annotate_fps(&mut frame, 1234.5);
    }
}
