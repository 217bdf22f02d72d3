/// Software rasterizer: executes a display list on an RGBA canvas and
/// encodes the result as PNG.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use crate::rendering::layout::{GLYPH, LINE_GAP};
use crate::rendering::paint::PaintCommand;
use crate::rendering::Screenshot;
use crate::{Error, Result, Rgba};

/// Largest canvas edge we agree to allocate, in device pixels
const MAX_EDGE: u32 = 16_384;

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
            return Err(Error::RenderError(format!(
                "canvas size {}x{} out of range",
                width, height
            )));
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&[fill.0, fill.1, fill.2, fill.3]);
        }
        Ok(Self { width, height, pixels })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some((self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]))
    }

    /// Fill a rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, rgba: Rgba) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x + width as i64).clamp(0, self.width as i64) as u32;
        let y1 = (y + height as i64).clamp(0, self.height as i64) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                let i = (py as usize * self.width as usize + px as usize) * 4;
                self.pixels[i..i + 4].copy_from_slice(&[rgba.0, rgba.1, rgba.2, rgba.3]);
            }
        }
    }

    /// Draw one glyph with `cell` device pixels per font pixel. Characters
    /// without a glyph leave their cell blank.
    pub fn draw_glyph(&mut self, x: i64, y: i64, ch: char, cell: u32, rgba: Rgba) {
        let glyph = match BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch)) {
            Some(g) => g,
            None => return,
        };
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) != 0 {
                    self.fill_rect(
                        x + (col * cell) as i64,
                        y + (row as u32 * cell) as i64,
                        cell,
                        cell,
                        rgba,
                    );
                }
            }
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| Error::EncodeError(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| Error::EncodeError(e.to_string()))?;
            writer.finish().map_err(|e| Error::EncodeError(e.to_string()))?;
        }
        Ok(out)
    }
}

/// Rasterize `commands` for a `width` x `height` logical region at
/// `factor` device pixels per logical pixel.
pub fn rasterize(
    commands: &[PaintCommand],
    width: u32,
    height: u32,
    factor: u32,
) -> Result<Screenshot> {
    if factor == 0 {
        return Err(Error::RenderError("scale factor must be at least 1".into()));
    }
    let dev_w = width.saturating_mul(factor);
    let dev_h = height.saturating_mul(factor);
    // Transparent until the display list paints its background
    let mut canvas = Canvas::new(dev_w, dev_h, (0, 0, 0, 0))?;
    let f = factor as i64;

    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                let (w, h) = (width * factor, height * factor);
                canvas.fill_rect(*x as i64 * f, *y as i64 * f, w, h, *rgba);
            }
            PaintCommand::Text { x, y, text, scale, rgba } => {
                let cell = scale * factor;
                let advance = (GLYPH * cell) as i64;
                let line_h = ((GLYPH + LINE_GAP) * scale * factor) as i64;
                for (ln, line) in text.lines().enumerate() {
                    let top = *y as i64 * f + ln as i64 * line_h;
                    for (i, ch) in line.chars().enumerate() {
                        canvas.draw_glyph(*x as i64 * f + i as i64 * advance, top, ch, cell, *rgba);
                    }
                }
            }
        }
    }

    let png_data = canvas.encode_png()?;
    Ok(Screenshot { width: dev_w, height: dev_h, png_data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_clipped() {
        let mut c = Canvas::new(4, 4, (0, 0, 0, 255)).unwrap();
        c.fill_rect(-2, 2, 10, 10, (255, 0, 0, 255));
        assert_eq!(c.pixel(0, 1), Some((0, 0, 0, 255)));
        assert_eq!(c.pixel(3, 3), Some((255, 0, 0, 255)));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn glyph_marks_pixels() {
        let mut c = Canvas::new(16, 16, (255, 255, 255, 255)).unwrap();
        c.draw_glyph(0, 0, 'H', 2, (0, 0, 0, 255));
        let inked = (0..16)
            .flat_map(|y| (0..16).map(move |x| (x, y)))
            .filter(|&(x, y)| c.pixel(x, y) == Some((0, 0, 0, 255)))
            .count();
        assert!(inked > 0);
        assert_eq!(inked % 4, 0);
    }

    #[test]
    fn rasterize_scales_dimensions() {
        let cmds = vec![PaintCommand::SolidRect {
            x: 0,
            y: 0,
            width: 10,
            height: 5,
            rgba: crate::WHITE,
        }];
        let s = rasterize(&cmds, 10, 5, 2).unwrap();
        assert_eq!(s.width, 20);
        assert_eq!(s.height, 10);
        assert!(s.png_data.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(rasterize(&[], 0, 5, 2), Err(Error::RenderError(_))));
        assert!(matches!(rasterize(&[], 5, 5, 0), Err(Error::RenderError(_))));
    }
}
