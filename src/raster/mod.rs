//! # Raster Canvas
//!
//! A software canvas for the handful of primitives a card needs: solid
//! fill, rounded rectangles, alpha-composited layers, and glyph coverage.
//!
//! The canvas is RGBA so a translucent layer (the panel shadow) can be
//! composited onto it; the finished card is flattened to opaque RGB.

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};
use serde::Serialize;

use crate::font::GlyphBitmap;
use crate::style::Color;

/// An axis-aligned rectangle with inclusive pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Rect::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }
}

/// Horizontal span `[left, right]` of a rounded rect at row `y`, or `None`
/// when the row is outside it.
fn rounded_span(rect: Rect, radius: i32, y: i32) -> Option<(i32, i32)> {
    if y < rect.top || y > rect.bottom || rect.right < rect.left {
        return None;
    }
    let r = radius.min(rect.width() / 2).min(rect.height() / 2).max(0);
    let dy = if y < rect.top + r {
        rect.top + r - y
    } else if y > rect.bottom - r {
        y - (rect.bottom - r)
    } else {
        0
    };
    if dy == 0 {
        return Some((rect.left, rect.right));
    }
    let dx = (((r * r) as f64 - (dy * dy) as f64).max(0.0)).sqrt().floor() as i32;
    Some((rect.left + r - dx, rect.right - r + dx))
}

fn fill_rounded(img: &mut RgbaImage, rect: Rect, radius: i32, pixel: Rgba<u8>) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for y in rect.top.max(0)..=rect.bottom.min(h - 1) {
        let Some((left, right)) = rounded_span(rect, radius, y) else {
            continue;
        };
        for x in left.max(0)..=right.min(w - 1) {
            img.put_pixel(x as u32, y as u32, pixel);
        }
    }
}

/// A transparent overlay the size of the canvas.
pub struct Layer {
    image: RgbaImage,
}

impl Layer {
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: i32, color: Color, alpha: u8) {
        fill_rounded(&mut self.image, rect, radius, Rgba([color.r, color.g, color.b, alpha]));
    }
}

/// The drawing surface for one card.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let fill = Rgba([background.r, background.g, background.b, 255]);
        Canvas {
            image: RgbaImage::from_pixel(width, height, fill),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
        Color::rgb(r, g, b)
    }

    /// An empty overlay matching this canvas.
    pub fn new_layer(&self) -> Layer {
        Layer {
            image: RgbaImage::new(self.width(), self.height()),
        }
    }

    /// Alpha-composite `layer` over the canvas.
    pub fn composite(&mut self, layer: &Layer) {
        imageops::overlay(&mut self.image, &layer.image, 0, 0);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: i32, color: Color) {
        fill_rounded(&mut self.image, rect, radius, Rgba([color.r, color.g, color.b, 255]));
    }

    /// Blend one glyph's coverage in `color` with its pen origin at
    /// `(origin_x, line_top)`.
    pub fn draw_glyph(&mut self, glyph: &GlyphBitmap, origin_x: f64, line_top: i32, color: Color) {
        let gx = (origin_x + glyph.left).round() as i32;
        let gy = line_top + glyph.top;
        let (w, h) = (self.width() as i32, self.height() as i32);

        for (i, &alpha) in glyph.coverage.iter().enumerate() {
            if alpha == 0 {
                continue;
            }
            let px = gx + (i % glyph.width) as i32;
            let py = gy + (i / glyph.width) as i32;
            if px < 0 || py < 0 || px >= w || py >= h {
                continue;
            }
            let dst = self.image.get_pixel_mut(px as u32, py as u32);
            dst.0 = blend(dst.0, color, alpha);
        }
    }

    /// Drop the alpha channel.
    pub fn into_rgb(self) -> RgbImage {
        let (w, h) = (self.width(), self.height());
        RgbImage::from_fn(w, h, |x, y| {
            let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
            Rgb([r, g, b])
        })
    }
}

fn blend(bg: [u8; 4], fg: Color, alpha: u8) -> [u8; 4] {
    let a = alpha as u32;
    let inv_a = 255 - a;
    let mix = |f: u8, b: u8| ((f as u32 * a + b as u32 * inv_a) / 255) as u8;
    [mix(fg.r, bg[0]), mix(fg.g, bg[1]), mix(fg.b, bg[2]), bg[3]]
}
