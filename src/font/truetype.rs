//! TrueType/OpenType font loading.
//!
//! Each file is read and parsed once. `ttf-parser` supplies the metrics
//! (advance widths, units per em, ascender) and `fontdue` rasterizes glyph
//! coverage. Pen positions always come from the `ttf-parser` advances, so a
//! run draws exactly as wide as it measures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fontdue::{Font, FontSettings};

use super::{FontHandle, FontProvider, GlyphBitmap, GlyphFont};
use crate::error::{CardError, Result};

/// Metrics parsed from a font file via ttf-parser.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub advance_widths: HashMap<char, u16>,
    /// Used for chars the font has no glyph for.
    pub default_advance: u16,
}

impl FaceMetrics {
    /// Walk the Unicode cmap subtables and record the advance of every
    /// mapped code point.
    pub fn from_font_data(data: &[u8]) -> std::result::Result<Self, ttf_parser::FaceParsingError> {
        let face = ttf_parser::Face::parse(data, 0)?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(glyph) = subtable.glyph_index(code) {
                        advance_widths
                            .entry(ch)
                            .or_insert_with(|| face.glyph_hor_advance(glyph).unwrap_or(0));
                    }
                });
            }
        }

        let default_advance = advance_widths
            .get(&' ')
            .copied()
            .filter(|&w| w > 0)
            .unwrap_or(units_per_em / 2);

        Ok(FaceMetrics {
            units_per_em,
            ascender: face.ascender(),
            advance_widths,
            default_advance,
        })
    }

    /// Advance of one char in pixels at `pixel_size`.
    pub fn char_width(&self, ch: char, pixel_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * pixel_size
    }

    pub fn ascent(&self, pixel_size: f64) -> f64 {
        (self.ascender as f64 / self.units_per_em as f64) * pixel_size
    }
}

/// One parsed font file, shared by every size loaded from it.
pub struct FontFace {
    metrics: FaceMetrics,
    raster: Font,
}

impl FontFace {
    fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| CardError::font_load(path, e))?;
        let metrics = FaceMetrics::from_font_data(&data).map_err(|e| CardError::font_load(path, e))?;
        let raster = Font::from_bytes(data.as_slice(), FontSettings::default())
            .map_err(|e| CardError::font_load(path, e))?;
        Ok(FontFace { metrics, raster })
    }

    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }
}

/// A [`FontFace`] at a fixed pixel size.
pub struct TrueTypeFont {
    face: Arc<FontFace>,
    pixel_size: u32,
}

impl GlyphFont for TrueTypeFont {
    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    fn advance_width(&self, text: &str) -> f64 {
        let px = self.pixel_size as f64;
        text.chars().map(|ch| self.face.metrics.char_width(ch, px)).sum()
    }

    fn rasterize(&self, text: &str) -> Vec<GlyphBitmap> {
        let px = self.pixel_size as f64;
        let baseline = self.face.metrics.ascent(px).round() as i32;
        let mut pen = 0.0;
        let mut glyphs = Vec::new();

        for ch in text.chars() {
            let (m, coverage) = self.face.raster.rasterize(ch, px as f32);
            if m.width > 0 && m.height > 0 {
                glyphs.push(GlyphBitmap {
                    left: pen + m.xmin as f64,
                    // fontdue's ymin is the bitmap bottom, measured up from the baseline.
                    top: baseline - (m.ymin + m.height as i32),
                    width: m.width,
                    height: m.height,
                    coverage,
                });
            }
            pen += self.face.metrics.char_width(ch, px);
        }
        glyphs
    }
}

/// Loads fonts from disk. Parsed faces are kept per path so each file is
/// read once no matter how many sizes are requested.
#[derive(Default)]
pub struct TrueTypeProvider {
    faces: Mutex<HashMap<PathBuf, Arc<FontFace>>>,
}

impl TrueTypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn face(&self, path: &Path) -> Result<Arc<FontFace>> {
        let mut faces = self.faces.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(face) = faces.get(path) {
            return Ok(face.clone());
        }
        let face = Arc::new(FontFace::load(path)?);
        log::info!(
            "loaded font {} ({} glyphs mapped)",
            path.display(),
            face.metrics.advance_widths.len()
        );
        faces.insert(path.to_path_buf(), face.clone());
        Ok(face)
    }
}

impl FontProvider for TrueTypeProvider {
    fn load_font(&self, path: &Path, pixel_size: u32) -> Result<FontHandle> {
        let face = self.face(path)?;
        Ok(Arc::new(TrueTypeFont { face, pixel_size }))
    }
}
