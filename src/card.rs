//! # Card Compositor
//!
//! The top of the pipeline: parses the background color, decides on the
//! panel from the template, draws the shadow and panel, then hands the text
//! to the layout engine.
//!
//! ```text
//! background ─┐
//!             ├─ shadow layer (composited) ─ panel ─ text lines ─ RGB card
//! template  ──┘
//! ```

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};

use crate::config::{FontPaths, RenderConfig};
use crate::error::{CardError, Result};
use crate::font::{FontProvider, FontResolver, TrueTypeProvider};
use crate::layout::{CardLayout, LayoutEngine, PanelBox, ShadowBox};
use crate::model::Template;
use crate::raster::{Canvas, Rect};
use crate::style::Color;

/// A finished card: opaque RGB pixels plus where everything was placed.
#[derive(Debug, Clone)]
pub struct Card {
    image: RgbImage,
    layout: CardLayout,
}

impl Card {
    pub(crate) fn new(image: RgbImage, layout: CardLayout) -> Self {
        Card { image, layout }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let [r, g, b] = self.image.get_pixel(x, y).0;
        Color::rgb(r, g, b)
    }

    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&self.image)?;
        Ok(buf.into_inner())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            self.image.as_raw(),
            self.width(),
            self.height(),
            ColorType::Rgb8,
        )?;
        Ok(buf)
    }

    /// Write to `path`: PNG for a `.png` extension, JPEG otherwise.
    pub fn save(&self, path: impl AsRef<Path>, jpeg_quality: u8) -> Result<()> {
        let path = path.as_ref();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        let bytes = if is_png {
            self.encode_png()?
        } else {
            self.encode_jpeg(jpeg_quality)?
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Owns the constants and the font cache for a run of cards. Cards share no
/// mutable state beyond the cache, so one renderer can serve many threads.
pub struct CardRenderer {
    config: RenderConfig,
    fonts: FontResolver,
}

impl CardRenderer {
    pub fn new(config: RenderConfig, provider: Arc<dyn FontProvider>, paths: FontPaths) -> Self {
        CardRenderer {
            config,
            fonts: FontResolver::new(provider, paths),
        }
    }

    /// Default constants, fonts loaded from disk under `dir`.
    pub fn with_font_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(
            RenderConfig::default(),
            Arc::new(TrueTypeProvider::new()),
            FontPaths::in_dir(dir),
        )
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontResolver {
        &self.fonts
    }

    pub fn layout_engine(&self) -> LayoutEngine<'_> {
        LayoutEngine::new(&self.config, &self.fonts)
    }

    /// Render one card, rejecting blank input before any layout work.
    pub fn render(&self, raw_text: &str, template: Template, background_hex: &str) -> Result<Card> {
        if raw_text.trim().is_empty() {
            return Err(CardError::EmptyInput);
        }
        self.compose(raw_text, template, background_hex)
    }

    /// Background, optional shadow and panel, then the text.
    pub fn compose(&self, raw_text: &str, template: Template, background_hex: &str) -> Result<Card> {
        let background = Color::from_hex(background_hex)?;
        let engine = self.layout_engine();
        let plan = engine.plan(raw_text, template);

        let mut canvas = Canvas::new(self.config.canvas_width, plan.height, background);
        let panel = if template.uses_panel() {
            Some(self.draw_panel(&mut canvas, background))
        } else {
            None
        };

        let lines = engine.draw(&plan, &mut canvas)?;
        log::info!(
            "rendered {} card: {}x{}, {} lines",
            template,
            self.config.canvas_width,
            plan.height,
            lines.len()
        );

        let layout = engine.report(&plan, background, panel, lines);
        Ok(Card::new(canvas.into_rgb(), layout))
    }

    /// Draw the shadow and the panel over the full canvas height, inset by
    /// the outer padding.
    fn draw_panel(&self, canvas: &mut Canvas, background: Color) -> PanelBox {
        let pad = self.config.outer_padding as i32;
        let rect = Rect::new(
            pad,
            pad,
            canvas.width() as i32 - pad,
            canvas.height() as i32 - pad,
        );
        let style = &self.config.panel;
        let fill = background.lighten(style.lighten);

        let shadow = self.config.shadow_alpha().map(|alpha| {
            let (dx, dy) = style.shadow_offset;
            let shadow_rect = rect.offset(dx, dy);
            let mut layer = canvas.new_layer();
            layer.fill_rounded_rect(shadow_rect, style.radius, Color::rgb(0, 0, 0), alpha);
            canvas.composite(&layer);
            ShadowBox {
                rect: shadow_rect,
                alpha,
            }
        });

        canvas.fill_rounded_rect(rect, style.radius, fill);
        PanelBox {
            rect,
            fill,
            radius: style.radius,
            shadow,
        }
    }
}
