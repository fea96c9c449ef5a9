//! # Line Rendering
//!
//! Draws one logical line as a single row. A line never wraps: if it is
//! wider than the content area, every run on it shrinks by the same factor
//! until it fits, bounded below by the configured minimum ratio and an
//! absolute minimum pixel size. Rows are always centered.

use serde::Serialize;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::font::{FontResolver, FontSet};
use crate::model::StyledRun;
use crate::raster::{Canvas, Rect};
use crate::style::TextStyle;

/// What drawing one line produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLine {
    /// Shrink factor applied to every run; 1.0 when the line fit.
    pub scale: f64,
    /// Final pixel size of each run, in run order.
    pub run_sizes: Vec<u32>,
    /// Tallest final size among visible runs.
    pub glyph_size: u32,
    /// `glyph_size + line_gap`.
    pub height: u32,
    pub text_left: f64,
    pub text_width: f64,
    pub highlight: Option<Rect>,
}

/// Sum of run advances under `fonts`.
pub fn line_width(runs: &[StyledRun], fonts: &FontSet) -> f64 {
    runs.iter()
        .map(|run| fonts.get(run.style).advance_width(&run.text))
        .sum()
}

pub struct LineRenderer<'a> {
    config: &'a RenderConfig,
    fonts: &'a FontResolver,
}

impl<'a> LineRenderer<'a> {
    pub fn new(config: &'a RenderConfig, fonts: &'a FontResolver) -> Self {
        LineRenderer { config, fonts }
    }

    /// Shrink factor for a line measuring `natural_width` at base sizes.
    pub fn fit_scale(&self, natural_width: f64, content_width: f64) -> f64 {
        if natural_width > content_width && natural_width > 0.0 {
            (content_width / natural_width).max(self.config.min_scale)
        } else {
            1.0
        }
    }

    /// Draw `runs` centered between `left` and `right` with their top at
    /// `top`. `base` is the unscaled font set used to decide the shrink.
    pub fn render_line(
        &self,
        canvas: &mut Canvas,
        left: i32,
        right: i32,
        top: i32,
        runs: &[StyledRun],
        base: &FontSet,
    ) -> Result<RenderedLine> {
        let content_width = (right - left) as f64;
        let natural_width = line_width(runs, base);
        let scale = self.fit_scale(natural_width, content_width);

        let fonts = if scale == 1.0 {
            base.clone()
        } else {
            self.fonts.font_set(self.config, scale)?
        };

        let text_width = line_width(runs, &fonts);
        let text_left = left as f64 + (content_width - text_width) / 2.0;
        if scale != 1.0 {
            log::debug!(
                "line shrunk to {:.3} ({:.1}px -> {:.1}px of {:.0}px)",
                scale,
                natural_width,
                text_width,
                content_width
            );
            if text_width > content_width {
                log::warn!(
                    "line still overflows by {:.1}px at the minimum scale",
                    text_width - content_width
                );
            }
        }

        let run_sizes: Vec<u32> = runs
            .iter()
            .map(|run| fonts.get(run.style).pixel_size())
            .collect();
        let glyph_size = runs
            .iter()
            .zip(&run_sizes)
            .filter(|(run, _)| run.is_visible())
            .map(|(_, &size)| size)
            .max()
            .unwrap_or(0);

        let has_emphasis = runs
            .iter()
            .any(|run| run.style == TextStyle::Emph && run.is_visible());
        let highlight = if has_emphasis {
            let rect = self.highlight_rect(left, right, top, glyph_size);
            canvas.fill_rounded_rect(rect, self.config.highlight.radius, self.config.highlight_fill);
            Some(rect)
        } else {
            None
        };

        let mut x = text_left;
        for run in runs {
            let font = fonts.get(run.style);
            for glyph in font.rasterize(&run.text) {
                canvas.draw_glyph(&glyph, x, top, self.config.text_color);
            }
            x += font.advance_width(&run.text);
        }

        Ok(RenderedLine {
            scale,
            run_sizes,
            glyph_size,
            height: glyph_size + self.config.line_gap,
            text_left,
            text_width,
            highlight,
        })
    }

    /// The box behind a line with emphasis. It spans the content width less
    /// a fixed inset, wherever the emphasized run sits.
    fn highlight_rect(&self, left: i32, right: i32, top: i32, glyph_size: u32) -> Rect {
        let style = &self.config.highlight;
        let inset = ((right - left) as f64 * style.inset_ratio) as i32;
        let box_top = top - style.top_offset;
        Rect::new(
            left + inset,
            box_top,
            right - inset,
            box_top + glyph_size as i32 + style.extra_height,
        )
    }
}
