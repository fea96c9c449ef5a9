//! # Card Layout Engine
//!
//! Turns classified lines into a drawn card in two passes over the same
//! immutable line list:
//!
//! 1. **Measure.** Sum each line's vertical slot: a paragraph gap for a
//!    blank line, or the tallest *unscaled* run size plus the line gap for a
//!    text line. Padding is added around the content. This fixes the canvas
//!    height before anything is drawn.
//! 2. **Draw.** Walk the lines again, handing each text line to the
//!    [`LineRenderer`] at the current cursor and advancing the cursor by the
//!    height it returns (the paragraph gap for a blank line).
//!
//! A shrunk line is shorter than the slot pass 1 reserved for it, so the
//! lines below it move up and the canvas keeps some slack at the bottom.
//! The canvas is never resized after pass 1.

pub mod line;

pub use line::{LineRenderer, RenderedLine};

use serde::Serialize;

use crate::card::Card;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::font::FontResolver;
use crate::model::{LineKind, LogicalLine, Template};
use crate::raster::{Canvas, Rect};
use crate::style::Color;
use crate::text::parse_lines;

// ── Serializable layout report ──────────────────────────────────

/// Where every piece of a card ended up. Attached to each [`Card`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLayout {
    pub template: Template,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub content_left: i32,
    pub content_right: i32,
    pub panel: Option<PanelBox>,
    pub lines: Vec<LineBox>,
}

impl CardLayout {
    /// Text lines only, in order.
    pub fn text_lines(&self) -> impl Iterator<Item = &LineBox> {
        self.lines.iter().filter(|l| l.kind != SlotKind::Empty)
    }

    /// Pretty-printed JSON, as written by `--layout`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelBox {
    pub rect: Rect,
    pub fill: Color,
    pub radius: i32,
    pub shadow: Option<ShadowBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowBox {
    pub rect: Rect,
    pub alpha: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Empty,
    Title,
    Subtitle,
    Body,
}

impl From<&LogicalLine> for SlotKind {
    fn from(line: &LogicalLine) -> Self {
        match line {
            LogicalLine::Empty => SlotKind::Empty,
            LogicalLine::Text { kind, .. } => match kind {
                LineKind::Title => SlotKind::Title,
                LineKind::Subtitle => SlotKind::Subtitle,
                LineKind::Body => SlotKind::Body,
            },
        }
    }
}

/// One logical line's vertical slot and, for text lines, what was drawn in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBox {
    pub kind: SlotKind,
    pub top: i32,
    /// Height pass 1 reserved for this line.
    pub slot: u32,
    /// How far the cursor moved past this line. Never more than `slot`.
    pub advance: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<RenderedLine>,
}

// ── Engine ──────────────────────────────────────────────────────

/// Parsed input plus the canvas height pass 1 computed for it.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    pub template: Template,
    pub lines: Vec<LogicalLine>,
    pub height: u32,
}

pub struct LayoutEngine<'a> {
    config: &'a RenderConfig,
    fonts: &'a FontResolver,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a RenderConfig, fonts: &'a FontResolver) -> Self {
        LayoutEngine { config, fonts }
    }

    /// Padding between the canvas edge and the text on each side.
    fn inset(&self, panel: bool) -> u32 {
        if panel {
            self.config.outer_padding + self.config.panel_padding
        } else {
            self.config.outer_padding
        }
    }

    /// Horizontal text bounds `(left, right)`.
    pub fn content_bounds(&self, panel: bool) -> (i32, i32) {
        let inset = self.inset(panel) as i32;
        (inset, self.config.canvas_width as i32 - inset)
    }

    /// Pass 1: total canvas height for `lines`.
    pub fn estimate_height(&self, lines: &[LogicalLine], panel: bool) -> u32 {
        let content: u32 = lines.iter().map(|l| l.slot_height(self.config)).sum();
        self.inset(panel) * 2 + content
    }

    /// Classify `raw_text` and run pass 1.
    pub fn plan(&self, raw_text: &str, template: Template) -> LayoutPlan {
        let lines = parse_lines(raw_text);
        let height = self.estimate_height(&lines, template.uses_panel());
        LayoutPlan {
            template,
            lines,
            height,
        }
    }

    /// Pass 2: draw every line of `plan` onto `canvas`.
    pub fn draw(&self, plan: &LayoutPlan, canvas: &mut Canvas) -> Result<Vec<LineBox>> {
        let panel = plan.template.uses_panel();
        let (left, right) = self.content_bounds(panel);
        let base = self.fonts.font_set(self.config, 1.0)?;
        let renderer = LineRenderer::new(self.config, self.fonts);

        let mut cursor = self.inset(panel) as i32;
        let mut boxes = Vec::with_capacity(plan.lines.len());

        for line in &plan.lines {
            let slot = line.slot_height(self.config);
            let (advance, rendered) = match line {
                LogicalLine::Empty => (self.config.paragraph_gap, None),
                LogicalLine::Text { runs, .. } => {
                    let rendered = renderer.render_line(canvas, left, right, cursor, runs, &base)?;
                    (rendered.height, Some(rendered))
                }
            };
            debug_assert!(advance <= slot);
            boxes.push(LineBox {
                kind: SlotKind::from(line),
                top: cursor,
                slot,
                advance,
                text: line.plain_text(),
                rendered,
            });
            cursor += advance as i32;
        }

        debug_assert!(cursor as u32 + self.inset(panel) <= plan.height);
        Ok(boxes)
    }

    /// Lay out and draw `raw_text` on a plain `background` canvas.
    ///
    /// Panel templates still get the panel's text insets, but no panel is
    /// drawn; decorating the canvas is the compositor's job
    /// ([`crate::CardRenderer::compose`]).
    pub fn layout(&self, raw_text: &str, template: Template, background: Color) -> Result<Card> {
        let plan = self.plan(raw_text, template);
        let mut canvas = Canvas::new(self.config.canvas_width, plan.height, background);
        let lines = self.draw(&plan, &mut canvas)?;
        let layout = self.report(&plan, background, None, lines);
        Ok(Card::new(canvas.into_rgb(), layout))
    }

    /// Assemble the layout report for a drawn `plan`.
    pub fn report(
        &self,
        plan: &LayoutPlan,
        background: Color,
        panel: Option<PanelBox>,
        lines: Vec<LineBox>,
    ) -> CardLayout {
        let (content_left, content_right) = self.content_bounds(plan.template.uses_panel());
        CardLayout {
            template: plan.template,
            width: self.config.canvas_width,
            height: plan.height,
            background,
            content_left,
            content_right,
            panel,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::block_resolver;

    #[test]
    fn test_estimate_height_per_line_type() {
        let config = RenderConfig::default();
        let (_, fonts) = block_resolver();
        let engine = LayoutEngine::new(&config, &fonts);

        let lines = parse_lines("# Title\n\nbody\n## Sub\n==claim==");
        // 46+14, 34, 28+14, 34+14, 32+14
        let content = 60 + 34 + 42 + 48 + 46;
        assert_eq!(engine.estimate_height(&lines, false), 96 + content);
        assert_eq!(engine.estimate_height(&lines, true), 164 + content);
    }

    #[test]
    fn test_content_bounds() {
        let config = RenderConfig::default();
        let (_, fonts) = block_resolver();
        let engine = LayoutEngine::new(&config, &fonts);
        assert_eq!(engine.content_bounds(false), (48, 652));
        assert_eq!(engine.content_bounds(true), (82, 618));
    }

    #[test]
    fn test_slots_match_estimate() {
        let config = RenderConfig::default();
        let (_, fonts) = block_resolver();
        let engine = LayoutEngine::new(&config, &fonts);

        let text = format!("# Title\n\n{}\n==short==\n\n\n**b**", "long ".repeat(60));
        for template in Template::ALL {
            let plan = engine.plan(&text, template);
            let mut canvas = Canvas::new(config.canvas_width, plan.height, Color::WHITE);
            let boxes = engine.draw(&plan, &mut canvas).unwrap();

            let inset = engine.inset(template.uses_panel());
            let slots: u32 = boxes.iter().map(|b| b.slot).sum();
            assert_eq!(inset * 2 + slots, plan.height, "{template}");

            // The long body line shrank, so the cursor ends above the padding.
            let last = boxes.last().unwrap();
            assert!(last.top as u32 + last.advance + inset < plan.height);
            for b in &boxes {
                assert!(b.advance <= b.slot);
            }
        }
    }

    #[test]
    fn test_unshrunk_lines_advance_by_their_slot() {
        let config = RenderConfig::default();
        let (_, fonts) = block_resolver();
        let engine = LayoutEngine::new(&config, &fonts);

        let plan = engine.plan("# Title\n\nbody\n==claim==", Template::Minimal);
        let mut canvas = Canvas::new(config.canvas_width, plan.height, Color::WHITE);
        let boxes = engine.draw(&plan, &mut canvas).unwrap();
        for b in &boxes {
            assert_eq!(b.advance, b.slot);
        }
        let last = boxes.last().unwrap();
        assert_eq!(last.top as u32 + last.advance + 48, plan.height);
    }

    #[test]
    fn test_shrunk_line_advances_by_rendered_height() {
        let config = RenderConfig::default();
        let (_, fonts) = block_resolver();
        let engine = LayoutEngine::new(&config, &fonts);

        let text = format!("# {}\nnext", "T".repeat(100));
        let plan = engine.plan(&text, Template::Minimal);
        assert_eq!(plan.height, 96 + (46 + 14) + (28 + 14));

        let mut canvas = Canvas::new(config.canvas_width, plan.height, Color::WHITE);
        let boxes = engine.draw(&plan, &mut canvas).unwrap();
        let title = boxes[0].rendered.as_ref().unwrap();
        assert!(title.scale < 1.0);
        // floor(46 * 0.65) = 29
        assert_eq!(title.glyph_size, 29);
        assert_eq!(boxes[0].slot, 46 + 14);
        assert_eq!(boxes[0].advance, 29 + 14);
        assert_eq!(boxes[1].top, 48 + 29 + 14);
    }

    #[test]
    fn test_layout_builds_plain_card() {
        let config = RenderConfig::default();
        let (_, fonts) = block_resolver();
        let engine = LayoutEngine::new(&config, &fonts);

        let bg = Color::rgb(0xF6, 0xF7, 0xFB);
        let card = engine.layout("hello\n\nworld", Template::PanelLight, bg).unwrap();
        assert_eq!(card.width(), 700);
        assert_eq!(card.height(), 164 + 42 + 34 + 42);
        assert!(card.layout().panel.is_none());
        assert_eq!(card.layout().content_left, 82);
        assert_eq!(card.pixel(1, 1), bg);
        assert_eq!(card.layout().text_lines().count(), 2);

        let json: serde_json::Value = serde_json::from_str(&card.layout().to_json().unwrap()).unwrap();
        assert_eq!(json["lines"][0]["slot"], 42);
        assert_eq!(json["lines"][1]["advance"], 34);
    }
}
