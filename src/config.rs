//! Fixed rendering constants and font file locations.
//!
//! A card is not user-styled: the look is decided here once and applies
//! uniformly to every line of every card a renderer produces. Only the
//! font directory is expected to vary between deployments.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::style::{Color, FontRole, TextStyle};

/// Base pixel size per style, before any shrink-to-fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSizes {
    pub normal: u32,
    pub bold: u32,
    pub emph: u32,
    pub title: u32,
    pub subtitle: u32,
}

impl StyleSizes {
    pub fn get(&self, style: TextStyle) -> u32 {
        match style {
            TextStyle::Normal => self.normal,
            TextStyle::Bold => self.bold,
            TextStyle::Emph => self.emph,
            TextStyle::Title => self.title,
            TextStyle::Subtitle => self.subtitle,
        }
    }
}

impl Default for StyleSizes {
    fn default() -> Self {
        StyleSizes {
            normal: 28,
            bold: 28,
            emph: 32,
            title: 46,
            subtitle: 34,
        }
    }
}

/// Geometry of the highlight box drawn behind a line with emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    /// Horizontal inset on each side, as a fraction of content width.
    pub inset_ratio: f64,
    /// How far above the line top the box starts.
    pub top_offset: i32,
    /// Added to the tallest glyph size to get the box height.
    pub extra_height: i32,
    pub radius: i32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle {
            inset_ratio: 0.04,
            top_offset: 6,
            extra_height: 14,
            radius: 16,
        }
    }
}

/// Geometry of the rounded panel and its drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelStyle {
    pub radius: i32,
    /// Added to each background channel to get the panel fill.
    pub lighten: u8,
    pub shadow_offset: (i32, i32),
    /// Shadow alpha at strength 1.0.
    pub shadow_alpha: f64,
}

impl Default for PanelStyle {
    fn default() -> Self {
        PanelStyle {
            radius: 26,
            lighten: 18,
            shadow_offset: (3, 6),
            shadow_alpha: 25.0,
        }
    }
}

/// Immutable constants for one rendered card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub canvas_width: u32,
    /// Margin between the canvas edge and the panel (or the text, without a panel).
    pub outer_padding: u32,
    /// Margin between the panel edge and the text.
    pub panel_padding: u32,
    /// Added below every text line.
    pub line_gap: u32,
    /// Height of a blank input line.
    pub paragraph_gap: u32,
    /// 0 disables the shadow.
    pub shadow_strength: f64,
    pub text_color: Color,
    pub highlight_fill: Color,
    pub sizes: StyleSizes,
    /// Lower bound on the shrink-to-fit ratio.
    pub min_scale: f64,
    /// Absolute floor on any scaled font size, in pixels.
    pub min_font_size: u32,
    pub highlight: HighlightStyle,
    pub panel: PanelStyle,
    pub jpeg_quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            canvas_width: 700,
            outer_padding: 48,
            panel_padding: 34,
            line_gap: 14,
            paragraph_gap: 34,
            shadow_strength: 1.0,
            text_color: Color::rgb(30, 30, 30),
            highlight_fill: Color::rgb(255, 236, 156),
            sizes: StyleSizes::default(),
            min_scale: 0.65,
            min_font_size: 12,
            highlight: HighlightStyle::default(),
            panel: PanelStyle::default(),
            jpeg_quality: 95,
        }
    }
}

impl RenderConfig {
    pub fn base_size(&self, style: TextStyle) -> u32 {
        self.sizes.get(style)
    }

    /// Font size for `style` after shrinking a line by `scale`.
    pub fn scaled_size(&self, style: TextStyle, scale: f64) -> u32 {
        let scaled = (self.base_size(style) as f64 * scale).floor() as u32;
        scaled.max(self.min_font_size)
    }

    /// Shadow alpha for the configured strength, or `None` when disabled.
    pub fn shadow_alpha(&self) -> Option<u8> {
        if self.shadow_strength > 0.0 {
            let alpha = (self.panel.shadow_alpha * self.shadow_strength).floor();
            Some(alpha.clamp(0.0, 255.0) as u8)
        } else {
            None
        }
    }
}

pub const DEFAULT_FONT_DIR: &str = "fonts";
pub const REGULAR_FONT_FILE: &str = "NotoSansKR-Regular.ttf";
pub const BOLD_FONT_FILE: &str = "NotoSansKR-Bold.ttf";

/// Where the two font roles live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontPaths {
    pub regular: PathBuf,
    pub bold: PathBuf,
}

impl FontPaths {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        FontPaths {
            regular: dir.join(REGULAR_FONT_FILE),
            bold: dir.join(BOLD_FONT_FILE),
        }
    }

    pub fn for_role(&self, role: FontRole) -> &Path {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
        }
    }

    pub fn for_style(&self, style: TextStyle) -> &Path {
        self.for_role(style.font_role())
    }
}

impl Default for FontPaths {
    fn default() -> Self {
        FontPaths::in_dir(DEFAULT_FONT_DIR)
    }
}
