//! # Card Model
//!
//! The input representation for the layout engine. Raw text is classified
//! into logical lines once, and both layout passes walk that same immutable
//! sequence. A logical line is never split: one physical input line is one
//! visual row on the card.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::RenderConfig;
use crate::error::CardError;
use crate::style::{Color, TextStyle};

/// A maximal span of one line that shares a style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledRun {
    pub style: TextStyle,
    pub text: String,
}

impl StyledRun {
    pub fn new(style: TextStyle, text: impl Into<String>) -> Self {
        StyledRun {
            style,
            text: text.into(),
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(TextStyle::Normal, text)
    }

    /// Whether this run draws anything. Empty runs (from `====` or `****`)
    /// keep their style but take no part in sizing.
    pub fn is_visible(&self) -> bool {
        !self.text.is_empty()
    }

    /// The source markup this run was parsed from.
    pub fn to_markup(&self) -> String {
        match self.style {
            TextStyle::Emph => format!("=={}==", self.text),
            TextStyle::Bold => format!("**{}**", self.text),
            TextStyle::Title => format!("# {}", self.text),
            TextStyle::Subtitle => format!("## {}", self.text),
            TextStyle::Normal => self.text.clone(),
        }
    }
}

/// Classification of a non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Title,
    Subtitle,
    Body,
}

/// One classified physical line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalLine {
    /// Blank or whitespace-only. Contributes a paragraph gap.
    Empty,
    Text { kind: LineKind, runs: Vec<StyledRun> },
}

impl LogicalLine {
    pub fn runs(&self) -> &[StyledRun] {
        match self {
            LogicalLine::Empty => &[],
            LogicalLine::Text { runs, .. } => runs,
        }
    }

    /// Whether any run is visible emphasis, i.e. whether the line gets a
    /// highlight box.
    pub fn has_emphasis(&self) -> bool {
        self.runs()
            .iter()
            .any(|r| r.style == TextStyle::Emph && r.is_visible())
    }

    /// The tallest unscaled size among visible runs, 0 when none are visible.
    pub fn base_glyph_size(&self, config: &RenderConfig) -> u32 {
        self.runs()
            .iter()
            .filter(|r| r.is_visible())
            .map(|r| config.base_size(r.style))
            .max()
            .unwrap_or(0)
    }

    /// The vertical space this line is given. Computed from unscaled sizes
    /// only, so shrinking a line never changes it.
    pub fn slot_height(&self, config: &RenderConfig) -> u32 {
        match self {
            LogicalLine::Empty => config.paragraph_gap,
            LogicalLine::Text { .. } => self.base_glyph_size(config) + config.line_gap,
        }
    }

    /// Visible text with markup removed.
    pub fn plain_text(&self) -> String {
        self.runs().iter().map(|r| r.text.as_str()).collect()
    }
}

/// Card template presets. Only panel usage differs between them as far as
/// layout is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    /// Text straight on the background.
    Minimal,
    /// Text on a rounded, lightened panel with a drop shadow.
    #[default]
    PanelLight,
    /// Same geometry as `PanelLight`; callers pair it with a bolder background.
    PanelPoster,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Minimal, Template::PanelLight, Template::PanelPoster];

    pub fn uses_panel(self) -> bool {
        !matches!(self, Template::Minimal)
    }

    /// The background a caller gets when they don't pick one.
    pub fn default_background(self) -> Color {
        match self {
            Template::Minimal => Color::WHITE,
            Template::PanelLight | Template::PanelPoster => Color::rgb(0xF6, 0xF7, 0xFB),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::Minimal => "minimal",
            Template::PanelLight => "panel-light",
            Template::PanelPoster => "panel-poster",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CardError::input_format(s, "expected one of: minimal, panel-light, panel-poster")
            })
    }
}
