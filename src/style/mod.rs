//! # Style System
//!
//! The closed set of text styles a card can use, and the RGB color type
//! shared by the config, the compositor, and the rasterizer.
//!
//! Every style maps to exactly one font role and one base pixel size. There
//! is no cascade and no per-run override: a run's style decides everything
//! about how it looks except its final scaled size.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::CardError;

/// The style of one run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// Body text.
    Normal,
    /// `**bold**` run.
    Bold,
    /// `==emphasis==` run. Draws a highlight box behind the whole line.
    Emph,
    /// `# heading` line.
    Title,
    /// `## subheading` line.
    Subtitle,
}

impl TextStyle {
    /// All styles, in table order.
    pub const ALL: [TextStyle; 5] = [
        TextStyle::Normal,
        TextStyle::Bold,
        TextStyle::Emph,
        TextStyle::Title,
        TextStyle::Subtitle,
    ];

    /// Position of this style in [`TextStyle::ALL`].
    pub fn index(self) -> usize {
        match self {
            TextStyle::Normal => 0,
            TextStyle::Bold => 1,
            TextStyle::Emph => 2,
            TextStyle::Title => 3,
            TextStyle::Subtitle => 4,
        }
    }

    /// Which font file renders this style.
    pub fn font_role(self) -> FontRole {
        match self {
            TextStyle::Normal => FontRole::Regular,
            TextStyle::Bold | TextStyle::Emph | TextStyle::Title | TextStyle::Subtitle => {
                FontRole::Bold
            }
        }
    }
}

/// The two font files a card is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parse a 6-digit hex color, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, CardError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(CardError::input_format(
                hex,
                "background color must have exactly 6 hex digits",
            ));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CardError::input_format(
                hex,
                "background color contains a non-hex character",
            ));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| CardError::input_format(hex, e.to_string()))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Add `delta` to every channel, saturating at 255.
    pub fn lighten(self, delta: u8) -> Self {
        Color::rgb(
            self.r.saturating_add(delta),
            self.g.saturating_add(delta),
            self.b.saturating_add(delta),
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}
