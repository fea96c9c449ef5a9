//! # Textcard
//!
//! A line-native text card renderer.
//!
//! Paste product copy, get a fixed-width image. Every input line becomes
//! exactly one row on the card. A row that is too wide is never wrapped:
//! the whole row shrinks until it fits, because a line is an atomic unit
//! (one product claim) that must not split.
//!
//! ## Architecture
//!
//! ```text
//! Raw text + template + background
//!       ↓
//!   [text]     Classify lines, tokenize inline markup into styled runs
//!       ↓
//!   [layout]   Pass 1: canvas height from unscaled sizes
//!       ↓
//!   [card]     Background, shadow layer, rounded panel
//!       ↓
//!   [layout]   Pass 2: shrink-to-fit and draw each line
//!       ↓          (fonts resolved and cached through [font])
//!   [raster]   Flatten to RGB, encode JPEG/PNG
//! ```
//!
//! ## Markup
//!
//! `# title`, `## subtitle`, `**bold**`, `==highlight==`. Markup never spans
//! lines and never nests; an unmatched marker is plain text.

pub mod archive;
pub mod batch;
pub mod card;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod raster;
pub mod style;
pub mod text;

pub use card::{Card, CardRenderer};
pub use config::{FontPaths, RenderConfig};
pub use error::CardError;
pub use model::Template;

use std::path::Path;

/// Render one card with the default constants and fonts from `font_dir`.
///
/// This is the simplest entry point. To render many cards, build one
/// [`CardRenderer`] and reuse it so loaded fonts are shared.
pub fn render(
    text: &str,
    template: Template,
    background_hex: &str,
    font_dir: impl AsRef<Path>,
) -> Result<Card, CardError> {
    CardRenderer::with_font_dir(font_dir).render(text, template, background_hex)
}
