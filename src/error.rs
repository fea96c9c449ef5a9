//! Structured error types for the card renderer.
//!
//! Markup never fails: unterminated markers degrade to literal text. The
//! real error sources are bad caller input, font loading, and encoding or
//! writing the finished artifact.

use std::path::PathBuf;

/// The unified error type returned by all public textcard API functions.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// A caller-supplied value (background color, template name) is malformed.
    #[error("Invalid input '{value}': {reason}")]
    InputFormat { value: String, reason: String },

    /// A font file is missing, unreadable, or not a font. There is no
    /// fallback face.
    #[error("Failed to load font '{}': {reason}", .path.display())]
    FontLoad { path: PathBuf, reason: String },

    /// The text to render is empty or whitespace-only.
    #[error("Input text is empty; paste some text first")]
    EmptyInput,

    /// JPEG or PNG encoding failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The layout report could not be written as JSON.
    #[error("Failed to serialize layout: {0}")]
    Json(#[from] serde_json::Error),

    /// One block of a batch failed. The whole batch is abandoned.
    #[error("Block {block} failed: {source}")]
    Batch {
        block: usize,
        #[source]
        source: Box<CardError>,
    },
}

impl CardError {
    pub(crate) fn input_format(value: impl Into<String>, reason: impl Into<String>) -> Self {
        CardError::InputFormat {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn font_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CardError::FontLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
