//! Rendering several product blocks in one go.
//!
//! Blank blocks are skipped but keep their position in the numbering, so
//! `product_<n>.jpg` always refers to the n-th block the caller supplied.
//! The batch is all-or-nothing: the first failing block aborts it.

use crate::archive::ZipWriter;
use crate::card::{Card, CardRenderer};
use crate::error::{CardError, Result};
use crate::model::Template;
use crate::text::split_lines;

/// A line consisting only of this separates blocks in batch input.
pub const BLOCK_SEPARATOR: &str = "---";

/// Split batch input into blocks on separator lines. Blocks keep their
/// inner line breaks; the separator lines themselves are dropped.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in split_lines(text) {
        if line.trim() == BLOCK_SEPARATOR {
            blocks.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    blocks.push(current.join("\n"));
    blocks
}

/// Archive file name for the block at 1-based position `n`.
pub fn batch_file_name(n: usize) -> String {
    format!("product_{n}.jpg")
}

/// One rendered block.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// 1-based position of the block in the input.
    pub block: usize,
    pub file_name: String,
    pub card: Card,
}

impl CardRenderer {
    /// Render every non-blank block, in input order.
    pub fn render_batch<S: AsRef<str>>(
        &self,
        blocks: &[S],
        template: Template,
        background_hex: &str,
    ) -> Result<Vec<BatchEntry>> {
        let mut entries = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            let n = i + 1;
            let text = block.as_ref();
            if text.trim().is_empty() {
                log::debug!("skipping blank block {n}");
                continue;
            }
            let card = self
                .render(text, template, background_hex)
                .map_err(|e| CardError::Batch {
                    block: n,
                    source: Box::new(e),
                })?;
            entries.push(BatchEntry {
                block: n,
                file_name: batch_file_name(n),
                card,
            });
        }

        if entries.is_empty() {
            return Err(CardError::EmptyInput);
        }
        log::info!("rendered batch of {} cards", entries.len());
        Ok(entries)
    }
}

/// Encode every card as JPEG and package them into one zip archive.
pub fn write_zip(entries: &[BatchEntry], jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new();
    for entry in entries {
        let jpeg = entry.card.encode_jpeg(jpeg_quality)?;
        zip.add_file(&entry.file_name, &jpeg)?;
    }
    zip.finish()
}
