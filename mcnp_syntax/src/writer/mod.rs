//! Deck output
//!
//! Records come in already formatted; the writer lays them out in blocks
//! and folds any physical line that grew past the column limit of the
//! target version onto continuation lines.

mod error;

pub use error::WriterError;

use crate::block_reader::{is_comment_line, FormatVersion};
use crate::config::compile_time::formatting::CONTINUATION_INDENT;
use crate::config::constants::format::INLINE_COMMENT;
use crate::logging::codes;
use crate::utils::Warning;
use crate::{log_debug, log_success};
use std::fs;
use std::path::Path;

/// Formatted pieces of a deck, in block order
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub message: Option<Vec<String>>,
    pub title: String,
    pub cells: Vec<String>,
    pub surfaces: Vec<String>,
    pub data: Vec<String>,
    /// Close the data block with a blank line
    pub data_block_terminated: bool,
}

#[derive(Debug, Clone)]
pub struct Writer {
    line_length: usize,
    indent: usize,
    warnings: Vec<Warning>,
}

impl Writer {
    pub fn new(version: FormatVersion) -> Result<Self, WriterError> {
        Self::with_line_length(version.line_length()?)
    }

    pub fn with_line_length(line_length: usize) -> Result<Self, WriterError> {
        let indent = CONTINUATION_INDENT;
        if line_length <= indent {
            return Err(WriterError::WidthTooSmall { width: line_length });
        }
        Ok(Self {
            line_length,
            indent,
            warnings: Vec::new(),
        })
    }

    pub fn line_length(&self) -> usize {
        self.line_length
    }

    /// Lines that could not be brought under the limit
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Fold every over-long physical line of a record
    pub fn wrap(&mut self, record: &str) -> String {
        let mut lines = Vec::new();
        for line in record.split('\n') {
            self.wrap_line(line, &mut lines);
        }
        lines.join("\n")
    }

    fn wrap_line(&mut self, line: &str, out: &mut Vec<String>) {
        if fits(line, self.line_length) || is_comment_line(line) {
            out.push(line.to_string());
            return;
        }

        let continuation = " ".repeat(self.indent);
        let mut rest = line.to_string();
        loop {
            let code_end = rest.find(INLINE_COMMENT).unwrap_or(rest.len());
            // An overflow inside a trailing comment is left alone
            if fits(rest[..code_end].trim_end(), self.line_length) {
                out.push(rest);
                return;
            }
            let Some(split) = break_point(&rest, code_end, self.line_length) else {
                self.warnings.push(Warning::new(
                    codes::warnings::LINE_EXPANSION,
                    format!(
                        "A token does not fit within {} columns: {}",
                        self.line_length,
                        rest.trim()
                    ),
                ));
                out.push(rest);
                return;
            };
            out.push(rest[..split].trim_end().to_string());
            rest = format!("{}{}", continuation, rest[split..].trim_start());
        }
    }

    /// Lay out a whole deck
    pub fn write_deck(&mut self, deck: &Deck) -> String {
        let mut out = String::new();
        if let Some(message) = &deck.message {
            for line in message {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str(&deck.title);
        out.push('\n');

        // A block separator is written only when something follows it
        let blocks = [&deck.cells, &deck.surfaces, &deck.data];
        for (index, block) in blocks.iter().enumerate() {
            for record in block.iter() {
                out.push_str(&self.wrap(record));
                out.push('\n');
            }
            let more_follows = blocks[index + 1..].iter().any(|b| !b.is_empty());
            let closes_data = index == blocks.len() - 1 && deck.data_block_terminated;
            if more_follows || closes_data {
                out.push('\n');
            }
        }

        log_debug!("Deck laid out",
            "cells" => deck.cells.len(),
            "surfaces" => deck.surfaces.len(),
            "data" => deck.data.len()
        );
        out
    }

    pub fn write_file(&mut self, deck: &Deck, path: &Path) -> Result<(), WriterError> {
        let text = self.write_deck(deck);
        fs::write(path, &text).map_err(|e| WriterError::io_error(path, &e))?;
        log_success!(codes::success::OUTPUT_WRITTEN, "Deck written",
            "path" => path.display(),
            "bytes" => text.len()
        );
        Ok(())
    }
}

fn fits(text: &str, width: usize) -> bool {
    text.chars().count() <= width
}

/// Byte index of the last blank within the first `width` columns that lies
/// before any comment and after the first token
fn break_point(line: &str, code_end: usize, width: usize) -> Option<usize> {
    let first_token = line.len() - line.trim_start().len();
    line.char_indices()
        .take(width + 1)
        .filter(|(index, ch)| ch.is_whitespace() && *index > first_token && *index < code_end)
        .map(|(index, _)| index)
        .filter(|index| !line[..*index].trim().is_empty())
        .last()
}
