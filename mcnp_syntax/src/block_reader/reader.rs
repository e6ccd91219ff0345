//! Line scanner that splits an input deck into message, title and records

use super::error::BlockReaderError;
use super::version::FormatVersion;
use crate::config::compile_time::block_reader::{
    BLANK_SPACE_CONTINUE, MAX_BLOCKS, MAX_FILE_SIZE, MAX_INCLUDE_DEPTH, TAB_SIZE,
};
use crate::config::constants::format::{CONTINUATION_MARKER, INLINE_COMMENT, MESSAGE_PREFIX};
use crate::logging::codes;
use crate::utils::Warning;
use crate::{log_debug, log_error, log_success};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// The three blank-line separated sections of a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Cell,
    Surface,
    Data,
}

impl BlockType {
    fn from_index(index: usize) -> Self {
        match index {
            0 => BlockType::Cell,
            1 => BlockType::Surface,
            _ => BlockType::Data,
        }
    }

    fn index(&self) -> usize {
        match self {
            BlockType::Cell => 0,
            BlockType::Surface => 1,
            BlockType::Data => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Cell => "cell",
            BlockType::Surface => "surface",
            BlockType::Data => "data",
        }
    }
}

/// One logical record after continuation joining
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub block: BlockType,
    /// Physical lines, right-trimmed and truncated to the column limit
    pub lines: Vec<String>,
    pub path: PathBuf,
    /// Line number of the first physical line in `path`
    pub first_line: u32,
    /// 0 for the root file, 1 for a file it READs, and so on
    pub include_depth: usize,
}

impl RawRecord {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether the first non-comment word is READ
    pub fn is_read_directive(&self) -> bool {
        self.lines
            .iter()
            .find(|line| !is_comment_line(line))
            .and_then(|line| line.split_whitespace().next())
            .is_some_and(|word| word.eq_ignore_ascii_case("read"))
    }

    /// File named by `FILE=name` in a READ record
    pub fn read_target(&self) -> Option<String> {
        if !self.is_read_directive() {
            return None;
        }

        let words: Vec<&str> = self
            .lines
            .iter()
            .filter(|line| !is_comment_line(line))
            .flat_map(|line| {
                let code = line.split(INLINE_COMMENT).next().unwrap_or("");
                code.split(|c: char| c.is_whitespace() || c == '=' || c == '&')
            })
            .filter(|word| !word.is_empty())
            .collect();

        words
            .iter()
            .position(|word| word.eq_ignore_ascii_case("file"))
            .and_then(|index| words.get(index + 1))
            .map(|word| word.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReaderItem {
    /// Raw lines of the message block, first line included
    Message(Vec<String>),
    Title(String),
    Record(RawRecord),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReaderOutput {
    pub items: Vec<ReaderItem>,
    pub warnings: Vec<Warning>,
    /// The root file closed its data block with a blank line
    pub data_block_terminated: bool,
}

impl ReaderOutput {
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.items.iter().filter_map(|item| match item {
            ReaderItem::Record(record) => Some(record),
            _ => None,
        })
    }
}

// ============================================================================
// LINE CLASSIFICATION
// ============================================================================

/// A full-line comment: `c`/`C` within the first five columns followed by
/// whitespace or the end of the line
pub fn is_comment_line(line: &str) -> bool {
    let indent = line.len() - line.trim_start().len();
    if indent >= BLANK_SPACE_CONTINUE {
        return false;
    }
    let rest = &line[indent..];
    let mut chars = rest.chars();
    match chars.next() {
        Some('c') | Some('C') => chars.next().map_or(true, |c| c.is_whitespace()),
        _ => false,
    }
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut expanded = String::with_capacity(line.len() + TAB_SIZE);
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let fill = TAB_SIZE - (column % TAB_SIZE);
            expanded.push_str(&" ".repeat(fill));
            column += fill;
        } else {
            expanded.push(ch);
            column += 1;
        }
    }
    expanded
}

fn head(line: &str) -> &str {
    match line.char_indices().nth(BLANK_SPACE_CONTINUE) {
        Some((offset, _)) => &line[..offset],
        None => line,
    }
}

// ============================================================================
// BLOCK READER
// ============================================================================

/// Pending record state for one file
struct RecordAccumulator {
    block_index: usize,
    pending: Vec<String>,
    first_line: u32,
    continue_record: bool,
    has_non_comments: bool,
}

impl RecordAccumulator {
    fn new(block: BlockType) -> Self {
        Self {
            block_index: block.index(),
            pending: Vec::new(),
            first_line: 0,
            continue_record: false,
            has_non_comments: false,
        }
    }
}

pub struct BlockReader {
    version: FormatVersion,
    line_length: usize,
    replace_non_ascii: bool,
    items: Vec<ReaderItem>,
    warnings: Vec<Warning>,
    root_dir: PathBuf,
    extra_blocks_reported: bool,
}

impl BlockReader {
    pub fn new(version: FormatVersion, replace_non_ascii: bool) -> Result<Self, BlockReaderError> {
        let line_length = version.line_length()?;
        Ok(Self {
            version,
            line_length,
            replace_non_ascii,
            items: Vec::new(),
            warnings: Vec::new(),
            root_dir: PathBuf::new(),
            extra_blocks_reported: false,
        })
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn line_length(&self) -> usize {
        self.line_length
    }

    /// Read a deck and every file it includes
    pub fn read_file(self, path: &Path) -> Result<ReaderOutput, BlockReaderError> {
        let text = self.load(path)?;
        self.read_str(&text, path)
    }

    /// Read a deck already in memory; `path` labels records and anchors READ paths
    pub fn read_str(mut self, text: &str, path: &Path) -> Result<ReaderOutput, BlockReaderError> {
        self.root_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let lines = self.normalize(text, path);
        if lines.iter().all(|line| line.trim().is_empty()) {
            let error = BlockReaderError::EmptyFile {
                path: path.to_path_buf(),
            };
            log_error!(error.error_code(), "Input has no content", "path" => path.display());
            return Err(error);
        }

        let body_start = self.read_front_matter(&lines);
        let final_block = self.read_blocks(&lines, body_start, path, BlockType::Cell, 0)?;

        let record_count = self
            .items
            .iter()
            .filter(|item| matches!(item, ReaderItem::Record(_)))
            .count();
        log_success!(
            codes::success::BLOCKS_READ,
            "Input split into records",
            "path" => path.display(),
            "records" => record_count,
            "warnings" => self.warnings.len()
        );

        Ok(ReaderOutput {
            items: self.items,
            warnings: self.warnings,
            data_block_terminated: final_block >= MAX_BLOCKS,
        })
    }

    fn load(&self, path: &Path) -> Result<String, BlockReaderError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = BlockReaderError::io_error(path, &e);
            log_error!(error.error_code(), "Cannot access input", "path" => path.display());
            error
        })?;

        if metadata.len() > MAX_FILE_SIZE {
            let error = BlockReaderError::FileTooLarge {
                size: metadata.len(),
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "Input exceeds size limit",
                "path" => path.display(),
                "size" => metadata.len()
            );
            return Err(error);
        }

        let bytes = fs::read(path).map_err(|e| BlockReaderError::io_error(path, &e))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) if self.replace_non_ascii => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            Err(e) => {
                let error = BlockReaderError::InvalidEncoding {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                log_error!(error.error_code(), "Input is not valid UTF-8", "path" => path.display());
                return Err(error);
            }
        };

        log_success!(codes::success::FILE_READ_SUCCESS, "Input file loaded",
            "path" => path.display(),
            "bytes" => metadata.len()
        );
        Ok(text)
    }

    /// Split into lines, replace non-ASCII characters and expand tabs
    fn normalize(&mut self, text: &str, path: &Path) -> Vec<String> {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let mut line = expand_tabs(raw);
            if self.replace_non_ascii && !line.is_ascii() {
                line = line
                    .chars()
                    .map(|c| if c.is_ascii() { c } else { ' ' })
                    .collect();
                self.warnings.push(
                    Warning::new(
                        codes::warnings::NON_ASCII_REPLACED,
                        "Non-ASCII characters replaced with spaces",
                    )
                    .at(path, index as u32 + 1),
                );
            }
            lines.push(line);
        }
        lines
    }

    /// Emit the message block and title; returns the index of the first body line
    fn read_front_matter(&mut self, lines: &[String]) -> usize {
        let mut index = 0;

        let opens_message = lines
            .first()
            .is_some_and(|line| line.to_uppercase().starts_with(MESSAGE_PREFIX));
        if opens_message {
            let mut message = Vec::new();
            while let Some(line) = lines.get(index) {
                index += 1;
                if line.trim().is_empty() {
                    break;
                }
                message.push(line.trim_end().to_string());
            }
            self.items.push(ReaderItem::Message(message));
        }

        if let Some(title) = lines.get(index) {
            self.items
                .push(ReaderItem::Title(title.trim_end().to_string()));
            index += 1;
        }

        index
    }

    /// Read records from `lines[start..]`, then any files they READ.
    ///
    /// Returns the block counter reached at the end of this file.
    fn read_blocks(
        &mut self,
        lines: &[String],
        start: usize,
        path: &Path,
        block: BlockType,
        depth: usize,
    ) -> Result<usize, BlockReaderError> {
        let mut state = RecordAccumulator::new(block);
        let mut inclusions: Vec<(BlockType, String)> = Vec::new();

        for (index, raw_line) in lines.iter().enumerate().skip(start) {
            let line_number = index as u32 + 1;

            if state.block_index >= MAX_BLOCKS {
                if !raw_line.trim().is_empty() && !self.extra_blocks_reported {
                    self.extra_blocks_reported = true;
                    self.warnings.push(
                        Warning::new(
                            codes::warnings::EXTRA_BLOCKS,
                            "Content after the data block is ignored",
                        )
                        .at(path, line_number),
                    );
                }
                continue;
            }

            if raw_line.trim().is_empty() {
                self.flush(&mut state, path, depth, &mut inclusions);
                state.block_index += 1;
                state.has_non_comments = false;
                state.continue_record = false;
                log_debug!("Block boundary", "line" => line_number, "block" => state.block_index);
                continue;
            }

            let comment = is_comment_line(raw_line);
            let starts_record = !head(raw_line).trim().is_empty()
                && !state.continue_record
                && !comment
                && state.has_non_comments
                && !state.pending.is_empty();
            if starts_record {
                self.flush(&mut state, path, depth, &mut inclusions);
            }

            if !comment && head(raw_line).contains('#') {
                let error = BlockReaderError::vertical_format(path, line_number);
                log_error!(error.error_code(), "Vertical input format found",
                    "path" => path.display(),
                    "line" => line_number
                );
                return Err(error);
            }

            let line = self.truncate(raw_line, comment, path, line_number);
            state.continue_record = line.ends_with(CONTINUATION_MARKER);
            state.has_non_comments = state.has_non_comments || !comment;
            if state.pending.is_empty() {
                state.first_line = line_number;
            }
            state.pending.push(line);
        }
        self.flush(&mut state, path, depth, &mut inclusions);

        for (block, target) in inclusions {
            self.include(&target, block, depth + 1)?;
        }

        Ok(state.block_index)
    }

    fn truncate(&mut self, line: &str, comment: bool, path: &Path, line_number: u32) -> String {
        let trimmed = line.trim_end();
        let Some((cut, _)) = trimmed.char_indices().nth(self.line_length) else {
            return trimmed.to_string();
        };

        let overflow_is_comment = comment
            || trimmed
                .char_indices()
                .take(self.line_length)
                .any(|(_, c)| c == INLINE_COMMENT);
        if overflow_is_comment {
            return trimmed.to_string();
        }

        self.warnings.push(
            Warning::new(
                codes::warnings::LINE_OVERRUN,
                format!(
                    "Line exceeds {} columns for version {} and was truncated",
                    self.line_length, self.version
                ),
            )
            .at(path, line_number),
        );
        trimmed[..cut].trim_end().to_string()
    }

    fn flush(
        &mut self,
        state: &mut RecordAccumulator,
        path: &Path,
        depth: usize,
        inclusions: &mut Vec<(BlockType, String)>,
    ) {
        if state.pending.is_empty() {
            return;
        }

        let record = RawRecord {
            block: BlockType::from_index(state.block_index),
            lines: std::mem::take(&mut state.pending),
            path: path.to_path_buf(),
            first_line: state.first_line,
            include_depth: depth,
        };
        state.continue_record = false;

        if let Some(target) = record.read_target() {
            log_debug!("READ directive queued", "file" => target, "block" => record.block.as_str());
            inclusions.push((record.block, target));
        }
        self.items.push(ReaderItem::Record(record));
    }

    fn include(&mut self, target: &str, block: BlockType, depth: usize) -> Result<(), BlockReaderError> {
        let path = self.root_dir.join(target);
        if depth > MAX_INCLUDE_DEPTH {
            let error = BlockReaderError::IncludeTooDeep {
                path: path.clone(),
                max_depth: MAX_INCLUDE_DEPTH,
            };
            log_error!(error.error_code(), "READ nesting limit reached", "path" => path.display());
            return Err(error);
        }

        let text = self.load(&path)?;
        let lines = self.normalize(&text, &path);
        self.read_blocks(&lines, 0, &path, block, depth)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn read(text: &str) -> ReaderOutput {
        BlockReader::new(FormatVersion::default(), true)
            .unwrap()
            .read_str(text, Path::new("deck.i"))
            .unwrap()
    }

    fn record_texts(output: &ReaderOutput) -> Vec<(BlockType, String)> {
        output.records().map(|r| (r.block, r.text())).collect()
    }

    #[test]
    fn test_comment_line_detection() {
        assert!(is_comment_line("c a comment"));
        assert!(is_comment_line("   C"));
        assert!(is_comment_line("c"));
        assert!(!is_comment_line("cx 5"));
        assert!(!is_comment_line("      c too far right"));
    }

    #[test]
    fn test_blocks_and_continuations() {
        let output = read(
            "title line\n1 0 -1\n     2\n2 0 1 &\n3\n\n1 PZ 0\n\nimp:n 1 1\n",
        );

        assert_matches!(&output.items[0], ReaderItem::Title(t) if t == "title line");
        assert_eq!(
            record_texts(&output),
            vec![
                (BlockType::Cell, "1 0 -1\n     2".to_string()),
                (BlockType::Cell, "2 0 1 &\n3".to_string()),
                (BlockType::Surface, "1 PZ 0".to_string()),
                (BlockType::Data, "imp:n 1 1".to_string()),
            ]
        );
        assert!(!output.data_block_terminated);
    }

    #[test]
    fn test_message_block() {
        let output = read("message: ina=deck.i\nmore\n\nthe title\n1 0 -1\n");
        assert_matches!(&output.items[0], ReaderItem::Message(lines) if lines.len() == 2);
        assert_matches!(&output.items[1], ReaderItem::Title(t) if t == "the title");
    }

    #[test]
    fn test_leading_comments_attach_to_first_record() {
        let output = read("t\nc first\n1 0 -1\nc between\n2 0 1\n");
        let records = record_texts(&output);
        assert_eq!(records[0].1, "c first\n1 0 -1\nc between");
        assert_eq!(records[1].1, "2 0 1");
        assert_eq!(output.records().next().map(|r| r.first_line), Some(2));
    }

    #[test]
    fn test_tabs_expand() {
        let output = read("t\n1\t0 -1\n");
        assert_eq!(record_texts(&output)[0].1, "1       0 -1");
    }

    #[test]
    fn test_line_overrun_truncates() {
        let long = format!("t\n1 0 -1 {}9\n", "2 ".repeat(70));
        let output = read(&long);
        let text = &record_texts(&output)[0].1;
        assert!(text.len() <= 128);
        assert!(output
            .warnings
            .iter()
            .any(|w| w.code == codes::warnings::LINE_OVERRUN));
    }

    #[test]
    fn test_overrun_inside_comment_kept() {
        let line = format!("1 0 -1 $ {}", "x".repeat(200));
        let output = read(&format!("t\n{}\n", line));
        assert_eq!(record_texts(&output)[0].1, line);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_vertical_format_rejected() {
        let result = BlockReader::new(FormatVersion::default(), true)
            .unwrap()
            .read_str("t\n# imp:n\n", Path::new("deck.i"));
        assert_matches!(result, Err(BlockReaderError::UnsupportedFeature { line: 2, .. }));
    }

    #[test]
    fn test_extra_blocks_warn_once() {
        let output = read("t\n1 0 -1\n\n1 pz 0\n\nm1 1001 1\n\njunk\n\nmore junk\n");
        assert!(output.data_block_terminated);
        let extra = output
            .warnings
            .iter()
            .filter(|w| w.code == codes::warnings::EXTRA_BLOCKS)
            .count();
        assert_eq!(extra, 1);
        assert_eq!(output.records().count(), 3);
    }

    #[test]
    fn test_non_ascii_replaced() {
        let output = read("t\n1 0 -1 $ caf\u{e9}\n");
        assert_eq!(record_texts(&output)[0].1, "1 0 -1 $ caf");
        assert_eq!(output.warnings[0].code, codes::warnings::NON_ASCII_REPLACED);
    }

    #[test]
    fn test_empty_input() {
        let result = BlockReader::new(FormatVersion::default(), true)
            .unwrap()
            .read_str("\n\n", Path::new("deck.i"));
        assert_matches!(result, Err(BlockReaderError::EmptyFile { .. }));
    }

    #[test]
    fn test_read_inclusion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cells.i"), "5 0 -5\n6 0 5\n").unwrap();
        let root = dir.path().join("deck.i");
        fs::write(&root, "t\n1 0 -1\nread file=cells.i\n\n1 pz 0\n").unwrap();

        let output = BlockReader::new(FormatVersion::default(), true)
            .unwrap()
            .read_file(&root)
            .unwrap();
        let records: Vec<_> = output.records().collect();

        assert_eq!(records.len(), 5);
        assert!(records[1].is_read_directive());
        assert_eq!(records[1].read_target().as_deref(), Some("cells.i"));
        assert_eq!(records[3].text(), "5 0 -5");
        assert_eq!(records[3].block, BlockType::Cell);
        assert_eq!(records[3].include_depth, 1);
        assert_eq!(records[4].text(), "6 0 5");
    }

    #[test]
    fn test_missing_included_file() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("deck.i");
        fs::write(&root, "t\nread file=missing.i\n").unwrap();

        let result = BlockReader::new(FormatVersion::default(), true)
            .unwrap()
            .read_file(&root);
        assert_matches!(result, Err(BlockReaderError::FileNotFound { .. }));
    }

    #[test]
    fn test_self_inclusion_hits_depth_limit() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("deck.i");
        fs::write(&root, "t\nread file=loop.i\n").unwrap();
        fs::write(dir.path().join("loop.i"), "read file=loop.i\n").unwrap();

        let result = BlockReader::new(FormatVersion::default(), true)
            .unwrap()
            .read_file(&root);
        assert_matches!(result, Err(BlockReaderError::IncludeTooDeep { .. }));
    }
}
