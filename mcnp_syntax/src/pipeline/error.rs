//! Pipeline errors
//!
//! [`RecordError`] keeps the full text of the record that failed so it can
//! be shown with the offending token marked, without going back to the file.

use crate::block_reader::{BlockReaderError, BlockType, RawRecord};
use crate::geometry::GeometryError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::SyntaxError;
use crate::utils::SourceMap;
use crate::writer::WriterError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A record that failed to parse, with everything needed to report it
#[derive(Debug, Clone)]
pub struct RecordError {
    pub path: PathBuf,
    pub first_line: u32,
    pub block: BlockType,
    pub text: String,
    pub errors: Vec<SyntaxError>,
}

impl RecordError {
    pub fn new(record: &RawRecord, errors: Vec<SyntaxError>) -> Self {
        Self {
            path: record.path.clone(),
            first_line: record.first_line,
            block: record.block,
            text: record.text(),
            errors,
        }
    }

    /// The first error queued for the record
    pub fn primary(&self) -> Option<&SyntaxError> {
        self.errors.first()
    }

    pub fn error_code(&self) -> Code {
        self.primary()
            .map(SyntaxError::error_code)
            .unwrap_or(codes::syntax::GRAMMAR_VIOLATION)
    }

    /// Unsupported input is never downgraded to a warning
    pub fn is_unsupported(&self) -> bool {
        self.errors.iter().any(SyntaxError::is_unsupported)
    }

    /// Absolute line of the primary error
    pub fn line(&self) -> u32 {
        self.primary()
            .and_then(SyntaxError::span)
            .map(|span| span.start.line + self.first_line.max(1) - 1)
            .unwrap_or(self.first_line)
    }

    pub fn column(&self) -> Option<u32> {
        self.primary().and_then(SyntaxError::span).map(|s| s.start.column)
    }

    /// Record text with a `^` marker under each offending token
    pub fn render(&self) -> String {
        let map = SourceMap::new(self.text.clone(), self.first_line);
        let mut out = format!(
            "{} record at {}:{}\n",
            self.block.as_str(),
            self.path.display(),
            self.first_line
        );
        for error in &self.errors {
            match error.span() {
                Some(span) => out.push_str(&map.format_error(&span, &error.to_string())),
                None => out.push_str(&format!("Error: {}\n", error)),
            }
        }
        out
    }

    pub fn summary(&self) -> RecordErrorSummary {
        RecordErrorSummary {
            code: self.error_code().as_str(),
            message: self
                .primary()
                .map(ToString::to_string)
                .unwrap_or_default(),
            path: self.path.display().to_string(),
            line: self.line(),
            column: self.column(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: ", self.path.display(), self.line())?;
        match self.primary() {
            Some(error) => write!(f, "{}", error)?,
            None => write!(f, "record rejected")?,
        }
        if self.errors.len() > 1 {
            write!(f, " (and {} more)", self.errors.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for RecordError {}

/// Serializable view of a record error
#[derive(Debug, Clone, Serialize)]
pub struct RecordErrorSummary {
    pub code: &'static str,
    pub message: String,
    pub path: String,
    pub line: u32,
    pub column: Option<u32>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Reader(#[from] BlockReaderError),

    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Reader(error) => error.error_code(),
            Self::Lexer(error) => error.error_code(),
            Self::Syntax(error) => error.error_code(),
            Self::Geometry(error) => error.error_code(),
            Self::Writer(error) => error.error_code(),
            Self::Record(error) => error.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    /// Long form for terminals; record errors show their source
    pub fn render(&self) -> String {
        match self {
            Self::Record(error) => error.render(),
            other => format!("Error: {}\n", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Position, Span};

    fn record_error(text: &str, span: Span) -> RecordError {
        let raw = RawRecord {
            block: BlockType::Cell,
            lines: text.split('\n').map(str::to_string).collect(),
            path: PathBuf::from("deck.i"),
            first_line: 3,
            include_depth: 0,
        };
        RecordError::new(&raw, vec![SyntaxError::unexpected_token("a number", ":", span)])
    }

    #[test]
    fn test_render_marks_token() {
        let span = Span::new(Position::new(9, 1, 10), Position::new(10, 1, 11));
        let error = record_error("1 0 -1 : : 2", span);
        let rendered = error.render();

        assert!(rendered.starts_with("cell record at deck.i:3"));
        assert!(rendered.contains(">    3| 1 0 -1 : : 2"));
        assert!(rendered.contains("         ^ not expected here."));
        assert_eq!(error.line(), 3);
        assert_eq!(error.column(), Some(10));
    }

    #[test]
    fn test_display_and_codes() {
        let span = Span::new(Position::new(0, 2, 1), Position::new(1, 2, 2));
        let error = record_error("1 0\n: 2", span);
        assert_eq!(error.line(), 4);
        assert!(error.to_string().starts_with("deck.i:4: Unexpected token"));
        assert!(!error.is_unsupported());

        let pipeline = PipelineError::from(error);
        assert_eq!(pipeline.error_code().as_str(), "E050");
        assert!(pipeline.render().contains("not expected here."));
    }

    #[test]
    fn test_reader_errors_convert() {
        let error = PipelineError::from(BlockReaderError::unsupported_version("4.0.0"));
        assert_eq!(error.error_code().as_str(), "E070");
    }
}
