//! Contextual lexical analyzer
//!
//! A hand-written scanner over one record. At each position the candidate
//! lexemes are tried in a fixed priority order; word classification then
//! depends on the block the record came from.

use crate::config::compile_time::block_reader::BLANK_SPACE_CONTINUE;
use crate::config::compile_time::lexical::{MAX_TOKEN_COUNT, MAX_TOKEN_LENGTH};
use crate::config::constants::vocabulary::{is_keyword, is_particle, is_surface_type};
use crate::logging::codes;
use crate::tokens::{classify_shortcut, ShortcutKind, Token, TokenKind, TokenStream};
use crate::utils::numeric::fortran_float;
use crate::utils::{Position, SourceMap, Span};
use crate::{log_debug, log_error};
use serde::{Deserialize, Serialize};

/// Characters that form particle designators in the data block
const PARTICLE_SPECIAL_CHARS: &str = "|+-!<>/%^_~@*?";

/// Which vocabulary the scanner classifies words against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexerMode {
    Cell,
    Surface,
    Data,
    /// READ records, where most words are file names
    Read,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character: '{character}' at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
        span: Span,
    },

    #[error("Token too long: {length} characters (max {MAX_TOKEN_LENGTH})")]
    TokenTooLong { length: usize, span: Span },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::TokenTooLong { .. } => codes::lexical::TOKEN_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::InvalidCharacter { span, .. } | LexerError::TokenTooLong { span, .. } => {
                Some(*span)
            }
            LexerError::TooManyTokens { .. } => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub padding_tokens: usize,
    pub comment_count: usize,
    pub shortcut_tokens: usize,
    pub number_tokens: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, kind: TokenKind) {
        self.total_tokens += 1;
        match kind {
            TokenKind::Comment | TokenKind::DollarComment => {
                self.comment_count += 1;
                self.padding_tokens += 1;
            }
            kind if kind.is_padding() => self.padding_tokens += 1,
            TokenKind::Shortcut(_) => self.shortcut_tokens += 1,
            TokenKind::Number | TokenKind::Null => self.number_tokens += 1,
            _ => {}
        }
    }
}

// ============================================================================
// SCANNING PRIMITIVES
// ============================================================================

fn digits_at(bytes: &[u8], start: usize) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

fn letters_at(bytes: &[u8], start: usize) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count()
}

fn byte_at(bytes: &[u8], index: usize) -> Option<u8> {
    bytes.get(index).copied()
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset)
}

/// `dddd[dd].ddX` or `dddd[dd].dddXX`
fn scan_zaid(bytes: &[u8], start: usize) -> Option<usize> {
    let digits = digits_at(bytes, start);
    if !(4..=6).contains(&digits) || byte_at(bytes, start + digits) != Some(b'.') {
        return None;
    }
    let suffix = start + digits + 1;
    let suffix_digits = digits_at(bytes, suffix);
    let suffix_letters = letters_at(bytes, suffix + suffix_digits);
    match (suffix_digits, suffix_letters) {
        (2, n) if n >= 1 => Some(digits + 1 + 3),
        (3, n) if n >= 2 => Some(digits + 1 + 5),
        _ => None,
    }
}

/// `[a-z][a-z0-9/-]+\.\d+[a-z]`, e.g. `lwtr.10t`
fn scan_thermal_law(bytes: &[u8], start: usize) -> Option<usize> {
    if !byte_at(bytes, start)?.is_ascii_alphabetic() {
        return None;
    }
    let body = bytes[start + 1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'/' || **b == b'-')
        .count();
    if body == 0 {
        return None;
    }
    let dot = start + 1 + body;
    if byte_at(bytes, dot) != Some(b'.') {
        return None;
    }
    let digits = digits_at(bytes, dot + 1);
    if digits == 0 || !byte_at(bytes, dot + 1 + digits)?.is_ascii_alphabetic() {
        return None;
    }
    Some(dot + 1 + digits + 1 - start)
}

/// `[+-]?\d+` followed by letters that do not start with `e`
fn scan_number_word(bytes: &[u8], start: usize) -> Option<usize> {
    let sign = usize::from(matches!(byte_at(bytes, start), Some(b'+' | b'-')));
    let digits = digits_at(bytes, start + sign);
    if digits == 0 {
        return None;
    }
    let letters_start = start + sign + digits;
    match byte_at(bytes, letters_start) {
        Some(b'e' | b'E') | None => None,
        Some(b) if b.is_ascii_alphabetic() => {
            Some(sign + digits + letters_at(bytes, letters_start))
        }
        _ => None,
    }
}

/// Fortran-style number: mantissa with an optional exponent whose letter may
/// be omitted (`1.2+3`)
fn scan_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut index = start;
    if matches!(byte_at(bytes, index), Some(b'+' | b'-')) {
        index += 1;
    }
    let integer = digits_at(bytes, index);
    index += integer;
    let mut fraction = 0;
    if byte_at(bytes, index) == Some(b'.') {
        fraction = digits_at(bytes, index + 1);
        if integer == 0 && fraction == 0 {
            return None;
        }
        index += 1 + fraction;
    }
    if integer == 0 && fraction == 0 {
        return None;
    }

    let mut exponent = index;
    if matches!(byte_at(bytes, exponent), Some(b'e' | b'E')) {
        exponent += 1;
    }
    if matches!(byte_at(bytes, exponent), Some(b'+' | b'-')) {
        exponent += 1;
    }
    if exponent > index {
        let exponent_digits = digits_at(bytes, exponent);
        if exponent_digits > 0 {
            index = exponent + exponent_digits;
        }
    }

    Some(index - start)
}

/// `[a-z]+[a-z./]*`
fn scan_text(bytes: &[u8], start: usize) -> usize {
    let letters = letters_at(bytes, start);
    if letters == 0 {
        return 0;
    }
    letters
        + bytes[start + letters..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic() || **b == b'.' || **b == b'/')
            .count()
}

// ============================================================================
// ANALYZER
// ============================================================================

pub struct LexicalAnalyzer {
    mode: LexerMode,
    metrics: LexicalMetrics,
}

impl LexicalAnalyzer {
    pub fn new(mode: LexerMode) -> Self {
        Self {
            mode,
            metrics: LexicalMetrics::default(),
        }
    }

    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize one record; `first_line` is its line number in the input file
    pub fn tokenize(&mut self, source: &str, first_line: u32) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        let bytes = source.as_bytes();
        let mut tokens = Vec::new();
        let mut position = Position::start();
        let mut line_start = 0usize;
        let mut index = 0usize;

        while index < bytes.len() {
            if tokens.len() >= MAX_TOKEN_COUNT {
                let error = LexerError::TooManyTokens {
                    count: tokens.len(),
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    "limit" => MAX_TOKEN_COUNT
                );
                return Err(error);
            }

            let (kind, length) = self.next_lexeme(source, index, line_start, position)?;
            let text = &source[index..index + length];

            let end = position.advance_str(text);
            let span = Span::new(position, end);
            if length > MAX_TOKEN_LENGTH && !kind.is_padding() {
                let error = LexerError::TokenTooLong { length, span };
                log_error!(error.error_code(), "Token exceeds length limit", span = span);
                return Err(error);
            }

            if let Some(newline) = text.rfind('\n') {
                line_start = index + newline + 1;
            }
            self.metrics.record_token(kind);
            tokens.push(Token::new(kind, text, span));
            position = end;
            index += length;
        }

        log_debug!("Record tokenized",
            "mode" => format!("{:?}", self.mode),
            "tokens" => self.metrics.total_tokens,
            "comments" => self.metrics.comment_count,
            "shortcuts" => self.metrics.shortcut_tokens
        );

        Ok(TokenStream::with_source_map(
            tokens,
            SourceMap::new(source.to_string(), first_line),
        ))
    }

    /// Classify the lexeme starting at `index`; returns its kind and byte length
    fn next_lexeme(
        &self,
        source: &str,
        index: usize,
        line_start: usize,
        position: Position,
    ) -> Result<(TokenKind, usize), LexerError> {
        let bytes = source.as_bytes();
        let byte = bytes[index];

        if byte == b'#' {
            return Ok((TokenKind::Complement, 1));
        }
        if byte == b'$' {
            return Ok((TokenKind::DollarComment, line_end(bytes, index) - index));
        }
        if self.starts_line_comment(bytes, index, line_start) {
            return Ok((TokenKind::Comment, line_end(bytes, index) - index));
        }
        if byte.is_ascii_whitespace() {
            let length = bytes[index..]
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            return Ok((TokenKind::Space, length));
        }

        if self.mode == LexerMode::Read {
            return Ok(self.read_mode_lexeme(source, index));
        }

        if let Some(length) = scan_zaid(bytes, index) {
            return Ok((TokenKind::Zaid, length));
        }
        if let Some(length) = scan_thermal_law(bytes, index) {
            return Ok((TokenKind::ThermalLaw, length));
        }
        if let Some(length) = scan_number_word(bytes, index) {
            let text = &source[index..index + length];
            let kind = match classify_shortcut(text) {
                Some(shortcut) => TokenKind::Shortcut(shortcut),
                None => TokenKind::NumberWord,
            };
            return Ok((kind, length));
        }
        if let Some(length) = scan_number(bytes, index) {
            return Ok(self.classify_number(source, index, length));
        }

        let text_length = scan_text(bytes, index);
        if text_length > 0 {
            let word = &source[index..index + text_length];
            return Ok((self.classify_word(word), text_length));
        }

        if self.mode == LexerMode::Data && PARTICLE_SPECIAL_CHARS.contains(byte as char) {
            let length = bytes[index..]
                .iter()
                .take_while(|b| PARTICLE_SPECIAL_CHARS.contains(**b as char))
                .count();
            return Ok((TokenKind::ParticleSpecial, length));
        }

        let literal = match byte {
            b'(' => Some(TokenKind::LeftParen),
            b')' => Some(TokenKind::RightParen),
            b':' => Some(TokenKind::Colon),
            b'&' => Some(TokenKind::Ampersand),
            b'=' => Some(TokenKind::Equals),
            b'*' => Some(TokenKind::Asterisk),
            b'+' => Some(TokenKind::Plus),
            b',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = literal {
            return Ok((kind, 1));
        }

        let character = source[index..].chars().next().unwrap_or('\u{fffd}');
        let end = position.advance(character);
        let error = LexerError::InvalidCharacter {
            character,
            line: position.line,
            column: position.column,
            span: Span::new(position, end),
        };
        log_error!(error.error_code(), "Invalid character in record",
            span = Span::new(position, end),
            "character" => character
        );
        Err(error)
    }

    /// `c`/`C` within the first five columns of a line, followed by
    /// whitespace or the end of the line
    fn starts_line_comment(&self, bytes: &[u8], index: usize, line_start: usize) -> bool {
        if !matches!(bytes[index], b'c' | b'C') {
            return false;
        }
        let prefix = &bytes[line_start..index];
        if prefix.len() >= BLANK_SPACE_CONTINUE || !prefix.iter().all(|&b| b == b' ') {
            return false;
        }
        byte_at(bytes, index + 1).map_or(true, |b| b.is_ascii_whitespace())
    }

    fn classify_number(&self, source: &str, index: usize, length: usize) -> (TokenKind, usize) {
        let bytes = source.as_bytes();
        let after = index + length;
        let multiply = matches!(byte_at(bytes, after), Some(b'm' | b'M'))
            && !byte_at(bytes, after + 1).is_some_and(|b| b.is_ascii_alphanumeric());
        if multiply {
            return (
                TokenKind::Shortcut(ShortcutKind::Multiply),
                length + 1,
            );
        }

        let text = &source[index..after];
        match fortran_float(text) {
            Some(value) if value == 0.0 => (TokenKind::Null, length),
            _ => (TokenKind::Number, length),
        }
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        if let Some(shortcut) = classify_shortcut(word) {
            return TokenKind::Shortcut(shortcut);
        }

        if self.mode == LexerMode::Surface && is_surface_type(word) {
            return TokenKind::SurfaceType;
        }
        if is_keyword(word) {
            return TokenKind::Keyword;
        }

        let mut chars = word.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        match (self.mode, single) {
            (LexerMode::Cell | LexerMode::Data, Some(c)) if is_particle(c) => TokenKind::Particle,
            _ => TokenKind::Text,
        }
    }

    fn read_mode_lexeme(&self, source: &str, index: usize) -> (TokenKind, usize) {
        let bytes = source.as_bytes();
        match bytes[index] {
            b'=' => return (TokenKind::Equals, 1),
            b'&' if byte_at(bytes, index + 1).map_or(true, |b| b.is_ascii_whitespace()) => {
                return (TokenKind::Ampersand, 1)
            }
            _ => {}
        }

        let length = bytes[index..]
            .iter()
            .take_while(|&&b| !b.is_ascii_whitespace() && b != b'=' && b != b'$')
            .count();
        let word = &source[index..index + length];
        if is_keyword(word) {
            (TokenKind::Keyword, length)
        } else {
            (TokenKind::FilePath, length)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(mode: LexerMode, text: &str) -> Vec<(TokenKind, String)> {
        let stream = LexicalAnalyzer::new(mode).tokenize(text, 1).unwrap();
        stream
            .all_tokens()
            .iter()
            .filter(|t| t.kind != TokenKind::Space)
            .map(|t| (t.kind, t.text.clone()))
            .collect()
    }

    fn kind_list(mode: LexerMode, text: &str) -> Vec<TokenKind> {
        kinds(mode, text).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_tokens_partition_source() {
        let text = "c leading\n1 0 -1 #2 (3:4) $ tail\n     imp:n=1";
        let stream = LexicalAnalyzer::new(LexerMode::Cell).tokenize(text, 1).unwrap();
        assert_eq!(stream.text(), text);
    }

    #[test]
    fn test_cell_record() {
        assert_eq!(
            kind_list(LexerMode::Cell, "1 0 -1 #2 (3:4) imp:n,p=1"),
            vec![
                TokenKind::Number,
                TokenKind::Null,
                TokenKind::Number,
                TokenKind::Complement,
                TokenKind::Number,
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::Colon,
                TokenKind::Number,
                TokenKind::RightParen,
                TokenKind::Keyword,
                TokenKind::Colon,
                TokenKind::Particle,
                TokenKind::Comma,
                TokenKind::Particle,
                TokenKind::Equals,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_numbers_and_shortcuts() {
        assert_eq!(
            kinds(LexerMode::Data, "1.2+3 1e-5 .5 0.0 3J 4r 2ilog 2I 1.5m 2m j"),
            vec![
                (TokenKind::Number, "1.2+3".to_string()),
                (TokenKind::Number, "1e-5".to_string()),
                (TokenKind::Number, ".5".to_string()),
                (TokenKind::Null, "0.0".to_string()),
                (TokenKind::Shortcut(ShortcutKind::Jump), "3J".to_string()),
                (TokenKind::Shortcut(ShortcutKind::Repeat), "4r".to_string()),
                (TokenKind::Shortcut(ShortcutKind::LogInterpolate), "2ilog".to_string()),
                (TokenKind::Shortcut(ShortcutKind::Interpolate), "2I".to_string()),
                (TokenKind::Shortcut(ShortcutKind::Multiply), "1.5m".to_string()),
                (TokenKind::Shortcut(ShortcutKind::Multiply), "2m".to_string()),
                (TokenKind::Shortcut(ShortcutKind::Jump), "j".to_string()),
            ]
        );
    }

    #[test]
    fn test_material_record() {
        assert_eq!(
            kinds(LexerMode::Data, "m1 1001.80c 2 8016.800nm 1 nlib=80c"),
            vec![
                (TokenKind::Text, "m".to_string()),
                (TokenKind::Number, "1".to_string()),
                (TokenKind::Zaid, "1001.80c".to_string()),
                (TokenKind::Number, "2".to_string()),
                (TokenKind::Zaid, "8016.800nm".to_string()),
                (TokenKind::Number, "1".to_string()),
                (TokenKind::Keyword, "nlib".to_string()),
                (TokenKind::Equals, "=".to_string()),
                (TokenKind::NumberWord, "80c".to_string()),
            ]
        );
        assert_eq!(
            kind_list(LexerMode::Data, "mt1 lwtr.10t"),
            vec![TokenKind::Text, TokenKind::Number, TokenKind::ThermalLaw]
        );
    }

    #[test]
    fn test_comment_only_in_leading_columns() {
        let tokens = kinds(LexerMode::Cell, "c full line\n1 0 -1 c");
        assert_eq!(tokens[0].0, TokenKind::Comment);
        assert_eq!(tokens[0].1, "c full line");
        assert_eq!(tokens.last().map(|t| t.0), Some(TokenKind::Particle));
    }

    #[test]
    fn test_surface_types_win_in_surface_block() {
        assert_eq!(
            kind_list(LexerMode::Surface, "*1 c/z 0 0 5"),
            vec![
                TokenKind::Asterisk,
                TokenKind::Number,
                TokenKind::SurfaceType,
                TokenKind::Null,
                TokenKind::Null,
                TokenKind::Number,
            ]
        );
        assert_eq!(kind_list(LexerMode::Cell, "x"), vec![TokenKind::Keyword]);
        assert_eq!(kind_list(LexerMode::Surface, "x"), vec![TokenKind::SurfaceType]);
    }

    #[test]
    fn test_particle_specials_in_data_block() {
        assert_eq!(
            kind_list(LexerMode::Data, "mode n | *"),
            vec![
                TokenKind::Text,
                TokenKind::Particle,
                TokenKind::ParticleSpecial,
                TokenKind::ParticleSpecial,
            ]
        );
    }

    #[test]
    fn test_read_mode() {
        assert_eq!(
            kinds(LexerMode::Read, "read file=../geom/cells.i noecho"),
            vec![
                (TokenKind::Keyword, "read".to_string()),
                (TokenKind::Keyword, "file".to_string()),
                (TokenKind::Equals, "=".to_string()),
                (TokenKind::FilePath, "../geom/cells.i".to_string()),
                (TokenKind::Keyword, "noecho".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_character() {
        let result = LexicalAnalyzer::new(LexerMode::Cell).tokenize("1 0 -1 ;", 3);
        match result {
            Err(LexerError::InvalidCharacter {
                character, column, ..
            }) => {
                assert_eq!(character, ';');
                assert_eq!(column, 8);
            }
            other => panic!("expected invalid character, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_spans_track_lines() {
        let stream = LexicalAnalyzer::new(LexerMode::Cell)
            .tokenize("1 0\n     -2", 1)
            .unwrap();
        let last = stream.all_tokens().last().unwrap();
        assert_eq!(last.text, "-2");
        assert_eq!(last.span.start.line, 2);
        assert_eq!(last.span.start.column, 6);
    }
}
