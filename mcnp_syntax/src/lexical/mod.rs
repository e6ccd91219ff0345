//! Lexical analysis of record text

mod analyzer;

pub use analyzer::{LexerError, LexerMode, LexicalAnalyzer, LexicalMetrics};

use crate::logging::codes;
use crate::log_success;
use crate::tokens::TokenStream;

/// Tokenize a record in one call
pub fn tokenize(source: &str, mode: LexerMode) -> Result<TokenStream, LexerError> {
    tokenize_at(source, mode, 1)
}

/// Tokenize a record whose first line sits at `first_line` in its file
pub fn tokenize_at(source: &str, mode: LexerMode, first_line: u32) -> Result<TokenStream, LexerError> {
    let mut analyzer = LexicalAnalyzer::new(mode);
    let stream = analyzer.tokenize(source, first_line)?;

    log_success!(
        codes::success::TOKENIZATION_COMPLETE,
        "Tokenization completed",
        "tokens" => stream.len(),
        "line" => first_line
    );

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn test_tokenize_is_lossless() {
        let text = "1 0 -1 2 $ sphere\n     imp:n=1";
        let stream = tokenize(text, LexerMode::Cell).unwrap();
        assert_eq!(stream.text(), text);
        assert_eq!(stream.significant_count(), 9);
    }

    #[test]
    fn test_tokenize_error_code() {
        let error = tokenize("1 0 ;", LexerMode::Cell).unwrap_err();
        assert_eq!(error.error_code().as_str(), "E020");
        assert!(error.span().is_some());
    }

    #[test]
    fn test_mode_changes_classification() {
        let cell = tokenize("p", LexerMode::Cell).unwrap();
        let surface = tokenize("p", LexerMode::Surface).unwrap();
        assert_eq!(cell.all_tokens()[0].kind, TokenKind::Particle);
        assert_eq!(surface.all_tokens()[0].kind, TokenKind::SurfaceType);
    }
}
