//! Token stream with padding-aware lookahead
//!
//! The grammar keeps every padding token (whitespace, comments, `&`) in the
//! tree, so the stream never filters. `significant_indices` lets the parser
//! look past padding without consuming it.

use super::token::{Token, TokenKind};
use crate::utils::{Position, SourceMap, Span};

#[derive(Debug, Clone)]
pub struct TokenStream {
    all_tokens: Vec<Token>,
    /// Indices into all_tokens for non-padding tokens
    significant_indices: Vec<usize>,
    /// Current index into all_tokens
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_padding())
            .map(|(index, _)| index)
            .collect();
        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            source_map: None,
        }
    }

    pub fn with_source_map(tokens: Vec<Token>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&Token> {
        self.all_tokens.get(self.position)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.all_tokens.get(self.position + n)
    }

    /// Consume and return the current token
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.all_tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// First non-padding token at or after the current position
    pub fn next_significant(&self) -> Option<&Token> {
        self.nth_significant(0)
    }

    /// The `n`th non-padding token at or after the current position
    pub fn nth_significant(&self, n: usize) -> Option<&Token> {
        let start = self
            .significant_indices
            .partition_point(|&index| index < self.position);
        self.significant_indices
            .get(start + n)
            .and_then(|&index| self.all_tokens.get(index))
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.all_tokens.len()
    }

    /// No significant tokens remain
    pub fn only_padding_left(&self) -> bool {
        self.next_significant().is_none()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewind or fast-forward to a position saved earlier
    pub fn reset_to(&mut self, position: usize) {
        self.position = position.min(self.all_tokens.len());
    }

    pub fn len(&self) -> usize {
        self.all_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_tokens.is_empty()
    }

    pub fn significant_count(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    // === SPANS ===

    /// Span of the current token, or an empty span at the end of input
    pub fn current_span(&self) -> Span {
        match self.current() {
            Some(token) => token.span,
            None => self.end_span(),
        }
    }

    pub fn end_span(&self) -> Span {
        let end = self
            .all_tokens
            .last()
            .map(|token| token.span.end)
            .unwrap_or_else(Position::start);
        Span::new(end, end)
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Concatenated text of every token; equals the lexed source
    pub fn text(&self) -> String {
        self.all_tokens.iter().map(|token| token.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str, offset: usize) -> Token {
        let start = Position::new(offset, 1, offset as u32 + 1);
        let end = start.advance_str(text);
        Token::new(kind, text, Span::new(start, end))
    }

    fn sample() -> TokenStream {
        TokenStream::new(vec![
            token(TokenKind::Number, "1", 0),
            token(TokenKind::Space, " ", 1),
            token(TokenKind::DollarComment, "$ x", 2),
            token(TokenKind::Number, "2", 5),
        ])
    }

    #[test]
    fn test_significant_lookahead_skips_padding() {
        let mut stream = sample();
        stream.advance();
        assert_eq!(stream.current_kind(), Some(TokenKind::Space));
        assert_eq!(stream.next_significant().map(|t| t.text.as_str()), Some("2"));
        assert!(stream.nth_significant(1).is_none());
    }

    #[test]
    fn test_reset_and_end() {
        let mut stream = sample();
        while stream.advance().is_some() {}
        assert!(stream.is_at_end());
        assert_eq!(stream.current_span().start.offset, 6);
        stream.reset_to(1);
        assert_eq!(stream.current_kind(), Some(TokenKind::Space));
        assert_eq!(stream.text(), "1 $ x2");
    }
}
