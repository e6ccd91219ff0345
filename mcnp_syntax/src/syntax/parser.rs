//! Record parser: drives a [`Grammar`] over one record's token stream
//!
//! Recoverable problems found mid-record are queued rather than returned
//! immediately, so a single record can report several of them at once.

use crate::config::compile_time::syntax::{MAX_ERROR_HISTORY, MAX_PARSE_DEPTH};
use crate::grammar::{Grammar, Parser};
use crate::log_debug;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::syntax_tree::RecordTree;
use crate::tokens::{Token, TokenStream};
use crate::utils::Span;
use std::collections::VecDeque;

pub struct RecordParser {
    tokens: TokenStream,
    grammar: Grammar,
    errors: VecDeque<SyntaxError>,
    depth: usize,
}

impl RecordParser {
    pub fn new(tokens: TokenStream, grammar: Grammar) -> Self {
        log_debug!("Creating record parser",
            "kind" => grammar.kind().as_str(),
            "tokens" => tokens.len()
        );
        Self {
            tokens,
            grammar,
            errors: VecDeque::new(),
            depth: 0,
        }
    }

    /// Parse the whole record; every queued or fatal error is returned
    pub fn parse(mut self) -> Result<RecordTree, Vec<SyntaxError>> {
        if self.tokens.only_padding_left() {
            return Err(vec![SyntaxError::empty_record()]);
        }

        let grammar = self.grammar.clone();
        let result = grammar.parse(&mut self);

        match result {
            Ok(tree) if self.errors.is_empty() => Ok(tree),
            Ok(_) => Err(self.errors.into()),
            Err(error) => {
                self.record_error(error);
                Err(self.errors.into())
            }
        }
    }

    fn record_error(&mut self, error: SyntaxError) {
        if self.errors.len() >= MAX_ERROR_HISTORY {
            self.errors.pop_front();
        }
        self.errors.push_back(error);
    }

    pub fn errors(&self) -> impl Iterator<Item = &SyntaxError> {
        self.errors.iter()
    }
}

impl Parser for RecordParser {
    fn current(&self) -> Option<&Token> {
        self.tokens.current()
    }

    fn advance(&mut self) -> Option<Token> {
        self.tokens.advance()
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.peek_ahead(n)
    }

    fn next_significant(&self) -> Option<&Token> {
        self.tokens.next_significant()
    }

    fn position(&self) -> usize {
        self.tokens.position()
    }

    fn reset_to(&mut self, position: usize) {
        self.tokens.reset_to(position);
    }

    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn current_span(&self) -> Span {
        self.tokens.current_span()
    }

    fn enter(&mut self) -> SyntaxResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(SyntaxError::max_recursion_depth(self.current_span()));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn report(&mut self, error: SyntaxError) {
        self.record_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::syntax_tree::SyntaxNode;
    use assert_matches::assert_matches;

    fn parse(text: &str, grammar: Grammar) -> Result<RecordTree, Vec<SyntaxError>> {
        let tokens = tokenize(text, grammar.lexer_mode()).unwrap();
        RecordParser::new(tokens, grammar).parse()
    }

    #[test]
    fn test_cell_round_trip() {
        let text = "1 1 -0.5 -1 2 imp:n=1 $ fuel";
        let tree = parse(text, Grammar::cell()).unwrap();
        assert_eq!(tree.to_text(), text);
    }

    #[test]
    fn test_duplicate_parameter_is_queued() {
        let errors = parse("1 0 -1 imp:n=1 imp:n=2", Grammar::cell()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_matches!(&errors[0], SyntaxError::DuplicateParameter { key, .. } if key == "imp:n");
    }

    #[test]
    fn test_blank_record_is_empty() {
        let errors = parse("   ", Grammar::cell()).unwrap_err();
        assert_matches!(errors[0], SyntaxError::EmptyRecord);
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_PARSE_DEPTH + 5;
        let text = format!("1 0 {}-1{}", "(".repeat(depth), ")".repeat(depth));
        let errors = parse(&text, Grammar::cell()).unwrap_err();
        assert_matches!(errors.last(), Some(SyntaxError::MaxRecursionDepth { .. }));
    }
}
