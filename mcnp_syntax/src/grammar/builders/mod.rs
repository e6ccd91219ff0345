//! Productions shared by the record grammars

pub mod atomic;
pub mod geometry;
pub mod lists;
pub mod records;

pub use atomic::{
    expect_end, expect_value, parse_classifier, parse_padding, starts_parameter, unexpected,
};
pub use geometry::parse_geometry;
pub use lists::{parse_isotopes, parse_parameters, parse_value_list};
pub use records::{parse_cell, parse_data, parse_read, parse_surface};

use crate::grammar::Grammar;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::Token;
use crate::utils::Span;

/// What the productions need from a parser
pub trait Parser {
    // === NAVIGATION ===
    fn current(&self) -> Option<&Token>;
    fn advance(&mut self) -> Option<Token>;
    fn peek_ahead(&self, n: usize) -> Option<&Token>;
    fn next_significant(&self) -> Option<&Token>;
    fn position(&self) -> usize;
    fn reset_to(&mut self, position: usize);

    // === CONTEXT ===
    fn grammar(&self) -> &Grammar;
    fn current_span(&self) -> Span;

    /// Enter a nested production; fails past the depth limit
    fn enter(&mut self) -> SyntaxResult<()>;
    fn leave(&mut self);

    /// Queue an error that does not stop the production
    fn report(&mut self, error: SyntaxError);
}
