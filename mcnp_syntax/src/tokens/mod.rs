//! Token system
//!
//! Tokens keep their exact source text so that a record can be rebuilt
//! byte for byte; padding tokens are part of the stream, not discarded.

pub mod token;
pub mod token_stream;

pub use token::{classify_shortcut, ShortcutKind, Token, TokenKind};
pub use token_stream::TokenStream;
