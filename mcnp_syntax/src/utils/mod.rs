//! Shared primitives used by every stage: source spans, number rendering,
//! and the warning record that stages hand back to their callers.

pub mod numeric;
pub mod span;
pub mod warning;

pub use span::{Position, SourceMap, Span};
pub use warning::Warning;
