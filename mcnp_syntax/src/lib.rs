// Internal modules
pub mod block_reader;
pub mod config;
pub mod geometry;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod syntax_tree;
pub mod tokens;
pub mod utils;
pub mod writer;

// Re-export key types for library consumers
pub use block_reader::FormatVersion;
pub use geometry::{GeometryError, HalfSpace};
pub use pipeline::{
    process_file, process_str, PipelineError, ProcessedInput, ProcessingOptions, RecordError,
};
pub use syntax_tree::{RecordTree, SyntaxNode};
