//! Block reader
//!
//! Splits a deck into its optional message block, the title line and the
//! records of the cell, surface and data blocks. Continuation lines are
//! joined into one record, lines past the column limit of the requested
//! format version are cut, and READ directives pull in other files.

mod error;
mod reader;
mod version;

pub use error::BlockReaderError;
pub use reader::{is_comment_line, BlockReader, BlockType, RawRecord, ReaderItem, ReaderOutput};
pub use version::FormatVersion;

use std::path::Path;

/// Read a deck from disk
pub fn read_file(
    path: &Path,
    version: FormatVersion,
    replace_non_ascii: bool,
) -> Result<ReaderOutput, BlockReaderError> {
    BlockReader::new(version, replace_non_ascii)?.read_file(path)
}

/// Read a deck held in memory
pub fn read_str(
    text: &str,
    path: &Path,
    version: FormatVersion,
    replace_non_ascii: bool,
) -> Result<ReaderOutput, BlockReaderError> {
    BlockReader::new(version, replace_non_ascii)?.read_str(text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_api() {
        let output = read_str(
            "title\n1 0 -1\n",
            Path::new("deck.i"),
            FormatVersion::default(),
            true,
        )
        .unwrap();
        assert_eq!(output.records().count(), 1);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = BlockReader::new(FormatVersion::new(4, 0, 0), true);
        assert!(result.is_err());
    }
}
