//! End-to-end processing: read a deck, parse every record, write it back
//!
//! Record failures follow one policy for the whole run. By default a failed
//! record is reported as an error and kept as raw text so the deck still
//! writes back unchanged. Check mode reports the same failures as warnings.
//! Fail-fast stops at the first failure, and unsupported input always stops.

mod error;
mod input;

pub use error::{PipelineError, RecordError, RecordErrorSummary};
pub use input::{InputSummary, ProcessedInput, ProcessedRecord, WarningSummary};

use crate::block_reader::{self, FormatVersion, RawRecord, ReaderItem, ReaderOutput};
use crate::config::runtime::{FormatPreferences, ParsePreferences};
use crate::logging::{codes, with_file_context};
use crate::syntax::{self, record_prefix};
use crate::syntax_tree::{OpaqueRecord, RecordTree, Tolerance};
use crate::utils::Warning;
use crate::{log_error, log_info, log_success};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOptions {
    /// Downgrade record errors to warnings
    pub check_mode: bool,
    /// Stop at the first record that fails
    pub fail_fast: bool,
    pub version: FormatVersion,
    pub replace_non_ascii: bool,
    /// Values within this tolerance of the original keep their text
    #[serde(skip)]
    pub tolerance: Tolerance,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        let format = FormatPreferences::default();
        let parse = ParsePreferences::default();
        Self {
            check_mode: parse.check_mode,
            fail_fast: parse.fail_fast,
            version: format.version.parse().unwrap_or_default(),
            replace_non_ascii: format.replace_non_ascii,
            tolerance: Tolerance::from(&format),
        }
    }
}

impl ProcessingOptions {
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }
}

/// Read and parse a deck from disk, following READ directives
pub fn process_file(path: &Path, options: &ProcessingOptions) -> Result<ProcessedInput, PipelineError> {
    log_info!("Processing deck", "path" => path.display(), "version" => options.version);
    let output = with_file_context(path.to_path_buf(), 0, || {
        block_reader::read_file(path, options.version, options.replace_non_ascii)
    })?;
    process_output(output, options)
}

/// Parse a deck held in memory; `path` names it in diagnostics
pub fn process_str(text: &str, path: &Path, options: &ProcessingOptions) -> Result<ProcessedInput, PipelineError> {
    let output = with_file_context(path.to_path_buf(), 0, || {
        block_reader::read_str(text, path, options.version, options.replace_non_ascii)
    })?;
    process_output(output, options)
}

fn process_output(output: ReaderOutput, options: &ProcessingOptions) -> Result<ProcessedInput, PipelineError> {
    let mut input = ProcessedInput::new(options.version, options.tolerance);
    input.data_block_terminated = output.data_block_terminated;
    input.warnings = output.warnings;

    for item in output.items {
        match item {
            ReaderItem::Message(lines) => input.message = Some(lines),
            ReaderItem::Title(title) => input.title = title,
            ReaderItem::Record(raw) => {
                let tree = with_file_context(raw.path.clone(), raw.include_depth, || {
                    parse_with_policy(&raw, options, &mut input)
                })?;
                input.records.push(ProcessedRecord::new(raw, tree));
            }
        }
    }

    log_success!(codes::success::BLOCKS_READ, "Deck processed",
        "records" => input.records.len(),
        "errors" => input.errors.len(),
        "warnings" => input.warnings.len()
    );
    Ok(input)
}

fn parse_with_policy(
    raw: &RawRecord,
    options: &ProcessingOptions,
    input: &mut ProcessedInput,
) -> Result<RecordTree, PipelineError> {
    let errors = match syntax::parse_record(raw) {
        Ok(tree) => {
            if let RecordTree::Opaque(opaque) = &tree {
                input.warnings.push(
                    Warning::new(
                        codes::warnings::OPAQUE_RECORD,
                        format!(
                            "'{}' records are kept as written",
                            opaque.prefix().unwrap_or("unnamed")
                        ),
                    )
                    .at(&raw.path, raw.first_line),
                );
            }
            return Ok(tree);
        }
        Err(errors) => errors,
    };

    let error = RecordError::new(raw, errors);
    log_error!(error.error_code(), &error.to_string(),
        "block" => raw.block.as_str(),
        "line" => error.line()
    );

    if error.is_unsupported() || options.fail_fast {
        return Err(PipelineError::Record(error));
    }
    if options.check_mode {
        input.warnings.push(
            Warning::new(codes::warnings::DOWNGRADED_ERROR, error.to_string())
                .at(&raw.path, error.line()),
        );
    } else {
        input.errors.push(error);
    }

    let text = raw.text();
    let prefix = record_prefix(&text);
    Ok(RecordTree::Opaque(OpaqueRecord::new(text, prefix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HalfSpace;
    use crate::syntax_tree::Value;
    use assert_matches::assert_matches;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn options() -> ProcessingOptions {
        ProcessingOptions {
            check_mode: false,
            fail_fast: false,
            version: FormatVersion::default(),
            replace_non_ascii: true,
            tolerance: Tolerance::default(),
        }
    }

    fn process(text: &str, options: &ProcessingOptions) -> Result<ProcessedInput, PipelineError> {
        process_str(text, &PathBuf::from("deck.i"), options)
    }

    const DECK: &str = "message: ina=deck.i\n\
\n\
sample deck\n\
c the inner sphere\n\
1 1 -0.5  -1   imp:n=1 $ fuel\n\
2 0 1 -2\n     imp:n=1\n\
3 0 2 imp:n=0\n\
\n\
1 so 5.0\n\
*2 so 10\n\
\n\
m1 1001.80c 2 8016.80c 1\n\
vol 1 1 2J 0\n\
kcode 1000 1.0 10 100\n\
sdef erg=1 = 2\n";

    #[test]
    fn test_unmodified_deck_round_trips() {
        let input = process(DECK, &options()).unwrap();
        assert!(input.errors.is_empty());
        assert_eq!(input.title, "sample deck");
        assert_eq!(input.cells().count(), 3);
        assert_eq!(input.surfaces().count(), 2);
        assert_eq!(input.write().unwrap(), DECK);
    }

    #[test]
    fn test_unmodeled_data_record_warns() {
        let input = process(DECK, &options()).unwrap();
        let opaque = input
            .records
            .iter()
            .filter(|r| matches!(r.tree, RecordTree::Opaque(_)))
            .count();
        assert_eq!(opaque, 1);
        assert!(input
            .warnings
            .iter()
            .any(|w| w.code == codes::warnings::OPAQUE_RECORD));
    }

    #[test]
    fn test_jump_values_round_trip() {
        let input = process(DECK, &options()).unwrap();
        let vol = input
            .data()
            .find(|d| d.classifier().prefix().eq_ignore_ascii_case("vol"))
            .unwrap();
        assert_eq!(
            vol.values(),
            vec![Some(Value::Float(1.0)), Some(Value::Float(1.0)), None, None, Some(Value::Float(0.0))]
        );
    }

    #[test]
    fn test_edits_change_only_what_was_edited() {
        let mut input = process(DECK, &options()).unwrap();
        let cell = input.cell_mut(3).unwrap();
        cell.half_space_mut()
            .unwrap()
            .and_assign(&HalfSpace::surface(-4));

        let written = input.write().unwrap();
        assert!(written.contains("\n3 0 2 -4 imp:n=0\n"));
        assert_eq!(written.replace("3 0 2 -4 imp:n=0", "3 0 2 imp:n=0"), DECK);
    }

    const BROKEN: &str = "t\n1 0 -1 : : 2\n2 0 1\n\n1 so 5\n\nimp:n 1 1\n";

    #[test]
    fn test_default_mode_collects_errors_and_keeps_text() {
        let input = process(BROKEN, &options()).unwrap();
        assert_eq!(input.errors.len(), 1);
        assert_eq!(input.errors[0].first_line, 2);
        assert!(input.errors[0].render().contains("not expected here."));
        assert_eq!(input.records.len(), 4);
        assert_eq!(input.write().unwrap(), BROKEN);
    }

    #[test]
    fn test_check_mode_downgrades() {
        let input = process(BROKEN, &options().with_check_mode(true)).unwrap();
        assert!(input.errors.is_empty());
        assert!(input
            .warnings
            .iter()
            .any(|w| w.code == codes::warnings::DOWNGRADED_ERROR));
    }

    #[test]
    fn test_fail_fast_stops() {
        let result = process(BROKEN, &options().with_fail_fast(true));
        assert_matches!(result, Err(PipelineError::Record(error)) if error.first_line == 2);
    }

    #[test]
    fn test_unsupported_feature_is_never_downgraded() {
        let deck = "t\n1 0 -1\n2 like 1 but imp:n=0\n";
        let result = process(deck, &options().with_check_mode(true));
        assert_matches!(result, Err(PipelineError::Record(error)) if error.is_unsupported());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = process("t\n1 0 -1\n", &options().with_version(FormatVersion::new(4, 0, 0)));
        assert_matches!(result, Err(PipelineError::Reader(_)));
    }

    #[test]
    fn test_read_inclusion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cells.i"), "5 0 -5\n6 0 5\n").unwrap();
        let root = dir.path().join("deck.i");
        let text = "t\n1 0 -1\nread file=cells.i\n\n1 pz 0\n";
        fs::write(&root, text).unwrap();

        let input = process_file(&root, &options()).unwrap();
        assert!(input.cell(5).is_some());
        assert_eq!(input.cell(6).map(|c| c.number()), Some(6));
        assert_eq!(
            input
                .records
                .iter()
                .filter(|r| r.include_depth == 1)
                .count(),
            2
        );
        assert_eq!(input.write().unwrap(), text);
    }

    #[test]
    fn test_write_file_and_summary() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.i");
        let input = process(DECK, &options()).unwrap();
        input.write_file(&out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), DECK);

        let summary = input.summary();
        assert_eq!(summary.cells, 3);
        assert_eq!(summary.surfaces, 2);
        assert_eq!(summary.data, 4);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"title\":\"sample deck\""));
    }
}
