//! Record parsing: raw record text to a format-preserving syntax tree

mod error;
mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use parser::RecordParser;

use crate::block_reader::RawRecord;
use crate::config::constants::vocabulary;
use crate::grammar::{Grammar, RecordKind};
use crate::lexical::tokenize_at;
use crate::logging::codes;
use crate::syntax_tree::{OpaqueRecord, RecordTree};
use crate::{log_debug, log_success};

/// Lower-cased alphabetic prefix of a data record, e.g. `kcode` or `f`
pub fn record_prefix(text: &str) -> Option<String> {
    let word: String = text
        .trim_start()
        .trim_start_matches(['*', '+'])
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    (!word.is_empty()).then(|| word.to_ascii_lowercase())
}

/// Parse one raw record with the grammar of its block
///
/// Data records whose name has no dedicated grammar fall back to an
/// [`OpaqueRecord`] when they fail to parse, unless the failure is an
/// unsupported feature.
pub fn parse_record(record: &RawRecord) -> Result<RecordTree, Vec<SyntaxError>> {
    let text = record.text();
    let grammar = Grammar::for_record(record);
    let kind = grammar.kind();

    let result = tokenize_at(&text, grammar.lexer_mode(), record.first_line)
        .map_err(|e| vec![SyntaxError::from(e)])
        .and_then(|tokens| RecordParser::new(tokens, grammar).parse());

    match result {
        Ok(tree) => {
            log_success!(codes::success::RECORD_PARSED, "Record parsed",
                "kind" => tree.kind_name(),
                "line" => record.first_line
            );
            Ok(tree)
        }
        Err(errors) => {
            let prefix = record_prefix(&text);
            let opaque = kind == RecordKind::Data
                && !errors.iter().any(SyntaxError::is_unsupported)
                && prefix
                    .as_deref()
                    .is_some_and(|p| !vocabulary::is_modeled_data_prefix(p));
            if opaque {
                log_debug!("Keeping data record as raw text",
                    "prefix" => prefix.as_deref().unwrap_or(""),
                    "line" => record.first_line
                );
                return Ok(RecordTree::Opaque(OpaqueRecord::new(text, prefix)));
            }
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_reader::BlockType;
    use crate::syntax_tree::{FormatContext, GeometryEntry, GeometryOperator, SyntaxNode, Value};
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    fn raw(block: BlockType, text: &str) -> RawRecord {
        RawRecord {
            block,
            lines: text.split('\n').map(str::to_string).collect(),
            path: PathBuf::from("deck.i"),
            first_line: 1,
            include_depth: 0,
        }
    }

    #[test]
    fn test_record_prefix() {
        assert_eq!(record_prefix("  KCODE 1000 1.0"), Some("kcode".to_string()));
        assert_eq!(record_prefix("*f4:n 1"), Some("f".to_string()));
        assert_eq!(record_prefix("1 0 -1"), None);
    }

    #[test]
    fn test_simple_cell() {
        let tree = parse_record(&raw(BlockType::Cell, "1 0 1 -2")).unwrap();
        let cell = tree.as_cell().unwrap();
        assert_eq!(cell.number(), 1);
        assert!(cell.is_void());
        assert_eq!(cell.density(), None);

        let geometry = cell.geometry();
        let Some(GeometryEntry::Branch(root)) = geometry.entry(geometry.root()) else {
            panic!("expected an intersection at the root");
        };
        assert_eq!(root.operator, GeometryOperator::Intersection);
        let leaves: Vec<(Option<Value>, bool)> = geometry
            .leaves()
            .iter()
            .map(|l| (l.value().cloned(), l.is_negative()))
            .collect();
        assert_eq!(
            leaves,
            vec![(Some(Value::Int(1)), false), (Some(Value::Int(2)), true)]
        );
        assert_eq!(tree.to_text(), "1 0 1 -2");
    }

    #[test]
    fn test_cell_with_material_and_union() {
        let text = "10 3 -2.7 (-1 : 2) #4 imp:n,p=1";
        let tree = parse_record(&raw(BlockType::Cell, text)).unwrap();
        let cell = tree.as_cell().unwrap();
        assert_eq!(cell.material(), 3);
        assert_eq!(cell.density(), Some((2.7, false)));
        assert!(cell.parameters().contains("IMP:P,N"));
        assert_eq!(tree.to_text(), text);
    }

    #[test]
    fn test_multiline_cell_keeps_layout() {
        let text = "2 0 -3 $ inside\n     4 -5\n     imp:n=0";
        let tree = parse_record(&raw(BlockType::Cell, text)).unwrap();
        assert_eq!(tree.to_text(), text);
        assert_eq!(tree.comments().len(), 1);
    }

    #[test]
    fn test_like_but_is_unsupported() {
        let errors = parse_record(&raw(BlockType::Cell, "2 like 1 but imp:n=0")).unwrap_err();
        assert!(errors[0].is_unsupported());
        assert!(errors[0].requires_halt());
    }

    #[test]
    fn test_surface_record() {
        let tree = parse_record(&raw(BlockType::Surface, "*1 2 px 5.0")).unwrap();
        let surface = tree.as_surface().unwrap();
        assert!(surface.is_reflecting());
        assert_eq!(surface.number(), 1);
        assert_eq!(surface.transform(), Some(2));
        assert_eq!(surface.kind(), "PX");
        assert_eq!(surface.constants(), vec![5.0]);
        assert_eq!(tree.to_text(), "*1 2 px 5.0");
    }

    #[test]
    fn test_white_boundary_surface() {
        let tree = parse_record(&raw(BlockType::Surface, "+3 so 10")).unwrap();
        let surface = tree.as_surface().unwrap();
        assert!(surface.is_white_boundary());
        assert_eq!(surface.number(), 3);
        assert_eq!(tree.to_text(), "+3 so 10");
    }

    #[test]
    fn test_surface_without_type_fails() {
        let errors = parse_record(&raw(BlockType::Surface, "1 5.0 6.0")).unwrap_err();
        assert_matches!(errors[0], SyntaxError::UnexpectedToken { .. });
    }

    #[test]
    fn test_data_with_jumps() {
        let tree = parse_record(&raw(BlockType::Data, "VOL 1 1 2J 0")).unwrap();
        let data = tree.as_data().unwrap();
        assert_eq!(data.classifier().prefix(), "VOL");
        assert_eq!(
            data.values(),
            vec![
                Some(Value::Float(1.0)),
                Some(Value::Float(1.0)),
                None,
                None,
                Some(Value::Float(0.0)),
            ]
        );
        assert_eq!(tree.to_text(), "VOL 1 1 2J 0");
    }

    #[test]
    fn test_edited_data_value_keeps_jumps() {
        let mut tree = parse_record(&raw(BlockType::Data, "VOL 1 1 2J 0")).unwrap();
        let data = tree.as_data_mut().unwrap();
        let mut values = data.values();
        values[0] = Some(Value::Float(1.5));
        assert!(data.set_values(values, &FormatContext::default()));
        assert_eq!(tree.to_text(), "VOL 1.5 1 2J 0");
    }

    #[test]
    fn test_oversized_shortcut_fails_the_record() {
        let errors = parse_record(&raw(BlockType::Data, "imp:n 1 99999999999R")).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.error_code() == codes::syntax::MALFORMED_SHORTCUT));
    }

    #[test]
    fn test_material_record() {
        let text = "m1 1001.80c 2 8016.80c 1 nlib=80c";
        let tree = parse_record(&raw(BlockType::Data, text)).unwrap();
        let data = tree.as_data().unwrap();
        assert_eq!(data.classifier().number(), Some(1));
        assert_eq!(data.values().len(), 4);
        assert!(data.parameters().contains("nlib"));
        assert_eq!(tree.to_text(), text);
    }

    #[test]
    fn test_unmodeled_data_falls_back_to_text() {
        let text = "sdef erg=1 = 2";
        let tree = parse_record(&raw(BlockType::Data, text)).unwrap();
        assert_matches!(&tree, RecordTree::Opaque(o) if o.prefix() == Some("sdef"));
        assert_eq!(tree.to_text(), text);
    }

    #[test]
    fn test_modeled_data_failure_is_an_error() {
        assert!(parse_record(&raw(BlockType::Data, "imp:n 1 = 2")).is_err());
    }

    #[test]
    fn test_read_directive() {
        let tree = parse_record(&raw(BlockType::Cell, "read file=geom.i noecho")).unwrap();
        let read = tree.as_read().unwrap();
        assert_eq!(read.file(), Some("geom.i"));
        assert!(read.parameters().contains("noecho"));
    }
}
