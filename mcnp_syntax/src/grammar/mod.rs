//! Record grammars composed from shared rule-sets
//!
//! Each record kind gets one [`Grammar`], assembled from the named
//! [`RuleSet`]s it needs. Productions live in [`builders`] and consult the
//! active grammar before using a rule-set, so a construct that is legal in
//! one block is rejected with a precise error in another.

pub mod builders;

pub use builders::Parser;

use crate::block_reader::{BlockType, RawRecord};
use crate::lexical::LexerMode;
use crate::syntax::SyntaxResult;
use crate::syntax_tree::RecordTree;
use serde::Serialize;

/// Named groups of productions shared between record grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleSet {
    /// Whitespace, comments and continuation markers
    Padding,
    /// Numeric phrases, including the null phrase
    Numbers,
    /// Repeat, multiply, interpolate and jump forms
    Shortcuts,
    /// `[modifier]prefix[number][:particles]`
    Classifier,
    /// Trailing `key=value` pairs
    Parameters,
    /// Cell number, material and density
    CellHeader,
    Geometry,
    /// Surface modifier, number, transform and mnemonic
    SurfaceHeader,
    /// Free data items: numbers, words, particle lists
    DataItems,
    /// ZAID and fraction pairs
    Isotopes,
    ReadDirective,
}

const SHARED: &[RuleSet] = &[RuleSet::Padding, RuleSet::Numbers];
const CELL: &[RuleSet] = &[
    RuleSet::CellHeader,
    RuleSet::Geometry,
    RuleSet::Shortcuts,
    RuleSet::Classifier,
    RuleSet::Parameters,
];
const SURFACE: &[RuleSet] = &[RuleSet::SurfaceHeader, RuleSet::Shortcuts];
const DATA: &[RuleSet] = &[
    RuleSet::Classifier,
    RuleSet::Shortcuts,
    RuleSet::DataItems,
    RuleSet::Isotopes,
    RuleSet::Parameters,
];
const READ: &[RuleSet] = &[
    RuleSet::ReadDirective,
    RuleSet::Classifier,
    RuleSet::Parameters,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    Cell,
    Surface,
    Data,
    Read,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Cell => "cell",
            RecordKind::Surface => "surface",
            RecordKind::Data => "data",
            RecordKind::Read => "read",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Grammar {
    kind: RecordKind,
    lexer_mode: LexerMode,
    rule_sets: Vec<RuleSet>,
    /// Parameters must be written `key=value` rather than `key value`
    parameters_need_equals: bool,
}

impl Grammar {
    fn compose(kind: RecordKind, lexer_mode: LexerMode, parts: &[&[RuleSet]]) -> Self {
        let mut rule_sets: Vec<RuleSet> = Vec::new();
        for part in parts {
            for rule in *part {
                if !rule_sets.contains(rule) {
                    rule_sets.push(*rule);
                }
            }
        }
        Self {
            kind,
            lexer_mode,
            rule_sets,
            parameters_need_equals: kind == RecordKind::Data,
        }
    }

    pub fn cell() -> Self {
        Self::compose(RecordKind::Cell, LexerMode::Cell, &[SHARED, CELL])
    }

    pub fn surface() -> Self {
        Self::compose(RecordKind::Surface, LexerMode::Surface, &[SHARED, SURFACE])
    }

    pub fn data() -> Self {
        Self::compose(RecordKind::Data, LexerMode::Data, &[SHARED, DATA])
    }

    pub fn read() -> Self {
        Self::compose(RecordKind::Read, LexerMode::Read, &[&[RuleSet::Padding], READ])
    }

    /// Grammar for a raw record: READ directives anywhere, otherwise by block
    pub fn for_record(record: &RawRecord) -> Self {
        if record.is_read_directive() {
            return Self::read();
        }
        match record.block {
            BlockType::Cell => Self::cell(),
            BlockType::Surface => Self::surface(),
            BlockType::Data => Self::data(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn lexer_mode(&self) -> LexerMode {
        self.lexer_mode
    }

    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    pub fn supports(&self, rule: RuleSet) -> bool {
        self.rule_sets.contains(&rule)
    }

    pub fn parameters_need_equals(&self) -> bool {
        self.parameters_need_equals
    }

    /// Run the entry production for this record kind
    pub fn parse(&self, parser: &mut dyn Parser) -> SyntaxResult<RecordTree> {
        match self.kind {
            RecordKind::Cell => builders::parse_cell(parser).map(RecordTree::Cell),
            RecordKind::Surface => builders::parse_surface(parser).map(RecordTree::Surface),
            RecordKind::Data => builders::parse_data(parser).map(RecordTree::Data),
            RecordKind::Read => builders::parse_read(parser).map(RecordTree::Read),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw(block: BlockType, text: &str) -> RawRecord {
        RawRecord {
            block,
            lines: text.lines().map(str::to_string).collect(),
            path: PathBuf::from("deck.i"),
            first_line: 1,
            include_depth: 0,
        }
    }

    #[test]
    fn test_composition_shares_rule_sets() {
        let cell = Grammar::cell();
        let data = Grammar::data();
        for shared in SHARED {
            assert!(cell.supports(*shared));
            assert!(data.supports(*shared));
        }
        assert!(cell.supports(RuleSet::Geometry));
        assert!(!data.supports(RuleSet::Geometry));
        assert!(data.supports(RuleSet::Isotopes));
        assert!(!Grammar::surface().supports(RuleSet::Parameters));
    }

    #[test]
    fn test_no_duplicate_rule_sets() {
        let grammar = Grammar::compose(RecordKind::Cell, LexerMode::Cell, &[SHARED, SHARED, CELL]);
        assert_eq!(grammar.rule_sets().len(), SHARED.len() + CELL.len());
    }

    #[test]
    fn test_grammar_for_record() {
        assert_eq!(Grammar::for_record(&raw(BlockType::Cell, "1 0 -1")).kind(), RecordKind::Cell);
        assert_eq!(
            Grammar::for_record(&raw(BlockType::Surface, "read file=geom.i")).kind(),
            RecordKind::Read
        );
        assert_eq!(
            Grammar::for_record(&raw(BlockType::Data, "m1 1001.80c 1")).lexer_mode(),
            LexerMode::Data
        );
        assert!(Grammar::data().parameters_need_equals());
        assert!(!Grammar::cell().parameters_need_equals());
    }
}
