//! The result of processing a deck

use super::error::{PipelineError, RecordError, RecordErrorSummary};
use crate::block_reader::{BlockType, FormatVersion, RawRecord};
use crate::geometry::HalfSpace;
use crate::logging::codes;
use crate::syntax_tree::{
    CellRecord, DataRecord, FormatContext, RecordTree, SurfaceRecord, SyntaxNode, Tolerance,
};
use crate::utils::Warning;
use crate::writer::{Deck, Writer};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A parsed record and where it came from
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedRecord {
    pub block: BlockType,
    pub path: PathBuf,
    pub first_line: u32,
    /// Records pulled in by READ are parsed but not written back
    pub include_depth: usize,
    pub tree: RecordTree,
}

impl ProcessedRecord {
    pub fn new(raw: RawRecord, tree: RecordTree) -> Self {
        Self {
            block: raw.block,
            path: raw.path,
            first_line: raw.first_line,
            include_depth: raw.include_depth,
            tree,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedInput {
    pub message: Option<Vec<String>>,
    pub title: String,
    pub records: Vec<ProcessedRecord>,
    pub warnings: Vec<Warning>,
    pub errors: Vec<RecordError>,
    pub data_block_terminated: bool,
    pub version: FormatVersion,
    pub tolerance: Tolerance,
}

impl ProcessedInput {
    pub fn new(version: FormatVersion, tolerance: Tolerance) -> Self {
        Self {
            message: None,
            title: String::new(),
            records: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            data_block_terminated: false,
            version,
            tolerance,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    // === LOOKUP ===

    pub fn cells(&self) -> impl Iterator<Item = &CellRecord> {
        self.records.iter().filter_map(|r| r.tree.as_cell())
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut CellRecord> {
        self.records.iter_mut().filter_map(|r| r.tree.as_cell_mut())
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &SurfaceRecord> {
        self.records.iter().filter_map(|r| r.tree.as_surface())
    }

    pub fn data(&self) -> impl Iterator<Item = &DataRecord> {
        self.records.iter().filter_map(|r| r.tree.as_data())
    }

    pub fn cell(&self, number: i64) -> Option<&CellRecord> {
        self.cells().find(|cell| cell.number() == number)
    }

    pub fn cell_mut(&mut self, number: i64) -> Option<&mut CellRecord> {
        self.cells_mut().find(|cell| cell.number() == number)
    }

    pub fn surface(&self, number: i64) -> Option<&SurfaceRecord> {
        self.surfaces().find(|surface| surface.number() == number)
    }

    /// Resolve the cell a half-space belongs to
    pub fn owner_of(&self, half_space: &HalfSpace) -> Option<&CellRecord> {
        half_space.cell().and_then(|number| self.cell(number))
    }

    // === OUTPUT ===

    /// Formatted root-file records in block order, plus formatting warnings
    pub fn deck(&self) -> (Deck, Vec<Warning>) {
        let mut ctx = FormatContext::new(self.tolerance);
        let mut deck = Deck {
            message: self.message.clone(),
            title: self.title.clone(),
            data_block_terminated: self.data_block_terminated,
            ..Deck::default()
        };
        for record in self.records.iter().filter(|r| r.include_depth == 0) {
            let text = record.tree.format(&mut ctx);
            match record.block {
                BlockType::Cell => deck.cells.push(text),
                BlockType::Surface => deck.surfaces.push(text),
                BlockType::Data => deck.data.push(text),
            }
        }
        (deck, ctx.take_warnings())
    }

    /// Output text with every warning raised while producing it
    pub fn write_with_warnings(&self) -> Result<(String, Vec<Warning>), PipelineError> {
        let mut writer = Writer::new(self.version)?;
        let (deck, mut warnings) = self.deck();
        let text = writer.write_deck(&deck);
        warnings.extend(writer.take_warnings());
        Ok((text, warnings))
    }

    pub fn write(&self) -> Result<String, PipelineError> {
        self.write_with_warnings().map(|(text, _)| text)
    }

    pub fn write_file(&self, path: &Path) -> Result<Vec<Warning>, PipelineError> {
        let mut writer = Writer::new(self.version)?;
        let (deck, mut warnings) = self.deck();
        writer.write_file(&deck, path)?;
        warnings.extend(writer.take_warnings());
        Ok(warnings)
    }

    pub fn summary(&self) -> InputSummary {
        let count = |block: BlockType| self.records.iter().filter(|r| r.block == block).count();
        InputSummary {
            title: self.title.clone(),
            version: self.version.to_string(),
            cells: count(BlockType::Cell),
            surfaces: count(BlockType::Surface),
            data: count(BlockType::Data),
            opaque: self
                .records
                .iter()
                .filter(|r| matches!(r.tree, RecordTree::Opaque(_)))
                .count(),
            included: self.records.iter().filter(|r| r.include_depth > 0).count(),
            errors: self.errors.iter().map(RecordError::summary).collect(),
            warnings: self
                .warnings
                .iter()
                .map(|w| WarningSummary {
                    code: w.code.as_str(),
                    message: w.message.clone(),
                    line: w.line,
                })
                .collect(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WarningSummary {
    pub code: &'static str,
    pub message: String,
    pub line: Option<u32>,
}

/// Counts and diagnostics for machine-readable reports
#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub title: String,
    pub version: String,
    pub cells: usize,
    pub surfaces: usize,
    pub data: usize,
    pub opaque: usize,
    pub included: usize,
    pub errors: Vec<RecordErrorSummary>,
    pub warnings: Vec<WarningSummary>,
    pub generated_at: String,
}

impl InputSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
            && !self
                .warnings
                .iter()
                .any(|w| w.code == codes::warnings::DOWNGRADED_ERROR.as_str())
    }
}
