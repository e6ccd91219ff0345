//! Moving between the geometry syntax tree and its half-space view
//!
//! Reading looks through parentheses and expands shorthand runs into
//! intersections. Writing back reuses every syntax entry a half-space node
//! came from, so only edited parts of a cell change on output; new operators
//! get a single space or `:` and parentheses only where precedence needs them.

use super::error::GeometryError;
use super::half_space::{HalfSpace, HalfSpaceNode, NodeId, Operator, Unit};
use crate::log_debug;
use crate::syntax_tree::{
    CellRecord, GeometryBranch, GeometryEntry, GeometryId, GeometryOperator, GeometryTree,
    PaddingNode, ShortcutNode, Value, ValueNode,
};
use std::collections::HashSet;

fn leaf_number(node: &ValueNode, id: GeometryId) -> Result<i64, GeometryError> {
    node.as_i64().ok_or_else(|| {
        GeometryError::illegal_state(&format!("geometry entry {} is not an integer", id))
    })
}

fn literal(text: &str) -> PaddingNode {
    let mut padding = PaddingNode::new();
    padding.append_literal(text);
    padding
}

impl HalfSpace {
    /// Semantic view of a parsed geometry
    pub fn from_tree(tree: &GeometryTree) -> Result<HalfSpace, GeometryError> {
        if tree.is_empty() {
            return Err(GeometryError::illegal_state("geometry has no entries"));
        }
        let mut half_space = HalfSpace::empty();
        let root = read_entry(tree, tree.root(), &mut half_space)?;
        half_space.set_root(root);
        Ok(half_space)
    }

    /// Geometry syntax built from scratch
    pub fn to_geometry(&self) -> GeometryTree {
        let mut tree = GeometryTree::empty();
        self.sync_into(&mut tree);
        tree
    }

    /// Write this half-space into `tree`, reusing the entries it came from
    pub fn sync_into(&self, tree: &mut GeometryTree) {
        let mut claimed = HashSet::new();
        let root = self.emit(self.root(), tree, &mut claimed);
        tree.set_root(root);
    }

    fn is_cell_unit(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(HalfSpaceNode::Unit { unit, .. }) if unit.is_cell)
    }

    fn is_union(&self, id: NodeId) -> bool {
        matches!(
            self.node(id),
            Some(HalfSpaceNode::Branch {
                operator: Operator::Or,
                ..
            })
        )
    }

    /// Signed surface numbers when `id` is a plain intersection run
    fn intersection_run(&self, id: NodeId) -> Option<Vec<i64>> {
        match self.node(id)? {
            HalfSpaceNode::Unit { unit, .. } if !unit.is_cell => Some(vec![unit.signed()]),
            HalfSpaceNode::Branch {
                operator: Operator::And,
                left,
                right: Some(right),
                ..
            } => {
                let mut values = self.intersection_run(*left)?;
                values.extend(self.intersection_run(*right)?);
                Some(values)
            }
            _ => None,
        }
    }

    fn emit(&self, id: NodeId, tree: &mut GeometryTree, claimed: &mut HashSet<GeometryId>) -> GeometryId {
        let Some(node) = self.node(id) else {
            return tree.root();
        };
        let origin = node
            .origin()
            .filter(|origin| *origin < tree.len() && claimed.insert(*origin));

        // An untouched shorthand run stays as written
        let target = origin.map(|origin| peel(tree, origin));
        if let (Some(origin), Some(target)) = (origin, target) {
            if let Some(GeometryEntry::Shortcut(shortcut)) = tree.entry(target) {
                if self.intersection_run(id).as_deref() == Some(&shortcut_values(shortcut)[..]) {
                    return origin;
                }
            }
        }

        match node {
            HalfSpaceNode::Unit { unit, .. } => {
                if let (Some(origin), Some(target)) = (origin, target) {
                    if let Some(GeometryEntry::Leaf(leaf)) = tree.entry_mut(target) {
                        leaf.set_value(Some(Value::Int(unit.divider)));
                        leaf.set_is_negative(!unit.side);
                        return origin;
                    }
                }
                new_leaf(tree, unit)
            }
            HalfSpaceNode::Branch {
                operator: Operator::Complement,
                left,
                ..
            } => {
                let mut operand = self.emit(*left, tree, claimed);
                if !self.is_cell_unit(*left) && !is_group(tree, operand) {
                    operand = wrap_in_group(tree, operand);
                }
                if let (Some(origin), Some(target)) = (origin, target) {
                    if let Some(GeometryEntry::Branch(branch)) = tree.entry_mut(target) {
                        if branch.operator == GeometryOperator::Complement {
                            branch.left = operand;
                            return origin;
                        }
                    }
                }
                tree.push(GeometryEntry::Branch(GeometryBranch::complement(
                    literal("#"),
                    operand,
                )))
            }
            HalfSpaceNode::Branch {
                operator,
                left,
                right,
                ..
            } => {
                let syntax_operator = match operator {
                    Operator::Or => GeometryOperator::Union,
                    _ => GeometryOperator::Intersection,
                };
                let left_id = self.emit_operand(*left, *operator, tree, claimed);
                let Some(right) = right else {
                    return left_id;
                };
                let right_id = self.emit_operand(*right, *operator, tree, claimed);

                if let (Some(origin), Some(target)) = (origin, target) {
                    if let Some(GeometryEntry::Branch(branch)) = tree.entry_mut(target) {
                        if branch.operator.is_binary() {
                            branch.left = left_id;
                            branch.right = Some(right_id);
                            branch.switch_operator(syntax_operator);
                            return origin;
                        }
                    }
                }
                let padding = match operator {
                    Operator::Or => literal(":"),
                    _ => PaddingNode::space(),
                };
                tree.push(GeometryEntry::Branch(GeometryBranch::binary(
                    syntax_operator,
                    left_id,
                    padding,
                    right_id,
                )))
            }
        }
    }

    /// Emit an operand, parenthesizing a union inside an intersection
    fn emit_operand(
        &self,
        id: NodeId,
        parent: Operator,
        tree: &mut GeometryTree,
        claimed: &mut HashSet<GeometryId>,
    ) -> GeometryId {
        let emitted = self.emit(id, tree, claimed);
        if parent == Operator::And && self.is_union(id) && !is_group(tree, emitted) {
            log_debug!("Parenthesizing union operand", "entry" => emitted);
            wrap_in_group(tree, emitted)
        } else {
            emitted
        }
    }
}

fn read_entry(tree: &GeometryTree, id: GeometryId, half_space: &mut HalfSpace) -> Result<NodeId, GeometryError> {
    let entry = tree.entry(id).ok_or(GeometryError::unknown_node(id))?;
    match entry {
        GeometryEntry::Leaf(node) => Ok(half_space.push(HalfSpaceNode::Unit {
            unit: Unit::surface(leaf_number(node, id)?),
            origin: Some(id),
        })),
        GeometryEntry::Shortcut(shortcut) => {
            let mut run: Option<NodeId> = None;
            for value in shortcut_values(shortcut) {
                let unit = half_space.push(HalfSpaceNode::Unit {
                    unit: Unit::surface(value),
                    origin: None,
                });
                run = Some(match run {
                    None => unit,
                    Some(left) => half_space.push(HalfSpaceNode::Branch {
                        operator: Operator::And,
                        left,
                        right: Some(unit),
                        origin: None,
                    }),
                });
            }
            let run = run.ok_or_else(|| GeometryError::illegal_state("shortcut expands to nothing"))?;
            half_space.set_node_origin(run, Some(id));
            Ok(run)
        }
        GeometryEntry::Branch(branch) => match branch.operator {
            GeometryOperator::Group => {
                let inner = read_entry(tree, branch.left, half_space)?;
                half_space.set_node_origin(inner, Some(id));
                Ok(inner)
            }
            GeometryOperator::Complement => {
                let operand = match tree.entry(branch.left) {
                    Some(GeometryEntry::Leaf(node)) => half_space.push(HalfSpaceNode::Unit {
                        unit: Unit::cell(leaf_number(node, branch.left)?),
                        origin: Some(branch.left),
                    }),
                    _ => read_entry(tree, branch.left, half_space)?,
                };
                Ok(half_space.push(HalfSpaceNode::Branch {
                    operator: Operator::Complement,
                    left: operand,
                    right: None,
                    origin: Some(id),
                }))
            }
            GeometryOperator::Intersection | GeometryOperator::Union => {
                let right = branch.right.ok_or_else(|| {
                    GeometryError::illegal_state(&format!("operator entry {} has one operand", id))
                })?;
                let left = read_entry(tree, branch.left, half_space)?;
                let right = read_entry(tree, right, half_space)?;
                let operator = if branch.operator == GeometryOperator::Union {
                    Operator::Or
                } else {
                    Operator::And
                };
                Ok(half_space.push(HalfSpaceNode::Branch {
                    operator,
                    left,
                    right: Some(right),
                    origin: Some(id),
                }))
            }
        },
    }
}

fn shortcut_values(shortcut: &ShortcutNode) -> Vec<i64> {
    shortcut.members().iter().filter_map(ValueNode::as_i64).collect()
}

/// Look through parentheses
fn peel(tree: &GeometryTree, mut id: GeometryId) -> GeometryId {
    while let Some(GeometryEntry::Branch(branch)) = tree.entry(id) {
        if branch.operator != GeometryOperator::Group {
            break;
        }
        id = branch.left;
    }
    id
}

fn is_group(tree: &GeometryTree, id: GeometryId) -> bool {
    matches!(
        tree.entry(id),
        Some(GeometryEntry::Branch(branch)) if branch.operator == GeometryOperator::Group
    )
}

fn wrap_in_group(tree: &mut GeometryTree, id: GeometryId) -> GeometryId {
    tree.push(GeometryEntry::Branch(GeometryBranch::group(
        literal("("),
        id,
        literal(")"),
    )))
}

fn new_leaf(tree: &mut GeometryTree, unit: &Unit) -> GeometryId {
    let mut leaf = ValueNode::int(unit.divider);
    leaf.make_negatable_identifier();
    leaf.set_is_negative(!unit.side);
    tree.push(GeometryEntry::Leaf(leaf))
}

// ============================================================================
// CELL ACCESS
// ============================================================================

impl CellRecord {
    /// Fresh half-space for this cell's current geometry
    pub fn build_half_space(&self) -> Result<HalfSpace, GeometryError> {
        let mut half_space = HalfSpace::from_tree(&self.geometry)?;
        half_space.set_cell(Some(self.number()));
        Ok(half_space)
    }

    /// Semantic geometry, derived from the syntax on first use
    pub fn half_space(&mut self) -> Result<&HalfSpace, GeometryError> {
        self.half_space_mut().map(|half_space| &*half_space)
    }

    /// Edits are written back when the record is formatted
    pub fn half_space_mut(&mut self) -> Result<&mut HalfSpace, GeometryError> {
        let half_space = match self.half_space.take() {
            Some(existing) => existing,
            None => self.build_half_space()?,
        };
        Ok(self.half_space.insert(half_space))
    }

    /// Replace the geometry; a half-space from another cell is imported
    pub fn set_half_space(&mut self, half_space: HalfSpace) {
        let number = self.number();
        let mut half_space = if half_space.cell() == Some(number) {
            half_space
        } else {
            half_space.import()
        };
        half_space.set_cell(Some(number));
        self.half_space = Some(half_space);
    }

    /// Fold pending half-space edits into the geometry syntax
    pub fn sync_geometry(&mut self) -> Result<(), GeometryError> {
        if let Some(half_space) = self.half_space.take() {
            half_space.sync_into(&mut self.geometry);
            self.half_space = Some(self.build_half_space()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_reader::{BlockType, RawRecord};
    use crate::syntax::parse_record;
    use crate::syntax_tree::{RecordTree, SyntaxNode};
    use std::path::PathBuf;

    fn cell(text: &str) -> CellRecord {
        let raw = RawRecord {
            block: BlockType::Cell,
            lines: text.split('\n').map(str::to_string).collect(),
            path: PathBuf::from("deck.i"),
            first_line: 1,
            include_depth: 0,
        };
        match parse_record(&raw) {
            Ok(RecordTree::Cell(cell)) => cell,
            other => panic!("expected a cell, got {:?}", other.map(|r| r.kind_name())),
        }
    }

    #[test]
    fn test_intersection_of_two_surfaces() {
        let mut record = cell("1 0 1 -2");
        let half_space = record.half_space().unwrap();
        let expected = HalfSpace::surface(1) & HalfSpace::surface(-2);
        assert_eq!(half_space.try_eq(&expected), Ok(true));
        assert_eq!(half_space.to_geometry().to_text(), "1 -2");
        assert_eq!(half_space.cell(), Some(1));
    }

    #[test]
    fn test_union_inside_intersection_is_parenthesized() {
        let h = (HalfSpace::surface(1) | HalfSpace::surface(2)) & HalfSpace::surface(3);
        assert_eq!(h.to_geometry().to_text(), "(1:2) 3");

        let h = HalfSpace::surface(1) & HalfSpace::surface(-2);
        assert_eq!(h.to_geometry().to_text(), "1 -2");

        let h = (HalfSpace::surface(1) & HalfSpace::surface(2)) | HalfSpace::surface(3);
        assert_eq!(h.to_geometry().to_text(), "1 2:3");
    }

    #[test]
    fn test_complement_rendering() {
        assert_eq!(HalfSpace::outside_cell(5).to_geometry().to_text(), "#5");
        let h = !(HalfSpace::surface(1) & HalfSpace::surface(-2));
        assert_eq!(h.to_geometry().to_text(), "#(1 -2)");
    }

    #[test]
    fn test_read_groups_and_complements() {
        let mut record = cell("4 0 (-1 : 2) #3");
        let half_space = record.half_space().unwrap();
        let expected =
            (HalfSpace::surface(-1) | HalfSpace::surface(2)) & HalfSpace::outside_cell(3);
        assert_eq!(half_space.try_eq(&expected), Ok(true));
        assert_eq!(half_space.cells(), vec![3]);
    }

    #[test]
    fn test_untouched_half_space_keeps_text() {
        let text = "4 0 ( -1 :  2 )  #3 $ outer\n     imp:n=1";
        let mut record = cell(text);
        record.half_space_mut().unwrap();
        assert_eq!(record.to_text(), text);
    }

    #[test]
    fn test_edit_keeps_comments_and_layout() {
        let mut record = cell("1 0 -1  2 $ c\n     imp:n=1");
        record
            .half_space_mut()
            .unwrap()
            .and_assign(&HalfSpace::surface(3));
        assert_eq!(record.to_text(), "1 0 -1  2 3 $ c\n     imp:n=1");

        record.sync_geometry().unwrap();
        assert_eq!(record.half_space().unwrap().leaf_count(), 3);
        assert_eq!(record.to_text(), "1 0 -1  2 3 $ c\n     imp:n=1");
    }

    #[test]
    fn test_comments_follow_pending_edit() {
        let mut record = cell("1 0 -1 $ first\n     2 $ second\n     imp:n=1");
        let mentions = |record: &CellRecord, word: &str| {
            record.comments().iter().any(|c| c.contents().contains(word))
        };
        assert!(mentions(&record, "first"));

        record.set_half_space(HalfSpace::surface(-1));
        assert!(!mentions(&record, "first"));
        assert!(!record.to_text().contains("first"));

        let pending: Vec<String> = record.comments().iter().map(|c| c.contents().to_string()).collect();
        record.sync_geometry().unwrap();
        let synced: Vec<String> = record.comments().iter().map(|c| c.contents().to_string()).collect();
        assert_eq!(pending, synced);
    }

    #[test]
    fn test_widening_to_a_union_adds_parentheses() {
        let mut record = cell("1 0 -1 2");
        let current = record.half_space().unwrap().clone();
        let widened = current.or(&HalfSpace::surface(3)).and(&HalfSpace::surface(4));
        record.set_half_space(widened);
        assert_eq!(record.to_text(), "1 0 (-1 2:3) 4");
    }

    #[test]
    fn test_shortcut_expands_and_survives() {
        let mut record = cell("2 0 1 -2 2R");
        let half_space = record.half_space().unwrap();
        assert_eq!(half_space.leaf_count(), 4);
        assert_eq!(half_space.surfaces(), vec![1, 2]);
        record.half_space_mut().unwrap();
        assert_eq!(record.to_text(), "2 0 1 -2 2R");
    }

    #[test]
    fn test_flip_surface_sense() {
        let mut record = cell("1 0 1 -2");
        let mut flipped = HalfSpace::surface(-1);
        flipped.and_assign(&HalfSpace::surface(-2));
        record.set_half_space(flipped);
        assert_eq!(record.to_text(), "1 0 -1 -2");
    }

    #[test]
    fn test_foreign_half_space_is_imported() {
        let mut donor = cell("9 0 -5 6");
        let donated = donor.half_space().unwrap().clone();
        let mut record = cell("1 0 1");
        record.set_half_space(donated);
        assert_eq!(record.half_space().unwrap().cell(), Some(1));
        assert_eq!(record.to_text(), "1 0 -5 6");
    }
}
