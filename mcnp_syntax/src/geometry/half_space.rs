//! Half-space arena and its algebra
//!
//! A [`HalfSpace`] owns its nodes in a flat arena; combination always
//! allocates new parents, so subtrees are never shared and the arena is
//! acyclic. Nodes parsed from a cell remember the geometry entry they came
//! from (`origin`) so writing back can reuse the original punctuation.

use super::error::GeometryError;
use crate::syntax_tree::GeometryId;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    And,
    Or,
    Complement,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Complement => "complement",
        }
    }
}

/// One side of a divider: a surface, or a cell under `#`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Unit {
    pub divider: i64,
    /// `true` for the positive side
    pub side: bool,
    pub is_cell: bool,
}

impl Unit {
    /// Surface side from a signed number: `-2` is the negative side of 2
    pub fn surface(signed: i64) -> Self {
        Self {
            divider: signed.abs(),
            side: signed >= 0,
            is_cell: false,
        }
    }

    pub fn cell(number: i64) -> Self {
        Self {
            divider: number.abs(),
            side: true,
            is_cell: true,
        }
    }

    pub fn signed(&self) -> i64 {
        if self.side {
            self.divider
        } else {
            -self.divider
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cell {
            write!(f, "{}", self.divider)
        } else {
            write!(f, "{:+}", self.signed())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum HalfSpaceNode {
    Unit {
        unit: Unit,
        origin: Option<GeometryId>,
    },
    Branch {
        operator: Operator,
        left: NodeId,
        /// Absent for a complement
        right: Option<NodeId>,
        origin: Option<GeometryId>,
    },
}

impl HalfSpaceNode {
    pub fn origin(&self) -> Option<GeometryId> {
        match self {
            HalfSpaceNode::Unit { origin, .. } | HalfSpaceNode::Branch { origin, .. } => *origin,
        }
    }

    fn set_origin(&mut self, value: Option<GeometryId>) {
        match self {
            HalfSpaceNode::Unit { origin, .. } | HalfSpaceNode::Branch { origin, .. } => {
                *origin = value
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            HalfSpaceNode::Unit { .. } => "unit half-space",
            HalfSpaceNode::Branch { .. } => "half-space",
        }
    }

    fn children(&self) -> impl Iterator<Item = NodeId> {
        let (left, right) = match self {
            HalfSpaceNode::Unit { .. } => (None, None),
            HalfSpaceNode::Branch { left, right, .. } => (Some(*left), *right),
        };
        left.into_iter().chain(right)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HalfSpace {
    nodes: Vec<HalfSpaceNode>,
    root: NodeId,
    /// Number of the owning cell, resolved by lookup
    cell: Option<i64>,
}

impl HalfSpace {
    // === CONSTRUCTION ===

    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            root: 0,
            cell: None,
        }
    }

    pub fn unit(unit: Unit) -> Self {
        Self {
            nodes: vec![HalfSpaceNode::Unit { unit, origin: None }],
            root: 0,
            cell: None,
        }
    }

    /// One side of a surface, e.g. `HalfSpace::surface(-2)`
    pub fn surface(signed: i64) -> Self {
        Self::unit(Unit::surface(signed))
    }

    /// `#n`: everything outside cell `n`
    pub fn outside_cell(number: i64) -> Self {
        let mut half_space = Self::unit(Unit::cell(number));
        let inner = half_space.root;
        half_space.root = half_space.push(HalfSpaceNode::Branch {
            operator: Operator::Complement,
            left: inner,
            right: None,
            origin: None,
        });
        half_space
    }

    pub(crate) fn push(&mut self, node: HalfSpaceNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn set_node_origin(&mut self, id: NodeId, origin: Option<GeometryId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_origin(origin);
        }
    }

    // === ACCESSORS ===

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&HalfSpaceNode> {
        self.nodes.get(id)
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.nodes.get(self.root)? {
            HalfSpaceNode::Branch { operator, .. } => Some(*operator),
            HalfSpaceNode::Unit { .. } => None,
        }
    }

    pub fn cell(&self) -> Option<i64> {
        self.cell
    }

    pub fn set_cell(&mut self, cell: Option<i64>) {
        self.cell = cell;
    }

    /// Arena size, unreachable nodes included
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Reachable node ids, parents before children, left before right
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let children: Vec<NodeId> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Units in written order
    pub fn units(&self) -> Vec<Unit> {
        self.walk()
            .into_iter()
            .filter_map(|id| match self.nodes.get(id) {
                Some(HalfSpaceNode::Unit { unit, .. }) => Some(*unit),
                _ => None,
            })
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.units().len()
    }

    /// Longest root-to-unit path, counted in nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            deepest = deepest.max(depth);
            stack.extend(node.children().map(|child| (child, depth + 1)));
        }
        deepest
    }

    fn distinct(&self, cells: bool) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.units()
            .into_iter()
            .filter(|unit| unit.is_cell == cells)
            .map(|unit| unit.divider)
            .filter(|divider| seen.insert(*divider))
            .collect()
    }

    /// Distinct surface numbers in written order
    pub fn surfaces(&self) -> Vec<i64> {
        self.distinct(false)
    }

    /// Distinct numbers of complemented cells in written order
    pub fn cells(&self) -> Vec<i64> {
        self.distinct(true)
    }

    // === COPYING ===

    /// Copy the reachable nodes onto `target`, returning the new root and
    /// the old-to-new index table
    fn copy_into(
        &self,
        target: &mut Vec<HalfSpaceNode>,
        keep_origins: bool,
    ) -> (NodeId, Vec<Option<NodeId>>) {
        let order = self.walk();
        let mut table: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (offset, old) in order.iter().enumerate() {
            table[*old] = Some(target.len() + offset);
        }
        let translate = |id: NodeId| table.get(id).copied().flatten().unwrap_or_default();

        for old in &order {
            let Some(node) = self.nodes.get(*old) else {
                continue;
            };
            let mut copy = match node {
                HalfSpaceNode::Unit { unit, origin } => HalfSpaceNode::Unit {
                    unit: *unit,
                    origin: *origin,
                },
                HalfSpaceNode::Branch {
                    operator,
                    left,
                    right,
                    origin,
                } => HalfSpaceNode::Branch {
                    operator: *operator,
                    left: translate(*left),
                    right: right.map(translate),
                    origin: *origin,
                },
            };
            if !keep_origins {
                copy.set_origin(None);
            }
            target.push(copy);
        }
        let root = translate(self.root);
        (root, table)
    }

    /// Rebuild into a fresh, compact arena; `table[old]` is the new index
    pub fn deep_copy_with_table(&self) -> (HalfSpace, Vec<Option<NodeId>>) {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let (root, table) = self.copy_into(&mut nodes, true);
        (
            HalfSpace {
                nodes,
                root,
                cell: self.cell,
            },
            table,
        )
    }

    pub fn deep_copy(&self) -> HalfSpace {
        self.deep_copy_with_table().0
    }

    /// A copy detached from any cell and from its geometry syntax
    pub fn import(&self) -> HalfSpace {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let (root, _) = self.copy_into(&mut nodes, false);
        HalfSpace {
            nodes,
            root,
            cell: None,
        }
    }

    /// Append another tree; its syntax links survive only within one cell
    fn append(&mut self, other: &HalfSpace) -> NodeId {
        let same_cell = self.cell.is_some() && self.cell == other.cell;
        self.copy_into_self(other, same_cell)
    }

    fn copy_into_self(&mut self, other: &HalfSpace, keep_origins: bool) -> NodeId {
        let (root, _) = other.copy_into(&mut self.nodes, keep_origins);
        root
    }

    // === ALGEBRA ===

    fn combine(&self, operator: Operator, other: &HalfSpace) -> HalfSpace {
        let mut result = self.deep_copy();
        let left = result.root;
        let right = result.append(other);
        result.root = result.push(HalfSpaceNode::Branch {
            operator,
            left,
            right: Some(right),
            origin: None,
        });
        result
    }

    /// Intersection as a new tree
    pub fn and(&self, other: &HalfSpace) -> HalfSpace {
        self.combine(Operator::And, other)
    }

    /// Union as a new tree
    pub fn or(&self, other: &HalfSpace) -> HalfSpace {
        self.combine(Operator::Or, other)
    }

    pub fn complement(&self) -> HalfSpace {
        let mut result = self.deep_copy();
        let inner = result.root;
        result.root = result.push(HalfSpaceNode::Branch {
            operator: Operator::Complement,
            left: inner,
            right: None,
            origin: None,
        });
        result
    }

    /// Graft onto the right-most operand of the `operator` chain at the root
    fn graft(&mut self, operator: Operator, other: &HalfSpace) {
        let new_operand = self.append(other);

        let mut parent = None;
        let mut current = self.root;
        while let Some(HalfSpaceNode::Branch {
            operator: op,
            right: Some(right),
            ..
        }) = self.nodes.get(current)
        {
            if *op != operator {
                break;
            }
            parent = Some(current);
            current = *right;
        }

        let branch = self.push(HalfSpaceNode::Branch {
            operator,
            left: current,
            right: Some(new_operand),
            origin: None,
        });
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(HalfSpaceNode::Branch { right, .. }) => *right = Some(branch),
            _ => self.root = branch,
        }
    }

    pub fn and_assign(&mut self, other: &HalfSpace) {
        self.graft(Operator::And, other);
    }

    pub fn or_assign(&mut self, other: &HalfSpace) {
        self.graft(Operator::Or, other);
    }

    // === EQUALITY ===

    /// Structural equality; comparing a unit with a combination is an error
    pub fn try_eq(&self, other: &HalfSpace) -> Result<bool, GeometryError> {
        self.node_eq(self.root, other, other.root)
    }

    fn node_eq(&self, a: NodeId, other: &HalfSpace, b: NodeId) -> Result<bool, GeometryError> {
        let left = self.nodes.get(a).ok_or(GeometryError::unknown_node(a))?;
        let right = other.nodes.get(b).ok_or(GeometryError::unknown_node(b))?;
        match (left, right) {
            (HalfSpaceNode::Unit { unit: x, .. }, HalfSpaceNode::Unit { unit: y, .. }) => Ok(x == y),
            (
                HalfSpaceNode::Branch {
                    operator: op_a,
                    left: left_a,
                    right: right_a,
                    ..
                },
                HalfSpaceNode::Branch {
                    operator: op_b,
                    left: left_b,
                    right: right_b,
                    ..
                },
            ) => {
                if op_a != op_b || right_a.is_some() != right_b.is_some() {
                    return Ok(false);
                }
                if !self.node_eq(*left_a, other, *left_b)? {
                    return Ok(false);
                }
                match (right_a, right_b) {
                    (Some(x), Some(y)) => self.node_eq(*x, other, *y),
                    _ => Ok(true),
                }
            }
            (x, y) => Err(GeometryError::type_mismatch(x.kind_name(), y.kind_name())),
        }
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nodes.get(id) {
            Some(HalfSpaceNode::Unit { unit, .. }) => write!(f, "{}", unit),
            Some(HalfSpaceNode::Branch {
                operator: Operator::Complement,
                left,
                ..
            }) => {
                write!(f, "#")?;
                self.fmt_node(*left, f)
            }
            Some(HalfSpaceNode::Branch {
                operator,
                left,
                right,
                ..
            }) => {
                let symbol = if *operator == Operator::And { " * " } else { " : " };
                write!(f, "(")?;
                self.fmt_node(*left, f)?;
                write!(f, "{}", symbol)?;
                if let Some(right) = right {
                    self.fmt_node(*right, f)?;
                }
                write!(f, ")")
            }
            None => write!(f, "?"),
        }
    }
}

impl fmt::Display for HalfSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

impl BitAnd for HalfSpace {
    type Output = HalfSpace;

    fn bitand(self, rhs: HalfSpace) -> HalfSpace {
        self.and(&rhs)
    }
}

impl BitAnd for &HalfSpace {
    type Output = HalfSpace;

    fn bitand(self, rhs: &HalfSpace) -> HalfSpace {
        self.and(rhs)
    }
}

impl BitOr for HalfSpace {
    type Output = HalfSpace;

    fn bitor(self, rhs: HalfSpace) -> HalfSpace {
        self.or(&rhs)
    }
}

impl BitOr for &HalfSpace {
    type Output = HalfSpace;

    fn bitor(self, rhs: &HalfSpace) -> HalfSpace {
        self.or(rhs)
    }
}

impl Not for HalfSpace {
    type Output = HalfSpace;

    fn not(self) -> HalfSpace {
        self.complement()
    }
}

impl BitAndAssign for HalfSpace {
    fn bitand_assign(&mut self, rhs: HalfSpace) {
        self.and_assign(&rhs);
    }
}

impl BitOrAssign for HalfSpace {
    fn bitor_assign(&mut self, rhs: HalfSpace) {
        self.or_assign(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_display() {
        let h = HalfSpace::surface(1) & HalfSpace::surface(-2);
        assert_eq!(h.to_string(), "(+1 * -2)");
        let u = (HalfSpace::surface(1) | HalfSpace::surface(2)) & HalfSpace::outside_cell(5);
        assert_eq!(u.to_string(), "((+1 : +2) * #5)");
        assert_eq!((!HalfSpace::surface(3)).to_string(), "#+3");
    }

    #[test]
    fn test_repeated_combination_grows_linearly() {
        let n = 200;
        let mut h = HalfSpace::surface(1);
        for i in 2..=(n + 1) {
            h.and_assign(&HalfSpace::surface(i));
        }
        assert_eq!(h.leaf_count(), n as usize + 1);
        assert!(h.depth() <= n as usize + 2);
        assert_eq!(h.operator(), Some(Operator::And));
    }

    #[test]
    fn test_or_assign_keeps_precedence() {
        let mut h = HalfSpace::surface(1) & HalfSpace::surface(2);
        h |= HalfSpace::surface(3);
        assert_eq!(h.to_string(), "((+1 * +2) : +3)");
        h |= HalfSpace::surface(4);
        assert_eq!(h.to_string(), "((+1 * +2) : (+3 : +4))");
        assert_eq!(h.depth(), 3);
    }

    #[test]
    fn test_equality() {
        let a = HalfSpace::surface(1) & HalfSpace::surface(-2);
        let b = HalfSpace::surface(1) & HalfSpace::surface(-2);
        let c = HalfSpace::surface(1) | HalfSpace::surface(-2);
        assert_eq!(a.try_eq(&b), Ok(true));
        assert_eq!(a.try_eq(&c), Ok(false));
        assert_eq!(
            HalfSpace::surface(1).try_eq(&HalfSpace::surface(-1)),
            Ok(false)
        );
        assert_matches!(
            a.try_eq(&HalfSpace::surface(1)),
            Err(GeometryError::TypeMismatch { .. })
        );
    }

    #[test]
    fn test_cell_and_surface_units_differ() {
        let cell = HalfSpace::outside_cell(1);
        let surface = !HalfSpace::surface(1);
        assert_eq!(cell.try_eq(&surface), Ok(false));
    }

    #[test]
    fn test_deep_copy_compacts_and_relinks() {
        let mut h = HalfSpace::surface(1) & HalfSpace::surface(2);
        h.and_assign(&HalfSpace::surface(3));
        let (copy, table) = h.deep_copy_with_table();

        assert!(copy.arena_len() <= h.arena_len());
        assert_eq!(copy.arena_len(), h.walk().len());
        assert_eq!(table[h.root()], Some(copy.root()));
        assert_eq!(copy.try_eq(&h), Ok(true));
        assert_eq!(copy.to_string(), h.to_string());
    }

    #[test]
    fn test_collections() {
        let h = (HalfSpace::surface(-1) & HalfSpace::surface(2))
            | (HalfSpace::surface(1) & HalfSpace::outside_cell(7));
        assert_eq!(h.surfaces(), vec![1, 2]);
        assert_eq!(h.cells(), vec![7]);
        assert_eq!(h.leaf_count(), 4);
    }

    #[test]
    fn test_import_clears_links() {
        let mut h = HalfSpace::surface(4);
        h.set_node_origin(h.root(), Some(0));
        h.set_cell(Some(9));
        let imported = h.import();
        assert_eq!(imported.cell(), None);
        assert_eq!(imported.node(imported.root()).and_then(HalfSpaceNode::origin), None);
        assert_eq!(h.deep_copy().node(0).and_then(HalfSpaceNode::origin), Some(0));
    }
}
