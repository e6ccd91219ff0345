//! Geometry syntax: an arena of operator applications over signed leaves
//!
//! The tree keeps every piece of punctuation and layout so an untouched
//! cell writes back byte for byte. Parentheses are explicit `Group` entries;
//! the semantic half-space view in [`crate::geometry`] looks through them.

use super::node::{FormatContext, SyntaxNode};
use super::padding::{CommentNode, PaddingNode};
use super::shortcut::ShortcutNode;
use super::value::ValueNode;
use serde::Serialize;

pub type GeometryId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryOperator {
    /// Juxtaposition
    Intersection,
    /// `:`
    Union,
    /// `#`
    Complement,
    /// `( ... )`
    Group,
}

impl GeometryOperator {
    pub fn is_binary(&self) -> bool {
        matches!(self, GeometryOperator::Intersection | GeometryOperator::Union)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeometryBranch {
    pub operator: GeometryOperator,
    pub left: GeometryId,
    /// Only binary operators have a right operand
    pub right: Option<GeometryId>,
    /// Text between the operands (`" : "`), or before the operand (`#`, `(`)
    pub operator_padding: PaddingNode,
    /// Closing `)` of a group with the layout before it
    pub closing: Option<PaddingNode>,
}

impl GeometryBranch {
    pub fn binary(operator: GeometryOperator, left: GeometryId, padding: PaddingNode, right: GeometryId) -> Self {
        Self {
            operator,
            left,
            right: Some(right),
            operator_padding: padding,
            closing: None,
        }
    }

    pub fn complement(padding: PaddingNode, operand: GeometryId) -> Self {
        Self {
            operator: GeometryOperator::Complement,
            left: operand,
            right: None,
            operator_padding: padding,
            closing: None,
        }
    }

    pub fn group(opening: PaddingNode, inner: GeometryId, closing: PaddingNode) -> Self {
        Self {
            operator: GeometryOperator::Group,
            left: inner,
            right: None,
            operator_padding: opening,
            closing: Some(closing),
        }
    }

    /// Turn an intersection into a union or back, touching only the punctuation
    pub fn switch_operator(&mut self, operator: GeometryOperator) {
        if self.operator == operator || !operator.is_binary() || !self.operator.is_binary() {
            return;
        }
        let mut padding = PaddingNode::new();
        match operator {
            GeometryOperator::Union => {
                padding.extend(self.operator_padding.clone());
                padding.append_literal(":");
            }
            _ => {
                for piece in self.operator_padding.pieces() {
                    if piece.text() != ":" {
                        padding.pieces_mut().push(piece.clone());
                    }
                }
                if padding.is_empty() {
                    padding.append_text(" ");
                }
            }
        }
        self.operator_padding = padding;
        self.operator = operator;
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum GeometryEntry {
    /// Signed surface number, or cell number under `#`
    Leaf(ValueNode),
    /// Shorthand run continuing an intersection chain
    Shortcut(ShortcutNode),
    Branch(GeometryBranch),
}

#[derive(Debug, Clone, Serialize)]
pub struct GeometryTree {
    nodes: Vec<GeometryEntry>,
    root: GeometryId,
    /// Layout between the last operand and the parameters
    trailing: Option<PaddingNode>,
}

impl GeometryTree {
    /// A tree holding a single leaf
    pub fn new(leaf: ValueNode) -> Self {
        Self {
            nodes: vec![GeometryEntry::Leaf(leaf)],
            root: 0,
            trailing: None,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            root: 0,
            trailing: None,
        }
    }

    pub fn push(&mut self, entry: GeometryEntry) -> GeometryId {
        self.nodes.push(entry);
        self.nodes.len() - 1
    }

    pub fn entry(&self, id: GeometryId) -> Option<&GeometryEntry> {
        self.nodes.get(id)
    }

    pub fn entry_mut(&mut self, id: GeometryId) -> Option<&mut GeometryEntry> {
        self.nodes.get_mut(id)
    }

    pub fn root(&self) -> GeometryId {
        self.root
    }

    pub fn set_root(&mut self, root: GeometryId) {
        self.root = root;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn trailing(&self) -> Option<&PaddingNode> {
        self.trailing.as_ref()
    }

    pub fn trailing_mut(&mut self) -> &mut PaddingNode {
        self.trailing.get_or_insert_with(PaddingNode::new)
    }

    pub fn set_trailing(&mut self, padding: Option<PaddingNode>) {
        self.trailing = padding;
    }

    /// Entries reachable from the root, in written order
    pub fn walk(&self) -> Vec<GeometryId> {
        let mut order = Vec::new();
        self.walk_from(self.root, &mut order);
        order
    }

    fn walk_from(&self, id: GeometryId, order: &mut Vec<GeometryId>) {
        let Some(entry) = self.nodes.get(id) else {
            return;
        };
        order.push(id);
        if let GeometryEntry::Branch(branch) = entry {
            self.walk_from(branch.left, order);
            if let Some(right) = branch.right {
                self.walk_from(right, order);
            }
        }
    }

    /// Leaf values in written order
    pub fn leaves(&self) -> Vec<&ValueNode> {
        self.walk()
            .into_iter()
            .filter_map(|id| match self.nodes.get(id) {
                Some(GeometryEntry::Leaf(node)) => Some(node),
                _ => None,
            })
            .collect()
    }

    fn format_entry(&self, id: GeometryId, ctx: &mut FormatContext) -> String {
        match self.nodes.get(id) {
            Some(GeometryEntry::Leaf(node)) => node.format(ctx),
            Some(GeometryEntry::Shortcut(node)) => node.format(ctx),
            Some(GeometryEntry::Branch(branch)) => {
                let left = self.format_entry(branch.left, ctx);
                let padding = branch.operator_padding.text();
                match branch.operator {
                    GeometryOperator::Intersection | GeometryOperator::Union => {
                        let right = branch
                            .right
                            .map(|r| self.format_entry(r, ctx))
                            .unwrap_or_default();
                        format!("{}{}{}", left, padding, right)
                    }
                    GeometryOperator::Complement => format!("{}{}", padding, left),
                    GeometryOperator::Group => {
                        let closing = branch
                            .closing
                            .as_ref()
                            .map_or_else(|| ")".to_string(), PaddingNode::text);
                        format!("{}{}{}", padding, left, closing)
                    }
                }
            }
            None => String::new(),
        }
    }
}

impl SyntaxNode for GeometryTree {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = self.format_entry(self.root, ctx);
        if let Some(trailing) = &self.trailing {
            out.push_str(&trailing.text());
        }
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = Vec::new();
        for id in self.walk() {
            match &self.nodes[id] {
                GeometryEntry::Leaf(node) => comments.extend(node.comments()),
                GeometryEntry::Shortcut(node) => comments.extend(node.comments()),
                GeometryEntry::Branch(branch) => {
                    comments.extend(branch.operator_padding.comments());
                    if let Some(closing) = &branch.closing {
                        comments.extend(closing.comments());
                    }
                }
            }
        }
        if let Some(trailing) = &self.trailing {
            comments.extend(trailing.comments());
        }
        comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_tree::value::ValueKind;

    fn leaf(text: &str) -> GeometryEntry {
        let mut node = ValueNode::parse(text, ValueKind::Int, None).unwrap();
        node.make_negatable_identifier();
        GeometryEntry::Leaf(node)
    }

    fn literal(text: &str) -> PaddingNode {
        let mut padding = PaddingNode::new();
        padding.append_literal(text);
        padding
    }

    /// `( -1 : 2 ) #3`
    fn sample() -> GeometryTree {
        let mut tree = GeometryTree::empty();
        let a = tree.push(leaf("-1"));
        let b = tree.push(leaf("2"));
        let mut colon = PaddingNode::from_text(" ");
        colon.append_literal(":");
        colon.append_text(" ");
        let union = tree.push(GeometryEntry::Branch(GeometryBranch::binary(
            GeometryOperator::Union,
            a,
            colon,
            b,
        )));
        let mut opening = literal("(");
        opening.append_text(" ");
        let mut closing = PaddingNode::from_text(" ");
        closing.append_literal(")");
        let group = tree.push(GeometryEntry::Branch(GeometryBranch::group(opening, union, closing)));
        let c = tree.push(leaf("3"));
        let complement = tree.push(GeometryEntry::Branch(GeometryBranch::complement(literal("#"), c)));
        let root = tree.push(GeometryEntry::Branch(GeometryBranch::binary(
            GeometryOperator::Intersection,
            group,
            PaddingNode::space(),
            complement,
        )));
        tree.set_root(root);
        tree
    }

    #[test]
    fn test_format_round_trip() {
        let mut tree = sample();
        assert_eq!(tree.to_text(), "( -1 : 2 ) #3");

        tree.trailing_mut().append_text("  ");
        assert_eq!(tree.to_text(), "( -1 : 2 ) #3  ");
    }

    #[test]
    fn test_leaves_in_order() {
        let tree = sample();
        let leaves: Vec<i64> = tree.leaves().iter().filter_map(|l| l.as_i64()).collect();
        assert_eq!(leaves, vec![-1, 2, 3]);
    }

    #[test]
    fn test_switch_operator_keeps_layout() {
        let mut branch = GeometryBranch::binary(
            GeometryOperator::Intersection,
            0,
            PaddingNode::from_text("  "),
            1,
        );
        branch.switch_operator(GeometryOperator::Union);
        assert_eq!(branch.operator_padding.text(), "  :");

        branch.switch_operator(GeometryOperator::Intersection);
        assert_eq!(branch.operator_padding.text(), "  ");
    }

    #[test]
    fn test_single_leaf() {
        let tree = GeometryTree::new(ValueNode::parse("-7", ValueKind::Int, None).unwrap());
        assert_eq!(tree.to_text(), "-7");
        assert_eq!(tree.walk(), vec![0]);
    }
}
