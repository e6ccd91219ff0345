//! Cell geometry: unions of intersections of complemented or grouped factors
//!
//! Layout after an operand is carried upward as pending padding until the
//! production that owns it is known: an intersection gap, the space before
//! a `:`, the space before a `)`, or the tree's trailing layout.

use super::atomic::{parse_padding, unexpected};
use super::Parser;
use crate::grammar::RuleSet;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::syntax_tree::{
    GeometryBranch, GeometryEntry, GeometryId, GeometryOperator, GeometryTree, Lead, PaddingNode,
    ShortcutNode, Value, ValueKind, ValueNode,
};
use crate::tokens::{ShortcutKind, TokenKind};

type Operand = (GeometryId, Option<PaddingNode>);

fn literal(text: &str) -> PaddingNode {
    let mut padding = PaddingNode::new();
    padding.append_literal(text);
    padding
}

fn starts_factor(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number | TokenKind::Null | TokenKind::LeftParen | TokenKind::Complement
    ) || kind.is_shortcut()
}

/// Signed value at the right edge of an operand
fn last_value(tree: &GeometryTree, id: GeometryId) -> Option<Value> {
    match tree.entry(id)? {
        GeometryEntry::Leaf(node) => node.print_value(),
        GeometryEntry::Shortcut(node) => node.members().last().and_then(ValueNode::print_value),
        GeometryEntry::Branch(branch) => last_value(tree, branch.right.unwrap_or(branch.left)),
    }
}

/// Parse the geometry of a cell record
pub fn parse_geometry(parser: &mut dyn Parser) -> SyntaxResult<GeometryTree> {
    if !parser.grammar().supports(RuleSet::Geometry) {
        return Err(unexpected(parser, "value"));
    }
    let mut tree = GeometryTree::empty();
    let (root, trailing) = parse_union(parser, &mut tree)?;
    tree.set_root(root);
    tree.set_trailing(trailing);
    Ok(tree)
}

fn parse_union(parser: &mut dyn Parser, tree: &mut GeometryTree) -> SyntaxResult<Operand> {
    let (mut left, mut pending) = parse_intersection(parser, tree)?;

    while parser.current().map(|t| t.kind) == Some(TokenKind::Colon) {
        let mut operator = pending.take().unwrap_or_default();
        operator.append_literal(":");
        parser.advance();
        if let Some(padding) = parse_padding(parser) {
            operator.extend(padding);
        }
        let (right, after) = parse_intersection(parser, tree)?;
        left = tree.push(GeometryEntry::Branch(GeometryBranch::binary(
            GeometryOperator::Union,
            left,
            operator,
            right,
        )));
        pending = after;
    }
    Ok((left, pending))
}

fn parse_intersection(parser: &mut dyn Parser, tree: &mut GeometryTree) -> SyntaxResult<Operand> {
    let (mut left, mut pending) = parse_factor(parser, tree)?;

    while let Some(kind) = parser.current().map(|t| t.kind) {
        if !starts_factor(kind) {
            break;
        }
        let gap = pending.take().unwrap_or_default();

        let (right, after) = match kind {
            TokenKind::Shortcut(shortcut) => parse_shortcut(parser, tree, left, shortcut)?,
            _ => parse_factor(parser, tree)?,
        };
        left = tree.push(GeometryEntry::Branch(GeometryBranch::binary(
            GeometryOperator::Intersection,
            left,
            gap,
            right,
        )));
        pending = after;
    }
    Ok((left, pending))
}

/// `nR` or `xM` continuing the chain from the value before it
fn parse_shortcut(
    parser: &mut dyn Parser,
    tree: &mut GeometryTree,
    previous: GeometryId,
    kind: ShortcutKind,
) -> SyntaxResult<Operand> {
    let span = parser.current_span();
    let Some(token) = parser.advance() else {
        return Err(unexpected(parser, "shortcut"));
    };
    if !parser.grammar().supports(RuleSet::Shortcuts) {
        return Err(SyntaxError::grammar_violation("Shortcuts are not allowed here", span));
    }

    let lead = Lead::Chained(last_value(tree, previous));
    let id = tree.len();
    let built = match kind {
        ShortcutKind::Repeat => ShortcutNode::repeat(id, lead, &token.text, None),
        ShortcutKind::Multiply => ShortcutNode::multiply(id, lead, &token.text, None),
        _ => {
            return Err(SyntaxError::grammar_violation(
                &format!("A {} shortcut cannot appear in a geometry", kind.as_str()),
                span,
            ))
        }
    };
    let node = built.map_err(|e| SyntaxError::malformed_shortcut(e, span))?;
    let entry = tree.push(GeometryEntry::Shortcut(node));
    Ok((entry, parse_padding(parser)))
}

fn parse_factor(parser: &mut dyn Parser, tree: &mut GeometryTree) -> SyntaxResult<Operand> {
    parser.enter()?;
    let operand = parse_factor_inner(parser, tree);
    parser.leave();
    operand
}

fn parse_factor_inner(parser: &mut dyn Parser, tree: &mut GeometryTree) -> SyntaxResult<Operand> {
    let Some(token) = parser.current().cloned() else {
        return Err(unexpected(parser, "surface number, '#' or '('"));
    };

    match token.kind {
        TokenKind::Number | TokenKind::Null => {
            let Some(mut leaf) = ValueNode::parse(&token.text, ValueKind::Int, None) else {
                return Err(SyntaxError::unexpected_token("surface number", &token.text, token.span));
            };
            leaf.make_negatable_identifier();
            parser.advance();
            let id = tree.push(GeometryEntry::Leaf(leaf));
            Ok((id, parse_padding(parser)))
        }
        TokenKind::Complement => {
            let mut opening = literal(&token.text);
            parser.advance();
            if let Some(padding) = parse_padding(parser) {
                opening.extend(padding);
            }
            match parser.current().map(|t| t.kind) {
                Some(TokenKind::Number | TokenKind::Null | TokenKind::LeftParen) => {}
                _ => return Err(unexpected(parser, "cell number or '(' after '#'")),
            }
            let (operand, after) = parse_factor(parser, tree)?;
            let id = tree.push(GeometryEntry::Branch(GeometryBranch::complement(opening, operand)));
            Ok((id, after))
        }
        TokenKind::LeftParen => {
            let mut opening = literal("(");
            parser.advance();
            if let Some(padding) = parse_padding(parser) {
                opening.extend(padding);
            }
            let (inner, pending) = parse_union(parser, tree)?;
            if parser.current().map(|t| t.kind) != Some(TokenKind::RightParen) {
                return Err(unexpected(parser, "')'"));
            }
            let mut closing = pending.unwrap_or_default();
            closing.append_literal(")");
            parser.advance();
            let id = tree.push(GeometryEntry::Branch(GeometryBranch::group(opening, inner, closing)));
            Ok((id, parse_padding(parser)))
        }
        _ => Err(SyntaxError::unexpected_token(
            "surface number, '#' or '('",
            &token.text,
            token.span,
        )),
    }
}
