//! Value lists, shorthand runs, material pairs and parameters

use super::atomic::{expect_value, parse_classifier, parse_padding, starts_parameter, unexpected};
use super::Parser;
use crate::grammar::RuleSet;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::syntax_tree::{
    IsotopeEntry, IsotopesNode, Lead, ListNode, PaddingNode, ParameterNode, ParametersNode,
    ShortcutError, ShortcutNode, ValueKind, ValueNode,
};
use crate::tokens::{ShortcutKind, Token, TokenKind};
use crate::utils::numeric::parse_int;

/// Integer where the text allows it, float otherwise
fn numeric_kind(text: &str, preferred: ValueKind) -> ValueKind {
    match preferred {
        ValueKind::Int if parse_int(text).is_none() => ValueKind::Float,
        other => other,
    }
}

/// Tokens a free list accepts as text items
fn is_text_item(parser: &dyn Parser, token: &Token) -> bool {
    let grammar = parser.grammar();
    if !grammar.supports(RuleSet::DataItems) && !grammar.supports(RuleSet::ReadDirective) {
        // cell parameters: transforms and lattice ranges, e.g. `fill=0:1 (2)`
        return grammar.supports(RuleSet::Parameters)
            && matches!(
                token.kind,
                TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Colon
            );
    }
    match token.kind {
        TokenKind::NumberWord
        | TokenKind::Zaid
        | TokenKind::ThermalLaw
        | TokenKind::FilePath
        | TokenKind::ParticleSpecial
        | TokenKind::LeftParen
        | TokenKind::RightParen
        | TokenKind::Asterisk
        | TokenKind::Plus
        | TokenKind::Colon
        | TokenKind::Comma => true,
        kind => kind.is_word(),
    }
}

fn push_shortcut(
    parser: &mut dyn Parser,
    list: &mut ListNode,
    kind: ShortcutKind,
    token: Token,
) -> SyntaxResult<()> {
    if !parser.grammar().supports(RuleSet::Shortcuts) {
        return Err(SyntaxError::grammar_violation(
            &format!("{} shortcut is not allowed here", kind.as_str()),
            token.span,
        ));
    }
    let id = list.next_shortcut_id();

    if kind == ShortcutKind::Jump {
        let padding = parse_padding(parser);
        let node = ShortcutNode::jump(id, &token.text, padding)
            .map_err(|e| SyntaxError::malformed_shortcut(e, token.span))?;
        list.push_shortcut(node);
        return Ok(());
    }

    let lead = if list.last_is_shortcut() {
        Lead::Chained(list.last_node().and_then(ValueNode::print_value))
    } else {
        match list.pop_value() {
            Some(value) => Lead::Owned(value),
            None => {
                return Err(SyntaxError::malformed_shortcut(
                    ShortcutError::MissingLead { kind: kind.as_str() },
                    token.span,
                ))
            }
        }
    };

    let built = if kind.is_interpolation() {
        let mid = parse_padding(parser);
        let end_kind = match parser.current() {
            Some(next) => numeric_kind(&next.text, ValueKind::Float),
            None => ValueKind::Float,
        };
        let end = expect_value(parser, end_kind, "interpolation bound")?;
        ShortcutNode::interpolate(id, kind, lead, &token.text, mid, end)
    } else {
        let padding = parse_padding(parser);
        match kind {
            ShortcutKind::Repeat => ShortcutNode::repeat(id, lead, &token.text, padding),
            _ => ShortcutNode::multiply(id, lead, &token.text, padding),
        }
    };
    let node = built.map_err(|e| SyntaxError::malformed_shortcut(e, token.span))?;

    list.push_shortcut(node);
    Ok(())
}

/// Numbers, shorthand runs and, where the grammar allows, free words
///
/// Stops at the first parameter or at a token the list cannot hold. The
/// layout after the final item is moved onto the list tail.
pub fn parse_value_list(parser: &mut dyn Parser, numeric: ValueKind) -> SyntaxResult<ListNode> {
    let mut list = ListNode::new();

    loop {
        let Some(token) = parser.current().cloned() else {
            break;
        };
        match token.kind {
            TokenKind::Number | TokenKind::Null => {
                let kind = numeric_kind(&token.text, numeric);
                list.push_value(expect_value(parser, kind, "number")?);
            }
            TokenKind::Shortcut(kind) => {
                parser.advance();
                push_shortcut(parser, &mut list, kind, token)?;
            }
            _ if starts_parameter(parser) => break,
            _ if is_text_item(parser, &token) => {
                list.push_value(expect_value(parser, ValueKind::Text, "data item")?);
            }
            _ => break,
        }
    }

    list.detach_tail();
    Ok(list)
}

/// `zaid fraction` pairs of a material record
pub fn parse_isotopes(parser: &mut dyn Parser) -> SyntaxResult<IsotopesNode> {
    let mut isotopes = IsotopesNode::new();

    while let Some(token) = parser.current() {
        let is_zaid = matches!(token.kind, TokenKind::Zaid | TokenKind::Number);
        if !is_zaid || starts_parameter(parser) {
            break;
        }
        let zaid = expect_value(parser, ValueKind::Text, "isotope identifier")?;
        let fraction = expect_value(parser, ValueKind::Float, "isotope fraction")?;
        isotopes.push(IsotopeEntry::new(zaid, fraction));
    }

    if isotopes.is_empty() {
        return Err(unexpected(parser, "isotope identifier"));
    }
    Ok(isotopes)
}

fn parse_parameter(parser: &mut dyn Parser) -> SyntaxResult<ParameterNode> {
    let classifier = parse_classifier(parser)?;

    let mut separator = None;
    if parser.current().map(|t| t.kind) == Some(TokenKind::Equals) {
        let mut equals = PaddingNode::new();
        equals.append_literal("=");
        parser.advance();
        if let Some(padding) = parse_padding(parser) {
            equals.extend(padding);
        }
        separator = Some(equals);
    } else if parser.grammar().parameters_need_equals() {
        return Err(unexpected(parser, "'='"));
    }

    let values = parse_value_list(parser, ValueKind::Int)?;
    if values.is_empty() && separator.is_some() {
        return Err(unexpected(parser, "parameter value"));
    }
    Ok(ParameterNode::new(classifier, separator, values))
}

/// Trailing `key[=]values` pairs; duplicates are reported and dropped
pub fn parse_parameters(parser: &mut dyn Parser) -> SyntaxResult<ParametersNode> {
    let mut parameters = ParametersNode::new();
    if !parser.grammar().supports(RuleSet::Parameters) {
        return Ok(parameters);
    }

    while starts_parameter(parser) {
        let span = parser.current_span();
        let parameter = parse_parameter(parser)?;
        if let Err(duplicate) = parameters.insert(parameter) {
            parser.report(SyntaxError::duplicate_parameter(&duplicate.key, span));
        }
    }
    Ok(parameters)
}
