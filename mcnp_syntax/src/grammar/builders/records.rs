//! Entry productions, one per record kind

use super::atomic::{expect_end, expect_value, parse_classifier, parse_padding, starts_parameter, unexpected};
use super::geometry::parse_geometry;
use super::lists::{parse_isotopes, parse_parameters, parse_value_list};
use super::Parser;
use crate::grammar::RuleSet;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::syntax_tree::{
    CellRecord, DataBody, DataRecord, ListNode, ReadRecord, SurfaceRecord, ValueKind, ValueNode,
};
use crate::tokens::TokenKind;

fn current_kind(parser: &dyn Parser) -> Option<TokenKind> {
    parser.current().map(|t| t.kind)
}

/// `number material [density] geometry [parameters]`
pub fn parse_cell(parser: &mut dyn Parser) -> SyntaxResult<CellRecord> {
    let leading = parse_padding(parser);
    let number = expect_value(parser, ValueKind::Int, "cell number")?;

    if let Some(token) = parser.current() {
        if token.is_word("like") {
            return Err(SyntaxError::unsupported_feature("LIKE n BUT", token.span));
        }
    }

    let material = expect_value(parser, ValueKind::Int, "material number")?;
    let density = if material.as_i64() == Some(0) {
        None
    } else {
        let mut density = expect_value(parser, ValueKind::Float, "density")?;
        density.make_negatable_float();
        Some(density)
    };

    let geometry = parse_geometry(parser)?;
    let parameters = parse_parameters(parser)?;
    expect_end(parser)?;

    Ok(CellRecord {
        leading,
        number,
        material,
        density,
        geometry,
        parameters,
        half_space: None,
    })
}

/// `[*|+]number [transform] mnemonic constants`
pub fn parse_surface(parser: &mut dyn Parser) -> SyntaxResult<SurfaceRecord> {
    let leading = parse_padding(parser);

    let mut modifier = None;
    let number = match parser.current().cloned() {
        Some(token) if matches!(token.kind, TokenKind::Asterisk | TokenKind::Plus) => {
            modifier = ValueNode::parse(&token.text, ValueKind::Text, None).map(ValueNode::never_padded);
            parser.advance();
            expect_value(parser, ValueKind::Int, "surface number")?
        }
        // `+1` lexes as a signed number
        Some(token) if token.kind == TokenKind::Number && token.text.starts_with('+') => {
            modifier = ValueNode::parse("+", ValueKind::Text, None).map(ValueNode::never_padded);
            parser.advance();
            let Some(node) = ValueNode::parse(&token.text[1..], ValueKind::Int, parse_padding(parser)) else {
                return Err(SyntaxError::unexpected_token("surface number", &token.text, token.span));
            };
            node
        }
        _ => expect_value(parser, ValueKind::Int, "surface number")?,
    };

    let transform = match current_kind(parser) {
        Some(TokenKind::Number | TokenKind::Null) => {
            Some(expect_value(parser, ValueKind::Int, "transform number")?)
        }
        _ => None,
    };

    if current_kind(parser) != Some(TokenKind::SurfaceType) {
        return Err(unexpected(parser, "surface type"));
    }
    let kind = expect_value(parser, ValueKind::Text, "surface type")?;
    let constants = parse_value_list(parser, ValueKind::Float)?;
    expect_end(parser)?;

    Ok(SurfaceRecord {
        leading,
        modifier,
        number,
        transform,
        kind,
        constants,
    })
}

/// `classifier [keyword] [items | isotopes] [parameters]`
pub fn parse_data(parser: &mut dyn Parser) -> SyntaxResult<DataRecord> {
    let leading = parse_padding(parser);
    let classifier = parse_classifier(parser)?;

    let keyword = match current_kind(parser) {
        Some(TokenKind::Keyword) if !starts_parameter(parser) => {
            Some(expect_value(parser, ValueKind::Text, "keyword")?)
        }
        _ => None,
    };

    let is_material = classifier.prefix().eq_ignore_ascii_case("m")
        && parser.grammar().supports(RuleSet::Isotopes)
        && matches!(current_kind(parser), Some(TokenKind::Zaid | TokenKind::Number));
    let body = if is_material {
        DataBody::Isotopes(parse_isotopes(parser)?)
    } else if parser.grammar().supports(RuleSet::DataItems) {
        DataBody::Values(parse_value_list(parser, ValueKind::Float)?)
    } else {
        DataBody::Values(ListNode::new())
    };

    let parameters = parse_parameters(parser)?;
    expect_end(parser)?;

    Ok(DataRecord {
        leading,
        classifier,
        keyword,
        body,
        parameters,
    })
}

/// `READ key=value ...`
pub fn parse_read(parser: &mut dyn Parser) -> SyntaxResult<ReadRecord> {
    let leading = parse_padding(parser);
    match parser.current() {
        Some(token) if token.is_word("read") => {}
        _ => return Err(unexpected(parser, "READ")),
    }
    let keyword = expect_value(parser, ValueKind::Text, "READ")?;
    let parameters = parse_parameters(parser)?;
    expect_end(parser)?;

    Ok(ReadRecord {
        leading,
        keyword,
        parameters,
    })
}
