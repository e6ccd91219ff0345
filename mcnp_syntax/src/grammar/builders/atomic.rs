//! Padding, single values and classifiers

use super::Parser;
use crate::grammar::RuleSet;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::syntax_tree::{ClassifierNode, PaddingNode, ParticleNode, ValueKind, ValueNode};
use crate::tokens::TokenKind;

/// Error for the current token, or for the end of the record
pub fn unexpected(parser: &dyn Parser, expected: &str) -> SyntaxError {
    match parser.current() {
        Some(token) => SyntaxError::unexpected_token(expected, &token.text, token.span),
        None => SyntaxError::unexpected_end(expected, parser.current_span()),
    }
}

/// Consume a run of whitespace, comments and `&` markers
pub fn parse_padding(parser: &mut dyn Parser) -> Option<PaddingNode> {
    let mut padding: Option<PaddingNode> = None;
    while let Some(token) = parser.current() {
        if !token.is_padding() {
            break;
        }
        padding.get_or_insert_with(PaddingNode::new).append_token(token);
        parser.advance();
    }
    padding
}

/// Consume one token as a value of `kind`, with the padding after it
pub fn expect_value(parser: &mut dyn Parser, kind: ValueKind, expected: &str) -> SyntaxResult<ValueNode> {
    let accepted = match (parser.current().map(|t| t.kind), kind) {
        (Some(TokenKind::Number | TokenKind::Null), ValueKind::Int | ValueKind::Float) => true,
        (Some(kind), ValueKind::Text) => !kind.is_padding(),
        _ => false,
    };
    if !accepted {
        return Err(unexpected(parser, expected));
    }
    let Some(token) = parser.current().cloned() else {
        return Err(unexpected(parser, expected));
    };
    let node = ValueNode::parse(&token.text, kind, None)
        .ok_or_else(|| SyntaxError::unexpected_token(expected, &token.text, token.span))?;
    parser.advance();
    let padding = parse_padding(parser);
    Ok(match padding {
        Some(padding) => node.with_padding(padding),
        None => node,
    })
}

/// Fail unless only layout is left
pub fn expect_end(parser: &mut dyn Parser) -> SyntaxResult<()> {
    parse_padding(parser);
    match parser.current() {
        None => Ok(()),
        Some(_) => Err(unexpected(parser, "end of record")),
    }
}

fn is_particle_token(kind: TokenKind, text: &str) -> bool {
    match kind {
        TokenKind::ParticleSpecial | TokenKind::Comma => true,
        TokenKind::Particle | TokenKind::Text | TokenKind::Keyword | TokenKind::SurfaceType => {
            text.chars().count() == 1
        }
        _ => false,
    }
}

/// Whether a parameter (`key[:particles] [=]`) begins at the current token
pub fn starts_parameter(parser: &dyn Parser) -> bool {
    let Some(token) = parser.current() else {
        return false;
    };
    let need_equals = parser.grammar().parameters_need_equals();
    let mut offset = usize::from(matches!(token.kind, TokenKind::Asterisk | TokenKind::Plus));
    match parser.peek_ahead(offset) {
        Some(word) if word.kind.is_word() => offset += 1,
        _ => return false,
    }
    if !need_equals {
        return true;
    }

    while let Some(token) = parser.peek_ahead(offset) {
        match token.kind {
            TokenKind::Equals => return true,
            TokenKind::Number | TokenKind::Null | TokenKind::Colon => offset += 1,
            kind if kind.is_padding() || is_particle_token(kind, &token.text) => offset += 1,
            _ => return false,
        }
    }
    false
}

/// `[modifier]prefix[number][:particles]` followed by its padding
pub fn parse_classifier(parser: &mut dyn Parser) -> SyntaxResult<ClassifierNode> {
    if !parser.grammar().supports(RuleSet::Classifier) {
        return Err(unexpected(parser, "value"));
    }

    let modifier = match parser.current() {
        Some(token) if matches!(token.kind, TokenKind::Asterisk | TokenKind::Plus) => {
            let node = ValueNode::parse(&token.text, ValueKind::Text, None);
            parser.advance();
            node
        }
        _ => None,
    };

    let prefix = match parser.current() {
        Some(token) if token.kind.is_word() => {
            let node = ValueNode::parse(&token.text, ValueKind::Text, None);
            parser.advance();
            node
        }
        _ => None,
    };
    let Some(prefix) = prefix else {
        return Err(unexpected(parser, "record name"));
    };

    let mut classifier = ClassifierNode::new(prefix);
    if let Some(modifier) = modifier {
        classifier = classifier.with_modifier(modifier);
    }

    if let Some(token) = parser.current() {
        let unsigned = !token.text.starts_with(['+', '-']);
        if token.kind.is_number() && unsigned {
            if let Some(number) = ValueNode::parse(&token.text, ValueKind::Int, None) {
                classifier = classifier.with_number(number.never_padded());
                parser.advance();
            }
        }
    }

    if parser.current().map(|t| t.kind) == Some(TokenKind::Colon) {
        let colon = parser.current_span();
        parser.advance();
        let mut text = String::from(":");
        while let Some(token) = parser.current() {
            if !is_particle_token(token.kind, &token.text) {
                break;
            }
            text.push_str(&token.text);
            parser.advance();
        }
        let particles = ParticleNode::parse(&text)
            .ok_or_else(|| SyntaxError::unexpected_token("particle list", &text, colon))?;
        classifier = classifier.with_particles(particles);
    }

    if let Some(padding) = parse_padding(parser) {
        classifier = classifier.with_padding(padding);
    }
    Ok(classifier)
}
