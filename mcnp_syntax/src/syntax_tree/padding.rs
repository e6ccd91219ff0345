//! Whitespace, comments and punctuation between significant values

use super::node::{FormatContext, SyntaxNode};
use crate::tokens::{Token, TokenKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    text: String,
}

impl CommentNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Inline `$` comment rather than a full-line `c` comment
    pub fn is_dollar(&self) -> bool {
        self.text.starts_with('$')
    }

    /// Comment text without its delimiter
    pub fn contents(&self) -> &str {
        let body = if self.is_dollar() {
            &self.text[1..]
        } else {
            self.text.get(1..).unwrap_or("")
        };
        body.trim()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PaddingPiece {
    /// Spaces and tabs, never a newline
    Space(String),
    Newline,
    Comment(CommentNode),
    /// Punctuation kept as layout, e.g. `&`, `=`, `(`, `:` or `#`
    Literal(String),
}

impl PaddingPiece {
    pub fn text(&self) -> &str {
        match self {
            PaddingPiece::Space(text) | PaddingPiece::Literal(text) => text,
            PaddingPiece::Newline => "\n",
            PaddingPiece::Comment(comment) => comment.text(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaddingNode {
    pieces: Vec<PaddingPiece>,
}

impl PaddingNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Padding made of raw whitespace
    pub fn from_text(text: &str) -> Self {
        let mut node = Self::new();
        node.append_text(text);
        node
    }

    pub fn space() -> Self {
        Self::from_text(" ")
    }

    /// Append whitespace, splitting out newlines
    pub fn append_text(&mut self, text: &str) {
        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                match self.pieces.last_mut() {
                    Some(PaddingPiece::Space(existing)) => existing.push_str(part),
                    _ => self.pieces.push(PaddingPiece::Space(part.to_string())),
                }
            }
            if parts.peek().is_some() {
                self.pieces.push(PaddingPiece::Newline);
            }
        }
    }

    pub fn append_comment(&mut self, comment: CommentNode) {
        self.pieces.push(PaddingPiece::Comment(comment));
    }

    pub fn append_literal(&mut self, literal: impl Into<String>) {
        self.pieces.push(PaddingPiece::Literal(literal.into()));
    }

    /// Append a padding token as lexed
    pub fn append_token(&mut self, token: &Token) {
        match token.kind {
            TokenKind::Space => self.append_text(&token.text),
            TokenKind::Comment | TokenKind::DollarComment => {
                self.append_comment(CommentNode::new(token.text.clone()))
            }
            _ => self.append_literal(token.text.clone()),
        }
    }

    pub fn extend(&mut self, other: PaddingNode) {
        for piece in other.pieces {
            match piece {
                PaddingPiece::Space(text) => self.append_text(&text),
                piece => self.pieces.push(piece),
            }
        }
    }

    pub fn pieces(&self) -> &[PaddingPiece] {
        &self.pieces
    }

    pub fn pieces_mut(&mut self) -> &mut Vec<PaddingPiece> {
        &mut self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn is_space(&self, index: usize) -> bool {
        matches!(self.pieces.get(index), Some(PaddingPiece::Space(_)))
    }

    pub fn is_newline(&self, index: usize) -> bool {
        matches!(self.pieces.get(index), Some(PaddingPiece::Newline))
    }

    pub fn piece_text(&self, index: usize) -> Option<&str> {
        self.pieces.get(index).map(PaddingPiece::text)
    }

    /// Only spaces and newlines
    pub fn is_whitespace(&self) -> bool {
        self.pieces
            .iter()
            .all(|p| matches!(p, PaddingPiece::Space(_) | PaddingPiece::Newline))
    }

    pub fn contains_newline(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, PaddingPiece::Newline))
    }

    /// A comment with no newline after it would swallow whatever is
    /// appended next
    pub fn has_dangling_comment(&self) -> bool {
        let last_comment = self
            .pieces
            .iter()
            .rposition(|p| matches!(p, PaddingPiece::Comment(_)));
        match last_comment {
            Some(index) => !self.pieces[index..]
                .iter()
                .any(|p| matches!(p, PaddingPiece::Newline)),
            None => false,
        }
    }

    /// Terminate a dangling comment so following text stays live
    pub fn close_dangling_comment(&mut self) {
        if self.has_dangling_comment() {
            self.pieces.push(PaddingPiece::Newline);
        }
    }

    /// The last comment if nothing but whitespace follows it
    pub fn trailing_comment(&self) -> Option<&CommentNode> {
        let index = self.trailing_comment_index()?;
        match &self.pieces[index] {
            PaddingPiece::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    fn trailing_comment_index(&self) -> Option<usize> {
        let index = self
            .pieces
            .iter()
            .rposition(|p| matches!(p, PaddingPiece::Comment(_)))?;
        let tail_is_layout = self.pieces[index + 1..]
            .iter()
            .all(|p| matches!(p, PaddingPiece::Space(_) | PaddingPiece::Newline));
        tail_is_layout.then_some(index)
    }

    /// Remove the trailing comment together with the layout after it
    pub fn delete_trailing_comment(&mut self) -> Option<CommentNode> {
        let index = self.trailing_comment_index()?;
        match self.pieces.drain(index..).next() {
            Some(PaddingPiece::Comment(comment)) => Some(comment),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        self.pieces.iter().map(PaddingPiece::text).collect()
    }
}

impl SyntaxNode for PaddingNode {
    fn format(&self, _ctx: &mut FormatContext) -> String {
        self.text()
    }

    fn comments(&self) -> Vec<&CommentNode> {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                PaddingPiece::Comment(comment) => Some(comment),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_are_split_out() {
        let padding = PaddingNode::from_text("  \n     ");
        assert_eq!(padding.len(), 3);
        assert!(padding.is_space(0));
        assert!(padding.is_newline(1));
        assert!(padding.is_space(2));
        assert_eq!(padding.text(), "  \n     ");
    }

    #[test]
    fn test_dangling_comment() {
        let mut padding = PaddingNode::space();
        padding.append_comment(CommentNode::new("$ note"));
        assert!(padding.has_dangling_comment());

        padding.close_dangling_comment();
        assert!(!padding.has_dangling_comment());
        assert_eq!(padding.text(), " $ note\n");
    }

    #[test]
    fn test_trailing_comment_removal() {
        let mut padding = PaddingNode::space();
        padding.append_comment(CommentNode::new("$ sphere"));
        padding.append_text("\n");

        assert_eq!(padding.trailing_comment().map(|c| c.contents()), Some("sphere"));
        let removed = padding.delete_trailing_comment();
        assert_eq!(removed.map(|c| c.is_dollar()), Some(true));
        assert_eq!(padding.text(), " ");
    }

    #[test]
    fn test_comment_contents() {
        assert_eq!(CommentNode::new("c  fuel pin").contents(), "fuel pin");
        assert!(!CommentNode::new("C").is_dollar());
        assert_eq!(CommentNode::new("C").contents(), "");
    }

    #[test]
    fn test_comments_listed_in_order() {
        let mut padding = PaddingNode::new();
        padding.append_comment(CommentNode::new("c one"));
        padding.append_text("\n");
        padding.append_comment(CommentNode::new("c two"));
        let texts: Vec<_> = padding.comments().iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["c one", "c two"]);
    }
}
