//! ZAID and fraction pairs of material records

use super::node::{FormatContext, SyntaxNode};
use super::padding::{CommentNode, PaddingNode};
use super::value::{Value, ValueNode};
use serde::Serialize;

/// One nuclide entry; a negative fraction is stored as a weight fraction
#[derive(Debug, Clone, Serialize)]
pub struct IsotopeEntry {
    zaid: ValueNode,
    fraction: ValueNode,
}

impl IsotopeEntry {
    pub fn new(zaid: ValueNode, mut fraction: ValueNode) -> Self {
        fraction.make_negatable_float();
        Self { zaid, fraction }
    }

    pub fn zaid(&self) -> &str {
        self.zaid.as_str().unwrap_or("")
    }

    /// Magnitude of the fraction; the sign lives in [`Self::is_weight_fraction`]
    pub fn fraction(&self) -> f64 {
        self.fraction.value().and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn is_weight_fraction(&self) -> bool {
        self.fraction.is_negative()
    }

    pub fn set_fraction(&mut self, fraction: f64, weight: bool) {
        self.fraction.set_value(Some(Value::Float(fraction.abs())));
        self.fraction.set_is_negative(weight);
    }

    pub fn fraction_node(&self) -> &ValueNode {
        &self.fraction
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IsotopesNode {
    entries: Vec<IsotopeEntry>,
}

impl IsotopesNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: IsotopeEntry) {
        self.entries.push(entry);
    }

    /// Append a new pair laid out as ` zaid fraction`
    pub fn add(&mut self, zaid: &str, fraction: f64, weight: bool) {
        if let Some(last) = self.entries.last_mut() {
            let padding = last.fraction.padding_or_default();
            if padding.is_empty() {
                padding.append_text(" ");
            } else {
                padding.close_dangling_comment();
            }
        }
        let zaid = ValueNode::text(zaid).with_padding(PaddingNode::space());
        let mut entry = IsotopeEntry::new(zaid, ValueNode::float(0.0));
        entry.set_fraction(fraction, weight);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[IsotopeEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [IsotopeEntry] {
        &mut self.entries
    }

    pub fn get(&self, zaid: &str) -> Option<&IsotopeEntry> {
        self.entries
            .iter()
            .find(|entry| entry.zaid().eq_ignore_ascii_case(zaid))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layout after the last fraction
    pub fn take_trailing_padding(&mut self) -> Option<PaddingNode> {
        self.entries.last_mut().and_then(|e| e.fraction.take_padding())
    }
}

impl SyntaxNode for IsotopesNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.zaid.format(ctx));
            out.push_str(&entry.fraction.format(ctx));
        }
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        self.entries
            .iter()
            .flat_map(|e| {
                let mut comments = e.zaid.comments();
                comments.extend(e.fraction.comments());
                comments
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_tree::value::ValueKind;

    fn pair(zaid: &str, fraction: &str, padding: &str) -> IsotopeEntry {
        IsotopeEntry::new(
            ValueNode::parse(zaid, ValueKind::Text, Some(PaddingNode::from_text(" "))).unwrap(),
            ValueNode::parse(fraction, ValueKind::Float, Some(PaddingNode::from_text(padding)))
                .unwrap(),
        )
    }

    #[test]
    fn test_round_trip() {
        let mut node = IsotopesNode::new();
        node.push(pair("1001.80c", "0.667", "  "));
        node.push(pair("8016.80c", "-0.333", ""));
        assert_eq!(node.to_text(), "1001.80c 0.667  8016.80c -0.333");
        assert!(node.entries()[1].is_weight_fraction());
        assert_eq!(node.entries()[1].fraction(), 0.333);
    }

    #[test]
    fn test_lookup_and_add() {
        let mut node = IsotopesNode::new();
        node.push(pair("1001.80c", "2", ""));
        node.add("8016.80C", 1.0, false);

        assert_eq!(node.len(), 2);
        assert!(node.get("8016.80c").is_some());
        assert!(node.to_text().starts_with("1001.80c 2 8016.80C "));
    }
}
