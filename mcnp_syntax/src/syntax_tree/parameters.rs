//! Trailing `key=value` parameters of cell, data and READ records

use super::classifier::{classifier_key, ClassifierNode};
use super::list::ListNode;
use super::node::{FormatContext, SyntaxNode};
use super::padding::{CommentNode, PaddingNode};
use super::value::ValueNode;
use serde::Serialize;
use std::collections::HashMap;

/// One parameter: classifier, optional `=` separator, values
#[derive(Debug, Clone, Serialize)]
pub struct ParameterNode {
    classifier: ClassifierNode,
    /// `=` with the layout after it; absent for space-separated values
    separator: Option<PaddingNode>,
    values: ListNode,
}

impl ParameterNode {
    pub fn new(classifier: ClassifierNode, separator: Option<PaddingNode>, values: ListNode) -> Self {
        Self {
            classifier,
            separator,
            values,
        }
    }

    /// Build `key=v1 v2 ...` with default layout
    pub fn with_values(classifier: ClassifierNode, values: Vec<ValueNode>) -> Self {
        let mut separator = PaddingNode::new();
        separator.append_literal("=");
        let mut list = ListNode::new();
        let count = values.len();
        for (index, mut node) in values.into_iter().enumerate() {
            if index + 1 < count && node.padding().is_none() {
                node.set_padding(Some(PaddingNode::space()));
            }
            list.push_value(node);
        }
        Self::new(classifier, Some(separator), list)
    }

    pub fn key(&self) -> String {
        self.classifier.key()
    }

    pub fn classifier(&self) -> &ClassifierNode {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ClassifierNode {
        &mut self.classifier
    }

    pub fn has_equals(&self) -> bool {
        self.separator
            .as_ref()
            .is_some_and(|s| s.pieces().iter().any(|p| p.text() == "="))
    }

    pub fn values(&self) -> &ListNode {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ListNode {
        &mut self.values
    }

    /// First value, the common single-valued case
    pub fn value(&self) -> Option<&ValueNode> {
        self.values.get(0)
    }

    /// Layout after the last value
    pub fn trailing_padding_mut(&mut self) -> &mut PaddingNode {
        self.values.tail_mut()
    }

    fn has_dangling_comment(&self) -> bool {
        match self.values.tail() {
            Some(tail) if !tail.is_empty() => tail.has_dangling_comment(),
            _ => self
                .values
                .last_node()
                .and_then(ValueNode::padding)
                .is_some_and(PaddingNode::has_dangling_comment),
        }
    }
}

impl SyntaxNode for ParameterNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = self.classifier.format(ctx);
        if let Some(separator) = &self.separator {
            out.push_str(&separator.text());
        }
        out.push_str(&self.values.format(ctx));
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = self.classifier.comments();
        if let Some(separator) = &self.separator {
            comments.extend(separator.comments());
        }
        comments.extend(self.values.comments());
        comments
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("Parameter '{key}' is given more than once")]
pub struct DuplicateParameter {
    pub key: String,
}

/// Insertion-ordered parameters with case- and particle-folded keys
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParametersNode {
    params: Vec<ParameterNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ParametersNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, closing any comment left open by the previous one
    pub fn insert(&mut self, param: ParameterNode) -> Result<(), DuplicateParameter> {
        let key = param.key();
        if self.index.contains_key(&key) {
            return Err(DuplicateParameter { key });
        }
        if let Some(last) = self.params.last_mut() {
            if last.has_dangling_comment() {
                last.trailing_padding_mut().close_dangling_comment();
            } else if last.values.tail().map_or(true, PaddingNode::is_empty)
                && last
                    .values
                    .last_node()
                    .and_then(ValueNode::padding)
                    .map_or(true, PaddingNode::is_empty)
            {
                last.trailing_padding_mut().append_text(" ");
            }
        }
        self.index.insert(key, self.params.len());
        self.params.push(param);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ParameterNode> {
        self.index
            .get(&classifier_key(key))
            .and_then(|&i| self.params.get(i))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ParameterNode> {
        let index = *self.index.get(&classifier_key(key))?;
        self.params.get_mut(index)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(&classifier_key(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<ParameterNode> {
        let index = self.index.remove(&classifier_key(key))?;
        let removed = self.params.remove(index);
        for position in self.index.values_mut() {
            if *position > index {
                *position -= 1;
            }
        }
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterNode> {
        self.params.iter()
    }

    pub fn keys(&self) -> Vec<String> {
        self.params.iter().map(ParameterNode::key).collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl SyntaxNode for ParametersNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        self.params.iter().map(|p| p.format(ctx)).collect()
    }

    fn comments(&self) -> Vec<&CommentNode> {
        self.params.iter().flat_map(|p| p.comments()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_tree::classifier::ParticleNode;
    use crate::syntax_tree::padding::PaddingPiece;
    use crate::syntax_tree::value::{Value, ValueKind};

    fn imp(particles: &str, value: &str, padding: Option<&str>) -> ParameterNode {
        let classifier = ClassifierNode::new(ValueNode::parse("imp", ValueKind::Text, None).unwrap())
            .with_particles(ParticleNode::parse(particles).unwrap());
        let mut separator = PaddingNode::new();
        separator.append_literal("=");
        let mut values = ListNode::new();
        values.push_value(
            ValueNode::parse(value, ValueKind::Float, padding.map(PaddingNode::from_text)).unwrap(),
        );
        values.detach_tail();
        ParameterNode::new(classifier, Some(separator), values)
    }

    #[test]
    fn test_round_trip_and_lookup() {
        let mut params = ParametersNode::new();
        params.insert(imp(":n", "1", Some(" "))).unwrap();
        params.insert(imp(":p", "0", None)).unwrap();

        assert_eq!(params.to_text(), "imp:n=1 imp:p=0");
        assert!(params.contains("IMP:N"));
        assert_eq!(
            params.get("imp:p").and_then(|p| p.value()).and_then(|v| v.as_f64()),
            Some(0.0)
        );
    }

    #[test]
    fn test_duplicate_key_folds_particles() {
        let mut params = ParametersNode::new();
        params.insert(imp(":n,p", "1", Some(" "))).unwrap();
        let err = params.insert(imp(":P,N", "2", None)).unwrap_err();
        assert_eq!(err.key, "imp:n,p");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_insert_closes_dangling_comment() {
        let mut params = ParametersNode::new();
        let mut padding = PaddingNode::from_text(" ");
        padding.append_comment(CommentNode::new("$ importance"));
        params.insert(imp(":n", "1", None)).unwrap();
        *params.get_mut("imp:n").unwrap().trailing_padding_mut() = padding;

        params.insert(imp(":p", "1", None)).unwrap();
        let last = params.get("imp:n").unwrap().values().tail().unwrap();
        assert_eq!(last.pieces().last(), Some(&PaddingPiece::Newline));
        assert_eq!(params.to_text(), "imp:n=1 $ importance\nimp:p=1");
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut params = ParametersNode::new();
        params.insert(imp(":n", "1", Some(" "))).unwrap();
        params.insert(imp(":p", "2", Some(" "))).unwrap();
        params.insert(imp(":e", "3", None)).unwrap();

        assert!(params.remove("IMP:P").is_some());
        assert_eq!(params.keys(), vec!["imp:n", "imp:e"]);
        assert!(params.get("imp:e").is_some());
        assert!(params.remove("imp:p").is_none());
    }

    #[test]
    fn test_with_values_default_layout() {
        let classifier = ClassifierNode::new(ValueNode::text("vol"));
        let param = ParameterNode::with_values(
            classifier,
            vec![ValueNode::new(Some(Value::Float(1.0)), ValueKind::Float), ValueNode::float(2.0)],
        );
        assert!(param.has_equals());
        assert_eq!(param.values().len(), 2);
    }
}
