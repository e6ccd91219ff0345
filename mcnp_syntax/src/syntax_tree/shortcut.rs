//! Shorthand runs (`nJ`, `nR`, `xM`, `nI`, `nILOG`)
//!
//! A shortcut owns the values it expands to. Unless it is chained onto a
//! preceding shortcut, its first member is the explicit value written before
//! the shorthand token (`3` in `3 4R`), so formatting can reproduce both.

use super::node::{FormatContext, SyntaxNode, Tolerance};
use super::padding::{CommentNode, PaddingNode};
use super::value::{Value, ValueKind, ValueNode};
use crate::config::compile_time::syntax::MAX_SHORTCUT_EXPANSION;
use crate::logging::codes;
use crate::tokens::ShortcutKind;
use serde::Serialize;

pub type ShortcutId = usize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShortcutError {
    #[error("{kind} shortcut cannot follow a jump")]
    FollowsJump { kind: &'static str },

    #[error("{kind} shortcut has no value before it")]
    MissingLead { kind: &'static str },

    #[error("Invalid shortcut '{token}'")]
    InvalidToken { token: String },

    #[error("Shortcut '{token}' expands to {count} values, more than the limit of {limit}")]
    CountTooLarge {
        token: String,
        count: i64,
        limit: usize,
    },

    #[error("Interpolation bounds must be numbers")]
    NonNumericBound,

    #[error("Log interpolation needs positive bounds, got {begin} and {end}")]
    NonPositiveLogBound { begin: f64, end: f64 },
}

impl ShortcutError {
    pub fn error_code(&self) -> crate::logging::Code {
        codes::syntax::MALFORMED_SHORTCUT
    }
}

/// Where a non-jump shortcut takes its starting value from
#[derive(Debug, Clone)]
pub enum Lead {
    /// The explicit value written before the token becomes the first member
    Owned(ValueNode),
    /// The last value of the preceding shortcut, which stays there
    Chained(Option<Value>),
}

impl Lead {
    fn value(&self) -> Option<Value> {
        match self {
            Lead::Owned(node) => node.print_value(),
            Lead::Chained(value) => value.clone(),
        }
    }
}

/// Split `4R` into `("4", "R")` and `1.5m` into `("1.5", "m")`
pub fn split_token(kind: ShortcutKind, token: &str) -> (&str, &str) {
    let split = match kind {
        ShortcutKind::Multiply => token.len().saturating_sub(1),
        _ => token
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(token.len(), |(i, _)| i),
    };
    token.split_at(split)
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortcutNode {
    id: ShortcutId,
    kind: ShortcutKind,
    members: Vec<ValueNode>,
    chained: bool,
    /// Count, or factor for a multiply, as written
    count: Option<ValueNode>,
    letters: String,
    /// Interpolation only: layout between the token and the closing bound
    mid_padding: Option<PaddingNode>,
    end_padding: Option<PaddingNode>,
    /// Interpolation step, in log10 space for `ILOG`
    spacing: Option<f64>,
    /// Starting value of a chained shortcut
    anchor: Option<f64>,
    synthesized: bool,
}

impl ShortcutNode {
    fn from_token(
        id: ShortcutId,
        kind: ShortcutKind,
        token: &str,
        end_padding: Option<PaddingNode>,
    ) -> Result<Self, ShortcutError> {
        let (count_text, letters) = split_token(kind, token);
        let count_kind = if kind == ShortcutKind::Multiply {
            ValueKind::Float
        } else {
            ValueKind::Int
        };
        let count = if count_text.is_empty() {
            None
        } else {
            let node = ValueNode::parse(count_text, count_kind, None).ok_or_else(|| {
                ShortcutError::InvalidToken {
                    token: token.to_string(),
                }
            })?;
            Some(node.never_padded())
        };

        Ok(Self {
            id,
            kind,
            members: Vec::new(),
            chained: false,
            count,
            letters: letters.to_string(),
            mid_padding: None,
            end_padding,
            spacing: None,
            anchor: None,
            synthesized: false,
        })
    }

    fn written(&self) -> String {
        format!(
            "{}{}",
            self.count.as_ref().and_then(|c| c.token()).unwrap_or(""),
            self.letters
        )
    }

    /// Count as written, bounded by the expansion limit
    fn count_value(&self) -> Result<usize, ShortcutError> {
        match self.count.as_ref().and_then(ValueNode::as_i64) {
            Some(n) if n < 0 => Err(ShortcutError::InvalidToken {
                token: self.written(),
            }),
            Some(n) if n as u64 > MAX_SHORTCUT_EXPANSION as u64 => {
                Err(ShortcutError::CountTooLarge {
                    token: self.written(),
                    count: n,
                    limit: MAX_SHORTCUT_EXPANSION,
                })
            }
            Some(n) => Ok(n as usize),
            None => Ok(1),
        }
    }

    fn attach_lead(&mut self, lead: Lead) -> Option<Value> {
        let value = lead.value();
        match lead {
            Lead::Owned(node) => self.members.push(node),
            Lead::Chained(value) => {
                self.chained = true;
                self.anchor = value.as_ref().and_then(Value::as_f64);
            }
        }
        value
    }

    /// `nJ`: n placeholders
    pub fn jump(
        id: ShortcutId,
        token: &str,
        end_padding: Option<PaddingNode>,
    ) -> Result<Self, ShortcutError> {
        let mut node = Self::from_token(id, ShortcutKind::Jump, token, end_padding)?;
        let count = node.count_value()?;
        node.members = (0..count).map(|_| ValueNode::jump()).collect();
        Ok(node)
    }

    /// `nR`: n copies of the lead
    pub fn repeat(
        id: ShortcutId,
        lead: Lead,
        token: &str,
        end_padding: Option<PaddingNode>,
    ) -> Result<Self, ShortcutError> {
        let mut node = Self::from_token(id, ShortcutKind::Repeat, token, end_padding)?;
        let count = node.count_value()?;
        let template = match &lead {
            Lead::Owned(value) => value.clone(),
            Lead::Chained(Some(value)) => ValueNode::new(Some(value.clone()), value.kind()),
            Lead::Chained(None) => return Err(ShortcutError::FollowsJump { kind: "repeat" }),
        };
        if node.attach_lead(lead).is_none() {
            return Err(ShortcutError::FollowsJump { kind: "repeat" });
        }
        let copy = template.with_padding(PaddingNode::space());
        node.members
            .extend(std::iter::repeat(copy).take(count));
        Ok(node)
    }

    /// `xM`: the lead multiplied by x
    pub fn multiply(
        id: ShortcutId,
        lead: Lead,
        token: &str,
        end_padding: Option<PaddingNode>,
    ) -> Result<Self, ShortcutError> {
        let mut node = Self::from_token(id, ShortcutKind::Multiply, token, end_padding)?;
        let factor = node
            .count
            .as_ref()
            .and_then(ValueNode::as_f64)
            .ok_or_else(|| ShortcutError::InvalidToken {
                token: token.to_string(),
            })?;
        let kind = match &lead {
            Lead::Owned(value) => value.kind(),
            Lead::Chained(_) => ValueKind::Float,
        };
        let base = node
            .attach_lead(lead)
            .ok_or(ShortcutError::FollowsJump { kind: "multiply" })?
            .as_f64()
            .ok_or(ShortcutError::NonNumericBound)?;
        node.members.push(
            ValueNode::new(Some(Value::Float(base * factor)), kind).with_padding(PaddingNode::space()),
        );
        Ok(node)
    }

    /// `nI` / `nILOG`: n evenly spaced values between the lead and `end`
    pub fn interpolate(
        id: ShortcutId,
        kind: ShortcutKind,
        lead: Lead,
        token: &str,
        mid_padding: Option<PaddingNode>,
        end: ValueNode,
    ) -> Result<Self, ShortcutError> {
        let mut node = Self::from_token(id, kind, token, None)?;
        let count = node.count_value()?;
        let member_kind = match &lead {
            Lead::Owned(value) => value.kind(),
            Lead::Chained(_) => ValueKind::Float,
        };
        let begin = node
            .attach_lead(lead)
            .ok_or(ShortcutError::FollowsJump {
                kind: "interpolate",
            })?
            .as_f64()
            .ok_or(ShortcutError::NonNumericBound)?;
        let finish = end.as_f64().ok_or(ShortcutError::NonNumericBound)?;

        let is_log = kind == ShortcutKind::LogInterpolate;
        let (low, high) = if is_log {
            if begin <= 0.0 || finish <= 0.0 {
                return Err(ShortcutError::NonPositiveLogBound {
                    begin,
                    end: finish,
                });
            }
            (begin.log10(), finish.log10())
        } else {
            (begin, finish)
        };
        let spacing = (high - low) / (count as f64 + 1.0);

        for step in 1..=count {
            let position = low + spacing * step as f64;
            let value = if is_log { 10f64.powf(position) } else { position };
            node.members.push(
                ValueNode::new(Some(Value::Float(value)), member_kind)
                    .with_padding(PaddingNode::space()),
            );
        }
        node.members.push(end);
        node.mid_padding = mid_padding;
        node.spacing = Some(spacing);
        Ok(node)
    }

    /// A jump created during reconciliation for unattached placeholders
    pub(crate) fn synthesized_jump(id: ShortcutId, members: Vec<ValueNode>) -> Self {
        Self {
            id,
            kind: ShortcutKind::Jump,
            members,
            chained: false,
            count: None,
            letters: ShortcutKind::Jump.default_letters().to_string(),
            mid_padding: None,
            end_padding: Some(PaddingNode::space()),
            spacing: None,
            anchor: None,
            synthesized: true,
        }
    }

    // === ACCESSORS ===

    pub fn id(&self) -> ShortcutId {
        self.id
    }

    pub fn kind(&self) -> ShortcutKind {
        self.kind
    }

    pub fn members(&self) -> &[ValueNode] {
        &self.members
    }

    pub fn is_chained(&self) -> bool {
        self.chained
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn letters(&self) -> &str {
        &self.letters
    }

    pub fn spacing(&self) -> Option<f64> {
        self.spacing
    }

    pub fn end_padding(&self) -> Option<&PaddingNode> {
        self.end_padding.as_ref()
    }

    pub fn set_end_padding(&mut self, padding: Option<PaddingNode>) {
        self.end_padding = padding;
    }

    /// Padding after the whole shortcut as written
    pub fn trailing_padding_mut(&mut self) -> Option<&mut PaddingNode> {
        if self.kind.is_interpolation() {
            self.members.last_mut().and_then(ValueNode::padding_mut)
        } else {
            self.end_padding.as_mut()
        }
    }

    pub fn take_trailing_padding(&mut self) -> Option<PaddingNode> {
        if self.kind.is_interpolation() {
            self.members.last_mut().and_then(ValueNode::take_padding)
        } else {
            self.end_padding.take()
        }
    }

    fn has_lead(&self) -> bool {
        !self.chained && self.kind != ShortcutKind::Jump
    }

    // === RECONCILIATION ===

    /// Whether `candidate` extends the run whose edge member is `edge`,
    /// stepping in `direction` (+1 forward, -1 backward)
    pub(crate) fn accepts(
        &self,
        edge: &ValueNode,
        candidate: &ValueNode,
        direction: f64,
        run_len: usize,
        tolerance: Tolerance,
    ) -> bool {
        match self.kind {
            ShortcutKind::Jump => candidate.is_jump(),
            ShortcutKind::Repeat => match (edge.print_value(), candidate.print_value()) {
                (Some(a), Some(b)) => a.close_to(&b, tolerance),
                _ => false,
            },
            ShortcutKind::Multiply => {
                if self.chained || run_len >= 2 {
                    return false;
                }
                let base = if direction > 0.0 { edge } else { candidate };
                matches!(base.as_f64(), Some(b) if b != 0.0) && candidate.as_f64().is_some()
            }
            ShortcutKind::Interpolate | ShortcutKind::LogInterpolate => {
                match (edge.as_f64(), candidate.as_f64()) {
                    (Some(edge), Some(value)) => self
                        .step_from(edge, direction)
                        .is_some_and(|expected| tolerance.close(expected, value)),
                    _ => false,
                }
            }
        }
    }

    fn step_from(&self, edge: f64, direction: f64) -> Option<f64> {
        let spacing = self.spacing?;
        if self.kind == ShortcutKind::LogInterpolate {
            if edge <= 0.0 {
                return None;
            }
            Some(10f64.powf(edge.log10() + direction * spacing))
        } else {
            Some(edge + direction * spacing)
        }
    }

    /// Whether the first member can continue from the previous list value
    pub(crate) fn continues_from(&self, anchor: &ValueNode, first: &ValueNode, tolerance: Tolerance) -> bool {
        match self.kind {
            ShortcutKind::Jump => false,
            ShortcutKind::Repeat => self.accepts(anchor, first, 1.0, 1, tolerance),
            ShortcutKind::Multiply => matches!(anchor.as_f64(), Some(b) if b != 0.0),
            ShortcutKind::Interpolate | ShortcutKind::LogInterpolate => {
                self.accepts(anchor, first, 1.0, 1, tolerance)
            }
        }
    }

    /// Smallest run that still needs this shortcut
    pub(crate) fn minimum_members(&self, chained: bool) -> usize {
        let lead = usize::from(!chained);
        match self.kind {
            ShortcutKind::Jump => 1,
            ShortcutKind::Repeat | ShortcutKind::Multiply => 1 + lead,
            ShortcutKind::Interpolate | ShortcutKind::LogInterpolate => 2 + lead,
        }
    }

    /// Copy of this shortcut holding a new run of members
    pub(crate) fn rebuilt(&self, members: Vec<ValueNode>, anchor: Option<&ValueNode>) -> Self {
        let mut node = self.clone();
        node.members = members;
        node.chained = anchor.is_some() && self.kind != ShortcutKind::Jump;
        node.anchor = anchor.and_then(ValueNode::as_f64);
        node
    }

    fn count_text(&self, count: usize, ctx: &mut FormatContext) -> String {
        match &self.count {
            Some(node) => {
                let mut node = node.clone();
                node.set_value(Some(Value::Int(count as i64)));
                node.format(ctx)
            }
            None if count == 1 => String::new(),
            None => count.to_string(),
        }
    }

    fn factor_text(&self, ctx: &mut FormatContext) -> String {
        let base = if self.chained {
            self.anchor
        } else {
            self.members.first().and_then(ValueNode::as_f64)
        };
        let product = self.members.last().and_then(ValueNode::as_f64);
        let factor = match (base, product) {
            (Some(base), Some(product)) if base != 0.0 => product / base,
            _ => 1.0,
        };
        match &self.count {
            Some(node) => {
                let mut node = node.clone();
                node.set_value(Some(Value::Float(factor)));
                node.format(ctx)
            }
            None => ValueNode::float(factor).format(ctx),
        }
    }
}

impl SyntaxNode for ShortcutNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let mut out = String::new();
        let lead = usize::from(self.has_lead());
        if lead == 1 {
            if let Some(first) = self.members.first() {
                out.push_str(&first.format(ctx));
            }
        }

        match self.kind {
            ShortcutKind::Jump => {
                if self.members.is_empty() {
                    return String::new();
                }
                out.push_str(&self.count_text(self.members.len(), ctx));
                out.push_str(&self.letters);
            }
            ShortcutKind::Repeat => {
                let count = self.members.len().saturating_sub(lead);
                out.push_str(&self.count_text(count, ctx));
                out.push_str(&self.letters);
            }
            ShortcutKind::Multiply => {
                out.push_str(&self.factor_text(ctx));
                out.push_str(&self.letters);
            }
            ShortcutKind::Interpolate | ShortcutKind::LogInterpolate => {
                let count = self.members.len().saturating_sub(lead + 1);
                out.push_str(&self.count_text(count, ctx));
                out.push_str(&self.letters);
                let mid = self
                    .mid_padding
                    .as_ref()
                    .map_or_else(|| " ".to_string(), PaddingNode::text);
                out.push_str(&mid);
                if let Some(end) = self.members.last() {
                    out.push_str(&end.format(ctx));
                }
                return out;
            }
        }

        if let Some(padding) = &self.end_padding {
            out.push_str(&padding.text());
        }
        out
    }

    fn comments(&self) -> Vec<&CommentNode> {
        let mut comments = Vec::new();
        if self.has_lead() {
            if let Some(first) = self.members.first() {
                comments.extend(first.comments());
            }
        }
        if let Some(padding) = &self.mid_padding {
            comments.extend(padding.comments());
        }
        if self.kind.is_interpolation() {
            if let Some(end) = self.members.last() {
                comments.extend(end.comments());
            }
        }
        if let Some(padding) = &self.end_padding {
            comments.extend(padding.comments());
        }
        comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn number(text: &str, padding: &str) -> ValueNode {
        ValueNode::parse(text, ValueKind::Float, Some(PaddingNode::from_text(padding))).unwrap()
    }

    fn values(node: &ShortcutNode) -> Vec<Option<f64>> {
        node.members().iter().map(ValueNode::as_f64).collect()
    }

    #[test]
    fn test_split_token() {
        assert_eq!(split_token(ShortcutKind::Repeat, "4R"), ("4", "R"));
        assert_eq!(split_token(ShortcutKind::LogInterpolate, "2ilog"), ("2", "ilog"));
        assert_eq!(split_token(ShortcutKind::Jump, "J"), ("", "J"));
        assert_eq!(split_token(ShortcutKind::Multiply, "1.5m"), ("1.5", "m"));
    }

    #[test]
    fn test_repeat_expansion_and_format() {
        let node = ShortcutNode::repeat(0, Lead::Owned(number("3", " ")), "4R", None).unwrap();
        assert_eq!(values(&node), vec![Some(3.0); 5]);
        assert_eq!(node.to_text(), "3 4R");
    }

    #[test]
    fn test_chained_repeat_formats_without_lead() {
        let node =
            ShortcutNode::repeat(1, Lead::Chained(Some(Value::Float(2.0))), "2r", None).unwrap();
        assert!(node.is_chained());
        assert_eq!(values(&node), vec![Some(2.0), Some(2.0)]);
        assert_eq!(node.to_text(), "2r");
    }

    #[test]
    fn test_repeat_after_jump_is_rejected() {
        let error = ShortcutNode::repeat(0, Lead::Chained(None), "2R", None).unwrap_err();
        assert_eq!(error, ShortcutError::FollowsJump { kind: "repeat" });
        assert_eq!(error.error_code().as_str(), "E053");
    }

    #[test]
    fn test_oversized_count_is_rejected() {
        let error = ShortcutNode::repeat(0, Lead::Owned(number("1", " ")), "99999999999R", None)
            .unwrap_err();
        assert_matches!(error, ShortcutError::CountTooLarge { count: 99999999999, .. });
        assert_eq!(error.error_code().as_str(), "E053");

        assert_matches!(
            ShortcutNode::jump(0, "99999999999J", None),
            Err(ShortcutError::CountTooLarge { .. })
        );
        let limit = format!("{}i", MAX_SHORTCUT_EXPANSION + 1);
        assert_matches!(
            ShortcutNode::interpolate(
                0,
                ShortcutKind::Interpolate,
                Lead::Owned(number("1", " ")),
                &limit,
                None,
                number("5", ""),
            ),
            Err(ShortcutError::CountTooLarge { .. })
        );
        assert!(ShortcutNode::jump(1, &format!("{}J", MAX_SHORTCUT_EXPANSION), None).is_ok());
    }

    #[test]
    fn test_jump_expansion() {
        let node = ShortcutNode::jump(0, "3j", Some(PaddingNode::space())).unwrap();
        assert_eq!(values(&node), vec![None, None, None]);
        assert_eq!(node.to_text(), "3j ");

        let single = ShortcutNode::jump(1, "J", None).unwrap();
        assert_eq!(single.members().len(), 1);
        assert_eq!(single.to_text(), "J");
    }

    #[test]
    fn test_multiply_expansion() {
        let node = ShortcutNode::multiply(0, Lead::Owned(number("2", " ")), "1.5m", None).unwrap();
        assert_eq!(values(&node), vec![Some(2.0), Some(3.0)]);
        assert_eq!(node.to_text(), "2 1.5m");
    }

    #[test]
    fn test_linear_interpolation() {
        let node = ShortcutNode::interpolate(
            0,
            ShortcutKind::Interpolate,
            Lead::Owned(number("1", " ")),
            "3I",
            Some(PaddingNode::space()),
            number("5", ""),
        )
        .unwrap();
        assert_eq!(
            values(&node),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
        );
        assert_eq!(node.spacing(), Some(1.0));
        assert_eq!(node.to_text(), "1 3I 5");
    }

    #[test]
    fn test_log_interpolation() {
        let node = ShortcutNode::interpolate(
            0,
            ShortcutKind::LogInterpolate,
            Lead::Owned(number("1", " ")),
            "2ilog",
            Some(PaddingNode::space()),
            number("1000", ""),
        )
        .unwrap();
        let tolerance = Tolerance::default();
        let expanded = values(&node);
        assert!(tolerance.close(expanded[1].unwrap_or(0.0), 10.0));
        assert!(tolerance.close(expanded[2].unwrap_or(0.0), 100.0));
        assert_eq!(node.to_text(), "1 2ilog 1000");

        let error = ShortcutNode::interpolate(
            1,
            ShortcutKind::LogInterpolate,
            Lead::Owned(number("0", " ")),
            "ilog",
            None,
            number("10", ""),
        )
        .unwrap_err();
        assert!(matches!(error, ShortcutError::NonPositiveLogBound { .. }));
    }
}
