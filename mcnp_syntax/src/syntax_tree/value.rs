//! Leaf values and the format-preserving value formatter
//!
//! A value keeps the token it was parsed from. Formatting reuses that token
//! verbatim until the value changes beyond tolerance; after that the layout
//! of the original token (width, zero fill, sign, precision, exponent style)
//! is reverse-engineered and applied to the new value.

use super::node::{FormatContext, SyntaxNode, Tolerance};
use super::padding::{CommentNode, PaddingNode};
use crate::config::compile_time::formatting::DEFAULT_FLOAT_PRECISION;
use crate::logging::codes;
use crate::utils::numeric::{
    format_exponential, format_fixed, format_general, format_int, fortran_float, parse_int,
    SignPolicy,
};
use crate::utils::Warning;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    fn negated(&self) -> Value {
        match self {
            Value::Int(v) => Value::Int(-v),
            Value::Float(v) => Value::Float(-v),
            Value::Text(text) => Value::Text(text.clone()),
        }
    }

    fn magnitude(&self) -> Value {
        match self {
            Value::Int(v) => Value::Int(v.abs()),
            Value::Float(v) => Value::Float(v.abs()),
            Value::Text(text) => Value::Text(text.clone()),
        }
    }

    fn is_negative(&self) -> bool {
        match self {
            Value::Int(v) => *v < 0,
            Value::Float(v) => *v < 0.0,
            Value::Text(_) => false,
        }
    }

    fn coerce(self, kind: ValueKind) -> Value {
        match (self, kind) {
            (Value::Int(v), ValueKind::Float) => Value::Float(v as f64),
            (Value::Float(v), ValueKind::Int) if v.fract() == 0.0 => Value::Int(v as i64),
            (Value::Int(v), ValueKind::Text) => Value::Text(v.to_string()),
            (Value::Float(v), ValueKind::Text) => Value::Text(v.to_string()),
            (value, _) => value,
        }
    }

    /// Numeric values compare within tolerance, text exactly
    pub fn close_to(&self, other: &Value, tolerance: Tolerance) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => tolerance.close(a, b),
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Int,
    Float,
    Text,
}

impl ValueKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }
}

/// Layout recovered from an original token
#[derive(Debug, Clone, PartialEq)]
struct FormatDescriptor {
    value_length: usize,
    zero_padding: usize,
    sign: SignPolicy,
    precision: usize,
    is_scientific: bool,
    divider: String,
    exponent_length: usize,
    exponent_zero_pad: usize,
    as_int: bool,
    reversed: bool,
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        Self {
            value_length: 0,
            zero_padding: 0,
            sign: SignPolicy::NegativeOnly,
            precision: DEFAULT_FLOAT_PRECISION,
            is_scientific: true,
            divider: "e".to_string(),
            exponent_length: 0,
            exponent_zero_pad: 0,
            as_int: false,
            reversed: false,
        }
    }
}

struct Scientific<'a> {
    significand: &'a str,
    divider: &'a str,
    exponent: &'a str,
}

/// `[+-]?(\d+\.*\d*)(([eE])[+-]?|[+-])(\d+)` anchored at the start
fn match_scientific(token: &str) -> Option<Scientific<'_>> {
    let bytes = token.as_bytes();
    let mut index = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let significand_start = index;

    let digits = bytes[index..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    index += digits;
    index += bytes[index..].iter().take_while(|b| **b == b'.').count();
    index += bytes[index..].iter().take_while(|b| b.is_ascii_digit()).count();
    let significand = &token[significand_start..index];

    let divider_start = index;
    let divider = match bytes.get(index) {
        Some(b'e' | b'E') => {
            index += 1;
            let divider = &token[divider_start..index];
            if matches!(bytes.get(index), Some(b'+' | b'-')) {
                index += 1;
            }
            divider
        }
        Some(b'+' | b'-') => {
            index += 1;
            ""
        }
        _ => return None,
    };

    let exponent_digits = bytes[index..].iter().take_while(|b| b.is_ascii_digit()).count();
    if exponent_digits == 0 {
        return None;
    }
    Some(Scientific {
        significand,
        divider,
        exponent: &token[index..index + exponent_digits],
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueNode {
    token: Option<String>,
    value: Option<Value>,
    og_value: Option<Value>,
    kind: ValueKind,
    padding: Option<PaddingNode>,
    negatable_identifier: bool,
    negatable_float: bool,
    is_negative: bool,
    never_pad: bool,
}

impl ValueNode {
    /// Parse a token as the given kind; `None` when the text does not convert
    pub fn parse(token: &str, kind: ValueKind, padding: Option<PaddingNode>) -> Option<Self> {
        let value = match kind {
            ValueKind::Int => Value::Int(parse_int(token)?),
            ValueKind::Float => Value::Float(fortran_float(token)?),
            ValueKind::Text => Value::Text(token.to_string()),
        };
        Some(Self {
            token: Some(token.to_string()),
            value: Some(value.clone()),
            og_value: Some(value),
            kind,
            padding,
            negatable_identifier: false,
            negatable_float: false,
            is_negative: false,
            never_pad: false,
        })
    }

    /// A value with no source token
    pub fn new(value: Option<Value>, kind: ValueKind) -> Self {
        Self {
            token: None,
            value: value.map(|v| v.coerce(kind)),
            og_value: None,
            kind,
            padding: None,
            negatable_identifier: false,
            negatable_float: false,
            is_negative: false,
            never_pad: false,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::new(Some(Value::Int(value)), ValueKind::Int)
    }

    pub fn float(value: f64) -> Self {
        Self::new(Some(Value::Float(value)), ValueKind::Float)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(Some(Value::Text(value.into())), ValueKind::Text)
    }

    /// Placeholder standing for a jumped (default) entry
    pub fn jump() -> Self {
        let mut node = Self::new(None, ValueKind::Float);
        node.never_pad = true;
        node
    }

    pub fn with_padding(mut self, padding: PaddingNode) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn never_padded(mut self) -> Self {
        self.never_pad = true;
        self
    }

    // === ACCESSORS ===

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Stored value; for negatable values this is the magnitude
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Value with the negation flag applied
    pub fn print_value(&self) -> Option<Value> {
        let value = self.value.as_ref()?;
        if self.is_negatable() && self.is_negative {
            Some(value.negated())
        } else {
            Some(value.clone())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.print_value().and_then(|v| v.as_f64())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.print_value().and_then(|v| v.as_i64())
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    pub fn is_jump(&self) -> bool {
        self.value.is_none()
    }

    pub fn set_value(&mut self, value: Option<Value>) {
        let value = value.map(|v| {
            let v = v.coerce(self.kind);
            if self.is_negatable() {
                v.magnitude()
            } else {
                v
            }
        });
        if self.value.is_none()
            && value.is_some()
            && !self.never_pad
            && self.padding.is_none()
        {
            self.padding = Some(PaddingNode::space());
        }
        self.value = value;
    }

    pub fn padding(&self) -> Option<&PaddingNode> {
        self.padding.as_ref()
    }

    pub fn padding_mut(&mut self) -> Option<&mut PaddingNode> {
        self.padding.as_mut()
    }

    /// Padding, created empty when absent
    pub fn padding_or_default(&mut self) -> &mut PaddingNode {
        self.padding.get_or_insert_with(PaddingNode::new)
    }

    pub fn set_padding(&mut self, padding: Option<PaddingNode>) {
        self.padding = padding;
    }

    pub fn take_padding(&mut self) -> Option<PaddingNode> {
        self.padding.take()
    }

    pub fn never_pad(&self) -> bool {
        self.never_pad
    }

    // === NEGATION ===

    /// The sign encodes a flag: store the magnitude, keep the sign apart
    pub fn make_negatable_identifier(&mut self) {
        self.negatable_identifier = true;
        self.split_sign();
    }

    pub fn make_negatable_float(&mut self) {
        self.negatable_float = true;
        self.split_sign();
    }

    fn split_sign(&mut self) {
        if let Some(value) = &self.value {
            self.is_negative = value.is_negative();
            self.value = Some(value.magnitude());
        }
    }

    pub fn is_negatable_identifier(&self) -> bool {
        self.negatable_identifier
    }

    pub fn is_negatable_float(&self) -> bool {
        self.negatable_float
    }

    fn is_negatable(&self) -> bool {
        self.negatable_identifier || self.negatable_float
    }

    pub fn is_negative(&self) -> bool {
        self.is_negative
    }

    pub fn set_is_negative(&mut self, negative: bool) {
        self.is_negative = negative;
    }

    // === FORMATTING ===

    pub fn has_changed(&self, tolerance: Tolerance) -> bool {
        match (self.print_value(), &self.og_value) {
            (None, None) => false,
            (None, Some(_)) | (Some(_), None) => true,
            (Some(current), Some(original)) => !current.close_to(original, tolerance),
        }
    }

    fn descriptor(&self) -> FormatDescriptor {
        let mut descriptor = FormatDescriptor::default();
        let Some(token) = self.token.as_deref() else {
            return descriptor;
        };
        descriptor.reversed = true;

        descriptor.value_length = token.len();
        if let Some(padding) = &self.padding {
            if padding.is_space(0) {
                descriptor.value_length += padding.piece_text(0).map_or(0, str::len);
            }
        }

        if !self.kind.is_numeric() {
            return descriptor;
        }

        let unpadded = token.trim_start_matches(['0', '+', '-']);
        let mut delta = token.len() - unpadded.len();
        if let Some(first) = token.chars().next() {
            if first == '+' || first == '-' {
                delta = delta.saturating_sub(1);
                descriptor.sign = if first == '+' {
                    SignPolicy::Always
                } else {
                    SignPolicy::Space
                };
            }
        }
        if delta > 0 {
            descriptor.zero_padding = token.len();
        }

        // an integer token may now hold a float, e.g. a parameter edited to 0.5
        if self.kind == ValueKind::Float || matches!(self.value, Some(Value::Float(_))) {
            let significand = match match_scientific(token) {
                Some(scientific) => {
                    descriptor.is_scientific = true;
                    descriptor.divider = scientific.divider.to_string();
                    if scientific.exponent.starts_with('0') {
                        descriptor.exponent_length = scientific.exponent.len();
                        descriptor.exponent_zero_pad = scientific.exponent.len();
                    }
                    scientific.significand
                }
                None => {
                    descriptor.is_scientific = false;
                    token
                }
            };
            let parts: Vec<&str> = significand.split('.').collect();
            if parts.len() == 2 {
                descriptor.precision = parts[1].len();
            } else {
                descriptor.precision = DEFAULT_FLOAT_PRECISION;
                descriptor.as_int = true;
            }
        }

        descriptor
    }

    fn render(&self, value: &Value, descriptor: &FormatDescriptor, tolerance: Tolerance) -> String {
        let number = match value {
            Value::Text(text) => return text.clone(),
            Value::Int(v) => {
                return format_int(*v, descriptor.zero_padding, descriptor.sign);
            }
            Value::Float(v) => *v,
        };

        if descriptor.as_int && tolerance.close(number.round(), number) {
            return format_int(number.round() as i64, descriptor.zero_padding, descriptor.sign);
        }
        if !descriptor.reversed {
            return format_general(
                number,
                descriptor.precision,
                descriptor.zero_padding,
                descriptor.sign,
            );
        }
        if descriptor.is_scientific {
            let text = format_exponential(
                number,
                descriptor.precision,
                descriptor.zero_padding,
                descriptor.sign,
            )
            .replace('e', &descriptor.divider);
            return restyle_exponent(&text, descriptor);
        }
        if descriptor.as_int {
            return format_general(number, 6, descriptor.zero_padding, descriptor.sign);
        }
        format_fixed(
            number,
            descriptor.precision,
            descriptor.zero_padding,
            descriptor.sign,
        )
    }
}

/// Re-pad the exponent digits the way the original token wrote them
fn restyle_exponent(text: &str, descriptor: &FormatDescriptor) -> String {
    let Some(sign_index) = text.rfind(['+', '-']) else {
        return text.to_string();
    };
    let (head, digits) = text.split_at(sign_index + 1);
    let exponent: u32 = digits.parse().unwrap_or(0);
    let padded = format!("{:0width$}", exponent, width = descriptor.exponent_zero_pad);
    format!(
        "{}{:<width$}",
        head,
        padded,
        width = descriptor.exponent_length
    )
}

impl SyntaxNode for ValueNode {
    fn format(&self, ctx: &mut FormatContext) -> String {
        let padding_text = || self.padding.as_ref().map(PaddingNode::text).unwrap_or_default();

        if !self.has_changed(ctx.tolerance) {
            return format!("{}{}", self.token.as_deref().unwrap_or(""), padding_text());
        }
        let Some(value) = self.print_value() else {
            return String::new();
        };

        let descriptor = self.descriptor();
        let rendered = self.render(&value, &descriptor, ctx.tolerance);

        let (pad, extra) = match &self.padding {
            Some(padding) if padding.is_space(0) => {
                let saved_by_layout =
                    padding.len() > 1 && (padding.is_space(1) || padding.is_newline(1));
                let pad = if rendered.len() >= descriptor.value_length && !saved_by_layout {
                    " "
                } else {
                    ""
                };
                let extra: String = (1..padding.len())
                    .filter_map(|i| padding.piece_text(i))
                    .collect();
                (pad, extra)
            }
            Some(padding) => ("", padding.text()),
            None => ("", String::new()),
        };

        let buffer = format!(
            "{:<width$}{}",
            rendered,
            pad,
            width = descriptor.value_length
        );
        if buffer.len() > descriptor.value_length {
            if let Some(token) = &self.token {
                ctx.warn(Warning::new(
                    codes::warnings::LINE_EXPANSION,
                    format!(
                        "The value has expanded, and may change formatting. The original value was {}, new value is {}.",
                        token, rendered
                    ),
                ));
            }
        }
        buffer + &extra
    }

    fn comments(&self) -> Vec<&CommentNode> {
        self.padding
            .as_ref()
            .map(|padding| padding.comments())
            .unwrap_or_default()
    }
}

impl PartialEq for ValueNode {
    fn eq(&self, other: &Self) -> bool {
        match (self.print_value(), other.print_value()) {
            (Some(a), Some(b)) => a.close_to(&b, Tolerance::default()),
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(token: &str, kind: ValueKind, padding: &str) -> ValueNode {
        let padding = (!padding.is_empty()).then(|| PaddingNode::from_text(padding));
        ValueNode::parse(token, kind, padding).unwrap()
    }

    fn format(node: &ValueNode) -> (String, usize) {
        let mut ctx = FormatContext::default();
        let text = node.format(&mut ctx);
        (text, ctx.warnings().len())
    }

    #[test]
    fn test_unchanged_value_is_verbatim() {
        let node = parsed("1.000e-3", ValueKind::Float, "   ");
        assert_eq!(format(&node).0, "1.000e-3   ");

        let node = parsed("+007", ValueKind::Int, " ");
        assert_eq!(format(&node).0, "+007 ");
    }

    #[test]
    fn test_change_within_tolerance_keeps_token() {
        let mut node = parsed("1.50", ValueKind::Float, " ");
        node.set_value(Some(Value::Float(1.5 + 1e-12)));
        assert!(!node.has_changed(Tolerance::default()));
        assert_eq!(format(&node).0, "1.50 ");

        node.set_value(Some(Value::Float(1.51)));
        assert!(node.has_changed(Tolerance::default()));
        assert_eq!(format(&node).0, "1.51 ");
    }

    #[test]
    fn test_zero_padding_is_kept() {
        let mut node = parsed("007", ValueKind::Int, "");
        node.set_value(Some(Value::Int(8)));
        assert_eq!(format(&node).0, "008");
    }

    #[test]
    fn test_scientific_layout_is_reverse_engineered() {
        let mut node = parsed("1.5e3", ValueKind::Float, "");
        node.set_value(Some(Value::Float(2500.0)));
        let (text, warnings) = format(&node);
        assert_eq!(text, "2.5e+3");
        assert_eq!(warnings, 1);

        let mut node = parsed("1.5+3", ValueKind::Float, "");
        node.set_value(Some(Value::Float(2500.0)));
        assert_eq!(format(&node).0, "2.5+3");

        let mut node = parsed("1.25E-03", ValueKind::Float, "");
        node.set_value(Some(Value::Float(0.0025)));
        assert_eq!(format(&node).0, "2.50E-03");
    }

    #[test]
    fn test_fixed_and_integral_floats() {
        let mut node = parsed("2.50", ValueKind::Float, " ");
        node.set_value(Some(Value::Float(3.25)));
        assert_eq!(format(&node).0, "3.25 ");

        let mut node = parsed("5", ValueKind::Float, " ");
        node.set_value(Some(Value::Float(6.0)));
        assert_eq!(format(&node).0, "6 ");
        node.set_value(Some(Value::Float(6.5)));
        assert_eq!(format(&node).0, "6.5 ");
    }

    #[test]
    fn test_integer_token_takes_float_value() {
        let mut node = parsed("1", ValueKind::Int, " ");
        node.set_value(Some(Value::Float(1.5)));
        assert_eq!(format(&node).0, "1.5 ");

        let mut node = parsed("1", ValueKind::Float, "");
        node.set_value(Some(Value::Float(0.25)));
        assert_eq!(format(&node).0, "0.25");
    }

    #[test]
    fn test_shorter_value_keeps_column_width() {
        let mut node = parsed("10", ValueKind::Int, " ");
        node.set_value(Some(Value::Int(5)));
        let (text, warnings) = format(&node);
        assert_eq!(text, "5  ");
        assert_eq!(warnings, 0);

        node.set_value(Some(Value::Int(125)));
        let (text, warnings) = format(&node);
        assert_eq!(text, "125 ");
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_newline_after_value_saves_separator() {
        let mut node = parsed("10", ValueKind::Int, " \n     ");
        node.set_value(Some(Value::Int(125)));
        assert_eq!(format(&node).0, "125\n     ");
    }

    #[test]
    fn test_negatable_identifier() {
        let mut node = parsed("-2", ValueKind::Int, "");
        node.make_negatable_identifier();
        assert_eq!(node.value(), Some(&Value::Int(2)));
        assert!(node.is_negative());
        assert_eq!(format(&node).0, "-2");

        node.set_value(Some(Value::Int(-7)));
        assert_eq!(node.value(), Some(&Value::Int(7)));
        assert_eq!(format(&node).0, "-7");

        node.set_is_negative(false);
        assert_eq!(format(&node).0, " 7");
    }

    #[test]
    fn test_synthesized_values() {
        assert_eq!(format(&ValueNode::float(0.5)).0, "0.5");
        assert_eq!(format(&ValueNode::float(123456.0)).0, "1.2346e+05");
        assert_eq!(format(&ValueNode::int(-3)).0, "-3");
        assert_eq!(format(&ValueNode::text("lwtr.10t")).0, "lwtr.10t");
        assert_eq!(format(&ValueNode::jump()).0, "");
    }

    #[test]
    fn test_filling_a_jump_adds_separator() {
        let mut node = ValueNode::new(None, ValueKind::Float);
        node.set_value(Some(Value::Float(2.0)));
        assert_eq!(format(&node).0, "2 ");
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert!(ValueNode::parse("1.2.3", ValueKind::Float, None).is_none());
        assert!(ValueNode::parse("1.5", ValueKind::Int, None).is_none());
    }

    #[test]
    fn test_equality_uses_tolerance() {
        let a = parsed("1.0", ValueKind::Float, "");
        let b = ValueNode::float(1.0 + 1e-13);
        assert_eq!(a, b);
        assert_ne!(a, ValueNode::float(1.1));
    }
}
