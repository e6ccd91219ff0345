//! Number parsing and rendering helpers
//!
//! Rendering follows the conventions of general-purpose scientific output:
//! exponents carry an explicit sign and at least two digits, `general` picks
//! fixed or exponential notation by magnitude and drops trailing zeros.

use serde::{Deserialize, Serialize};

/// How the sign of a non-negative number is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignPolicy {
    /// Only negative numbers carry a sign
    NegativeOnly,
    /// Non-negative numbers carry `+`
    Always,
    /// Non-negative numbers carry a leading space
    Space,
}

impl SignPolicy {
    fn prefix(&self, negative: bool) -> &'static str {
        match (negative, self) {
            (true, _) => "-",
            (false, SignPolicy::NegativeOnly) => "",
            (false, SignPolicy::Always) => "+",
            (false, SignPolicy::Space) => " ",
        }
    }
}

/// Parse a number that may omit the exponent letter (`1.2+3` is `1.2e+3`)
pub fn fortran_float(text: &str) -> Option<f64> {
    let valid = !text.is_empty()
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !valid {
        return None;
    }

    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }

    let mut rewritten = String::with_capacity(text.len() + 1);
    let mut previous: Option<char> = None;
    for ch in text.chars() {
        if matches!(ch, '+' | '-') && previous.is_some_and(|p| p.is_ascii_digit()) {
            rewritten.push('E');
        }
        rewritten.push(ch);
        previous = Some(ch);
    }
    rewritten.parse::<f64>().ok()
}

/// Parse an integer literal, accepting a leading `+`
pub fn parse_int(text: &str) -> Option<i64> {
    text.parse::<i64>().ok()
}

/// Tolerance comparison: `|a - b| <= max(rel * max(|a|, |b|), abs)`
pub fn is_close(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let diff = (a - b).abs();
    diff <= (rel_tol * a.abs().max(b.abs())).max(abs_tol)
}

/// Pad with zeros between the sign and the digits up to `width`
fn zero_fill(sign: &str, digits: &str, width: usize) -> String {
    let used = sign.len() + digits.len();
    if used >= width {
        format!("{}{}", sign, digits)
    } else {
        format!("{}{}{}", sign, "0".repeat(width - used), digits)
    }
}

fn special(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("nan".to_string())
    } else if value.is_infinite() {
        Some(if value < 0.0 { "-inf" } else { "inf" }.to_string())
    } else {
        None
    }
}

/// Render an integer with zero fill and sign policy
pub fn format_int(value: i64, width: usize, sign: SignPolicy) -> String {
    zero_fill(
        sign.prefix(value < 0),
        &value.unsigned_abs().to_string(),
        width,
    )
}

/// Split `{:.pe}` output into mantissa and exponent
fn exponential_parts(magnitude: f64, precision: usize) -> (String, i32) {
    let raw = format!("{:.*e}", precision, magnitude);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

fn render_exponent(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{:02}", sign, exponent.unsigned_abs())
}

/// Scientific notation with `precision` fractional digits, e.g. `1.50000e+03`
pub fn format_exponential(value: f64, precision: usize, width: usize, sign: SignPolicy) -> String {
    if let Some(text) = special(value) {
        return text;
    }
    let negative = value.is_sign_negative() && value != 0.0;
    let (mantissa, exponent) = exponential_parts(value.abs(), precision);
    let digits = format!("{}e{}", mantissa, render_exponent(exponent));
    zero_fill(sign.prefix(negative), &digits, width)
}

/// Fixed notation with `precision` fractional digits
pub fn format_fixed(value: f64, precision: usize, width: usize, sign: SignPolicy) -> String {
    if let Some(text) = special(value) {
        return text;
    }
    let negative = value.is_sign_negative() && value != 0.0;
    let digits = format!("{:.*}", precision, value.abs());
    zero_fill(sign.prefix(negative), &digits, width)
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// General notation with `precision` significant digits
pub fn format_general(value: f64, precision: usize, width: usize, sign: SignPolicy) -> String {
    if let Some(text) = special(value) {
        return text;
    }
    let precision = precision.max(1);
    let negative = value.is_sign_negative() && value != 0.0;
    let magnitude = value.abs();

    let digits = if magnitude == 0.0 {
        "0".to_string()
    } else {
        let (mantissa, exponent) = exponential_parts(magnitude, precision - 1);
        if exponent >= -4 && (exponent as i64) < precision as i64 {
            let decimals = (precision as i64 - 1 - exponent as i64).max(0) as usize;
            let fixed = format!("{:.*}", decimals, magnitude);
            strip_fraction_zeros(&fixed).to_string()
        } else {
            format!(
                "{}e{}",
                strip_fraction_zeros(&mantissa),
                render_exponent(exponent)
            )
        }
    };

    zero_fill(sign.prefix(negative), &digits, width)
}
