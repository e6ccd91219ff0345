//! Token kinds for fixed-column deck records
//!
//! Classification is contextual: the same text can be a particle in the
//! cell block and free text in the surface block, so the lexer decides the
//! kind and the token only records the outcome.

use crate::utils::numeric::fortran_float;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shorthand forms that stand in for a run of values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShortcutKind {
    /// `nJ`: n default placeholders
    Jump,
    /// `nR`: repeat the previous value n times
    Repeat,
    /// `xM`: previous value multiplied by x
    Multiply,
    /// `nI`: n linear steps between two bounds
    Interpolate,
    /// `nILOG`: n logarithmic steps between two bounds
    LogInterpolate,
}

impl ShortcutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortcutKind::Jump => "jump",
            ShortcutKind::Repeat => "repeat",
            ShortcutKind::Multiply => "multiply",
            ShortcutKind::Interpolate => "interpolate",
            ShortcutKind::LogInterpolate => "log-interpolate",
        }
    }

    /// Letters written after the count when a shortcut is synthesized
    pub fn default_letters(&self) -> &'static str {
        match self {
            ShortcutKind::Jump => "J",
            ShortcutKind::Repeat => "R",
            ShortcutKind::Multiply => "M",
            ShortcutKind::Interpolate => "I",
            ShortcutKind::LogInterpolate => "ILOG",
        }
    }

    pub fn is_interpolation(&self) -> bool {
        matches!(self, ShortcutKind::Interpolate | ShortcutKind::LogInterpolate)
    }
}

/// Classify shortcut text such as `3R`, `j`, `2ilog` or `1.5m`
pub fn classify_shortcut(text: &str) -> Option<ShortcutKind> {
    let lower = text.to_ascii_lowercase();
    let counted = |suffix: &str| {
        lower
            .strip_suffix(suffix)
            .is_some_and(|count| count.chars().all(|c| c.is_ascii_digit()))
    };

    if counted("j") {
        Some(ShortcutKind::Jump)
    } else if counted("r") {
        Some(ShortcutKind::Repeat)
    } else if counted("ilog") || counted("log") {
        Some(ShortcutKind::LogInterpolate)
    } else if counted("i") {
        Some(ShortcutKind::Interpolate)
    } else if lower
        .strip_suffix('m')
        .is_some_and(|factor| fortran_float(factor).is_some())
    {
        Some(ShortcutKind::Multiply)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // === PADDING ===
    /// Whitespace run, newlines included
    Space,
    /// `$` to end of line
    DollarComment,
    /// Full-line `c` comment
    Comment,
    /// `&` continuation marker
    Ampersand,

    // === NUMBERS ===
    Number,
    /// A number whose value is exactly zero
    Null,
    /// Digits followed by letters that are not a shortcut, e.g. `80c`
    NumberWord,
    Shortcut(ShortcutKind),
    /// Isotope identifier such as `1001.80c`
    Zaid,
    /// Thermal scattering law such as `lwtr.10t`
    ThermalLaw,

    // === WORDS ===
    Text,
    Keyword,
    Particle,
    /// Non-letter particle designators in the data block, e.g. `|` or `*`
    ParticleSpecial,
    SurfaceType,
    /// Bare file name in a READ record
    FilePath,

    // === PUNCTUATION ===
    Complement,
    LeftParen,
    RightParen,
    Colon,
    Equals,
    Asterisk,
    Plus,
    Comma,
}

impl TokenKind {
    /// Tokens that only carry layout
    pub fn is_padding(&self) -> bool {
        matches!(
            self,
            TokenKind::Space | TokenKind::DollarComment | TokenKind::Comment | TokenKind::Ampersand
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(self, TokenKind::Number | TokenKind::Null)
    }

    pub fn is_shortcut(&self) -> bool {
        matches!(self, TokenKind::Shortcut(_))
    }

    /// Tokens that may begin a classifier or parameter name
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Text | TokenKind::Keyword | TokenKind::Particle | TokenKind::SurfaceType
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Space => "whitespace",
            TokenKind::DollarComment => "inline comment",
            TokenKind::Comment => "comment",
            TokenKind::Ampersand => "'&'",
            TokenKind::Number => "number",
            TokenKind::Null => "zero",
            TokenKind::NumberWord => "number with suffix",
            TokenKind::Shortcut(_) => "shortcut",
            TokenKind::Zaid => "isotope identifier",
            TokenKind::ThermalLaw => "thermal law identifier",
            TokenKind::Text => "text",
            TokenKind::Keyword => "keyword",
            TokenKind::Particle => "particle",
            TokenKind::ParticleSpecial => "particle symbol",
            TokenKind::SurfaceType => "surface type",
            TokenKind::FilePath => "file name",
            TokenKind::Complement => "'#'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Colon => "':'",
            TokenKind::Equals => "'='",
            TokenKind::Asterisk => "'*'",
            TokenKind::Plus => "'+'",
            TokenKind::Comma => "','",
        }
    }
}

/// A classified lexeme with its exact source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Case-insensitive comparison against a word
    pub fn is_word(&self, word: &str) -> bool {
        self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_padding(&self) -> bool {
        self.kind.is_padding()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind.describe(), self.text.escape_debug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_shortcut() {
        assert_eq!(classify_shortcut("2J"), Some(ShortcutKind::Jump));
        assert_eq!(classify_shortcut("j"), Some(ShortcutKind::Jump));
        assert_eq!(classify_shortcut("4r"), Some(ShortcutKind::Repeat));
        assert_eq!(classify_shortcut("3I"), Some(ShortcutKind::Interpolate));
        assert_eq!(classify_shortcut("2ilog"), Some(ShortcutKind::LogInterpolate));
        assert_eq!(classify_shortcut("log"), Some(ShortcutKind::LogInterpolate));
        assert_eq!(classify_shortcut("1.5m"), Some(ShortcutKind::Multiply));
        assert_eq!(classify_shortcut("-2M"), Some(ShortcutKind::Multiply));
        assert_eq!(classify_shortcut("m"), None);
        assert_eq!(classify_shortcut("80c"), None);
        assert_eq!(classify_shortcut("imp"), None);
    }

    #[test]
    fn test_padding_kinds() {
        assert!(TokenKind::Space.is_padding());
        assert!(TokenKind::Ampersand.is_padding());
        assert!(!TokenKind::Colon.is_padding());
        assert!(TokenKind::Null.is_number());
    }
}
