//! Record parse errors

use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax_tree::ShortcutError;
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found '{found}' at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of record: expected {expected}")]
    UnexpectedEnd { expected: String, span: Span },

    #[error("Record holds no data")]
    EmptyRecord,

    #[error("Grammar violation: {message} at {span}")]
    GrammarViolation { message: String, span: Span },

    #[error("Parameter '{key}' is given more than once at {span}")]
    DuplicateParameter { key: String, span: Span },

    #[error("Unsupported feature: {feature} at {span}")]
    UnsupportedFeature { feature: String, span: Span },

    #[error("Malformed shortcut: {source} at {span}")]
    MalformedShortcut { source: ShortcutError, span: Span },

    #[error("Record does not belong in the {block} block: {message} at {span}")]
    WrongRecordKind {
        block: String,
        message: String,
        span: Span,
    },

    #[error("Maximum nesting depth exceeded at {span}")]
    MaxRecursionDepth { span: Span },

    #[error(transparent)]
    Lexical(#[from] LexerError),
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end(expected: &str, span: Span) -> Self {
        Self::UnexpectedEnd {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn empty_record() -> Self {
        Self::EmptyRecord
    }

    pub fn grammar_violation(message: &str, span: Span) -> Self {
        Self::GrammarViolation {
            message: message.to_string(),
            span,
        }
    }

    pub fn duplicate_parameter(key: &str, span: Span) -> Self {
        Self::DuplicateParameter {
            key: key.to_string(),
            span,
        }
    }

    pub fn unsupported_feature(feature: &str, span: Span) -> Self {
        Self::UnsupportedFeature {
            feature: feature.to_string(),
            span,
        }
    }

    pub fn malformed_shortcut(source: ShortcutError, span: Span) -> Self {
        Self::MalformedShortcut { source, span }
    }

    pub fn wrong_record_kind(block: &str, message: &str, span: Span) -> Self {
        Self::WrongRecordKind {
            block: block.to_string(),
            message: message.to_string(),
            span,
        }
    }

    pub fn max_recursion_depth(span: Span) -> Self {
        Self::MaxRecursionDepth { span }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEnd { .. } => codes::syntax::UNEXPECTED_END,
            Self::EmptyRecord => codes::syntax::EMPTY_RECORD,
            Self::GrammarViolation { .. } => codes::syntax::GRAMMAR_VIOLATION,
            Self::DuplicateParameter { .. } => codes::syntax::DUPLICATE_PARAMETER,
            Self::UnsupportedFeature { .. } => codes::syntax::UNSUPPORTED_FEATURE,
            Self::MalformedShortcut { .. } => codes::syntax::MALFORMED_SHORTCUT,
            Self::WrongRecordKind { .. } => codes::syntax::WRONG_RECORD_KIND,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::Lexical(error) => error.error_code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEnd { span, .. }
            | Self::GrammarViolation { span, .. }
            | Self::DuplicateParameter { span, .. }
            | Self::UnsupportedFeature { span, .. }
            | Self::MalformedShortcut { span, .. }
            | Self::WrongRecordKind { span, .. }
            | Self::MaxRecursionDepth { span } => Some(*span),
            Self::EmptyRecord => None,
            Self::Lexical(error) => error.span(),
        }
    }

    /// Never downgraded to a warning, whatever the caller asks
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFeature { .. })
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn span() -> Span {
        Span::new(Position::new(2, 1, 3), Position::new(3, 1, 4))
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SyntaxError::unexpected_token("number", ":", span()).error_code().as_str(),
            "E050"
        );
        assert_eq!(
            SyntaxError::duplicate_parameter("imp:n", span()).error_code().as_str(),
            "E051"
        );
        assert_eq!(SyntaxError::empty_record().span(), None);
    }

    #[test]
    fn test_unsupported_feature_halts() {
        let error = SyntaxError::unsupported_feature("LIKE n BUT", span());
        assert!(error.is_unsupported());
        assert!(error.requires_halt());
        assert!(!error.is_recoverable());
        assert_eq!(error.severity(), "High");
    }

    #[test]
    fn test_lexical_errors_convert() {
        let error: SyntaxError = LexerError::TooManyTokens { count: 9 }.into();
        assert_eq!(error.error_code().as_str(), "E023");
    }
}
