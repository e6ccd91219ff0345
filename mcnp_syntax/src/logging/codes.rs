//! Consolidated error codes and classification system
//!
//! Single source of truth for all error, warning and success codes together
//! with their behavioral metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File and block reading error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INCLUDE_TOO_DEEP: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const UNSUPPORTED_LAYOUT: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const INVALID_NUMBER: Code = Code::new("E021");
    pub const TOKEN_TOO_LONG: Code = Code::new("E022");
    pub const TOO_MANY_TOKENS: Code = Code::new("E023");
}

/// Record parsing error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_END: Code = Code::new("E040");
    pub const EMPTY_RECORD: Code = Code::new("E041");
    pub const GRAMMAR_VIOLATION: Code = Code::new("E043");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const DUPLICATE_PARAMETER: Code = Code::new("E051");
    pub const UNSUPPORTED_FEATURE: Code = Code::new("E052");
    pub const MALFORMED_SHORTCUT: Code = Code::new("E053");
    pub const WRONG_RECORD_KIND: Code = Code::new("E054");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// Half-space geometry error codes
pub mod geometry {
    use super::Code;

    pub const TYPE_MISMATCH: Code = Code::new("E060");
    pub const ILLEGAL_STATE: Code = Code::new("E061");
    pub const UNKNOWN_NODE: Code = Code::new("E062");
}

/// Output formatting error codes
pub mod formatting {
    use super::Code;

    pub const UNSUPPORTED_VERSION: Code = Code::new("E070");
    pub const VALUE_NOT_FORMATTABLE: Code = Code::new("E071");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const LINE_EXPANSION: Code = Code::new("W010");
    pub const LINE_OVERRUN: Code = Code::new("W011");
    pub const EXTRA_BLOCKS: Code = Code::new("W012");
    pub const DOWNGRADED_ERROR: Code = Code::new("W013");
    pub const NON_ASCII_REPLACED: Code = Code::new("W014");
    pub const OPAQUE_RECORD: Code = Code::new("W015");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_READ_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const RECORD_PARSED: Code = Code::new("I040");
    pub const BLOCKS_READ: Code = Code::new("I050");
    pub const OUTPUT_WRITTEN: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn register(registry: &mut HashMap<&'static str, ErrorMetadata>, metadata: ErrorMetadata) {
    registry.insert(metadata.code, metadata);
}

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the input that triggered it",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check build profile and environment configuration",
            ),
        );

        // File processing errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Input or included file not found",
                "Check the file path; READ paths are relative to the root input",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "READ inclusion nested too deeply",
                "Check for files that include each other",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File exceeds maximum size limit",
                "Split the input with READ directives or raise the build limit",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Input file is empty",
                "Provide an input with at least a title line",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Permission denied accessing file",
                "Check file permissions and user access rights",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is not valid UTF-8 text",
                "Convert the input to ASCII or UTF-8",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "I/O error while reading input",
                "Retry the operation or check the storage device",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Input layout is recognised but not supported",
                "Rewrite the input in horizontal (column) format",
            ),
        );

        // Lexical errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Character cannot start any token",
                "Remove or quote the character",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Malformed numeric literal",
                "Check the mantissa and exponent of the number",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Token exceeds maximum length",
                "Shorten the word or number",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::High,
                false,
                true,
                "Record produced too many tokens",
                "Split the record or raise the build limit",
            ),
        );

        // Syntax errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E040",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Record ended before a complete phrase was read",
                "Complete the record or check continuation lines",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E041",
                "Syntax",
                Severity::Low,
                true,
                false,
                "Record contains no tokens",
                "Remove the empty record",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E043",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Record does not follow the grammar for its block",
                "Check the record against the input format for its block",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E050",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Token not expected here",
                "Check the highlighted token and the one before it",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E051",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Parameter specified more than once",
                "Remove the duplicate keyword",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E052",
                "Syntax",
                Severity::High,
                false,
                true,
                "Feature recognised but not supported",
                "Rewrite the record without the unsupported syntax",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E053",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Shorthand cannot be applied at this position",
                "Give the shorthand an explicit value to work from",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E054",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Record prefix does not match the expected record kind",
                "Move the record to the correct block",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E087",
                "Syntax",
                Severity::High,
                false,
                true,
                "Maximum parse depth exceeded",
                "Reduce geometry nesting",
            ),
        );

        // Geometry errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E060",
                "Geometry",
                Severity::Medium,
                true,
                false,
                "Half-space nodes of different kinds compared",
                "Compare trees with trees and units with units",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E061",
                "Geometry",
                Severity::High,
                false,
                true,
                "Half-space tree is in an illegal state",
                "Rebuild the tree from its geometry syntax",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E062",
                "Geometry",
                Severity::High,
                false,
                true,
                "Node index does not belong to this arena",
                "Use ids returned by the same arena",
            ),
        );

        // Formatting errors
        register(
            &mut registry,
            ErrorMetadata::new(
                "E070",
                "Formatting",
                Severity::High,
                false,
                true,
                "Format version is not supported",
                "Use one of the listed format versions",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "E071",
                "Formatting",
                Severity::Medium,
                true,
                false,
                "Value cannot be formatted in this position",
                "Check the value type",
            ),
        );

        // Warnings
        register(
            &mut registry,
            ErrorMetadata::new(
                "W010",
                "Formatting",
                Severity::Low,
                true,
                false,
                "Reformatted value is wider than its original column",
                "Review the affected line for alignment",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "W011",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Line exceeds the column limit and was truncated",
                "Wrap the line with a continuation",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "W012",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Content after the data block was ignored",
                "Remove the trailing content or the extra blank line",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "W013",
                "Syntax",
                Severity::Low,
                true,
                false,
                "Record error downgraded to a warning in check mode",
                "Fix the record before running without check mode",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "W014",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Non-ASCII character replaced with a space",
                "Remove the character from the input",
            ),
        );
        register(
            &mut registry,
            ErrorMetadata::new(
                "W015",
                "Syntax",
                Severity::Low,
                true,
                false,
                "Unmodeled data record kept verbatim",
                "No action needed",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_constant_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::UNSUPPORTED_LAYOUT,
            lexical::INVALID_NUMBER,
            syntax::UNEXPECTED_TOKEN,
            syntax::UNSUPPORTED_FEATURE,
            syntax::MALFORMED_SHORTCUT,
            geometry::TYPE_MISMATCH,
            formatting::UNSUPPORTED_VERSION,
            warnings::LINE_EXPANSION,
            warnings::OPAQUE_RECORD,
        ];
        for code in all {
            assert!(get_error_metadata(code.as_str()).is_some(), "{}", code);
        }
    }

    #[test]
    fn test_unsupported_feature_is_fatal() {
        assert!(requires_halt(syntax::UNSUPPORTED_FEATURE.as_str()));
        assert!(!is_recoverable(syntax::UNSUPPORTED_FEATURE.as_str()));
        assert!(is_recoverable(syntax::UNEXPECTED_TOKEN.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_severity("X999"), Severity::Medium);
    }
}
