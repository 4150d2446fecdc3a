//! Error and success codes with their classification metadata
//!
//! Single source of truth for codes attached to log events and error enums.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code wrapper shared by error and success events
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

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

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

/// Complete metadata for an error code
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

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const INVALID_ESCAPE: Code = Code::new("E028");
    pub const SOURCE_READ_FAILURE: Code = Code::new("E029");
}

pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_END: Code = Code::new("E040");
    pub const INVALID_VALUE: Code = Code::new("E045");
    pub const HEADER_NOT_FIRST: Code = Code::new("E046");
    pub const ERROR_LIMIT_REACHED: Code = Code::new("E047");
    pub const AGGREGATE_FAILURE: Code = Code::new("E048");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
}

pub mod preprocessor {
    use super::Code;

    pub const MALFORMED_DIRECTIVE: Code = Code::new("E060");
    pub const UNKNOWN_DIRECTIVE: Code = Code::new("E061");
    pub const MACRO_DEPTH_EXCEEDED: Code = Code::new("E062");
    pub const UNBALANCED_CONDITIONAL: Code = Code::new("E063");
    pub const INCLUDE_NOT_FOUND: Code = Code::new("E064");
    pub const INCLUDE_DEPTH_EXCEEDED: Code = Code::new("E065");
    pub const TOO_MANY_MACROS: Code = Code::new("E066");
    pub const EXPANSION_LIMIT_EXCEEDED: Code = Code::new("E067");
}

pub mod interval {
    use super::Code;

    pub const INVALID_RANGE: Code = Code::new("E150");
}

pub mod patch {
    use super::Code;

    pub const INDEX_OUT_OF_RANGE: Code = Code::new("E160");
    pub const NO_FREE_SLOT: Code = Code::new("E161");
    pub const UNKNOWN_FIELD: Code = Code::new("E162");
    pub const FIELD_TYPE_MISMATCH: Code = Code::new("E163");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PREPROCESSING_COMPLETE: Code = Code::new("I030");
    pub const INCLUDE_RESOLVED: Code = Code::new("I031");
    pub const PARSE_COMPLETE: Code = Code::new("I040");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

type RegistryRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, recoverable, requires_halt, description, action)
const REGISTRY_ROWS: &[RegistryRow] = &[
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal error", "File a bug report with the failing script"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Subsystem initialization failed", "Check configuration and environment variables"),
    ("E005", "FileProcessing", Severity::High, false, true,
        "Script file not found", "Verify the path exists"),
    ("E007", "FileProcessing", Severity::High, false, true,
        "Script file exceeds the configured size limit", "Split the script into included parts"),
    ("E009", "FileProcessing", Severity::High, false, true,
        "Permission denied reading script", "Check file permissions"),
    ("E010", "FileProcessing", Severity::High, false, true,
        "Script is not valid UTF-8", "Re-save the script as UTF-8"),
    ("E011", "FileProcessing", Severity::High, false, true,
        "I/O error reading script", "Retry or check the underlying device"),
    ("E012", "FileProcessing", Severity::High, false, true,
        "Invalid script path", "Pass a path to a regular file"),
    ("E020", "Lexical", Severity::High, false, true,
        "Character not recognized by the tokenizer kernel", "Remove or quote the character"),
    ("E021", "Lexical", Severity::High, false, true,
        "String literal is not terminated", "Close the string on the same line"),
    ("E022", "Lexical", Severity::High, false, true,
        "Malformed numeric literal", "Check digits and separators"),
    ("E023", "Lexical", Severity::High, false, true,
        "Identifier exceeds the length limit", "Use a shorter name"),
    ("E024", "Lexical", Severity::High, false, true,
        "String literal exceeds the size limit", "Split the string"),
    ("E026", "Lexical", Severity::High, false, true,
        "Block comment is not terminated", "Add the closing comment marker"),
    ("E027", "Lexical", Severity::Critical, false, true,
        "Token count limit exceeded", "Reduce script size"),
    ("E028", "Lexical", Severity::High, false, true,
        "Malformed escape sequence in string", "Use a supported escape or a raw string"),
    ("E029", "Lexical", Severity::High, false, true,
        "Character source could not be read", "Check the source stream"),
    ("E040", "Syntax", Severity::Medium, true, false,
        "Unexpected end of input", "Complete the unfinished entry"),
    ("E045", "Syntax", Severity::Medium, true, false,
        "Value is not valid here", "Check the value against the field type"),
    ("E046", "Syntax", Severity::Medium, true, false,
        "Header clause must be the first statement", "Move the header to the top of the script"),
    ("E047", "Syntax", Severity::High, false, true,
        "Too many syntax errors", "Fix the reported errors and retry"),
    ("E048", "Syntax", Severity::High, false, false,
        "One or more syntax errors were recorded", "Fix every reported line"),
    ("E050", "Syntax", Severity::Medium, true, false,
        "Unexpected token", "Check the statement against the grammar"),
    ("E060", "Preprocessor", Severity::High, false, true,
        "Malformed preprocessor directive", "Check the directive arguments"),
    ("E061", "Preprocessor", Severity::High, false, true,
        "Unknown preprocessor directive", "Use define, undefine, include, ifdef, ifndef, else or endif"),
    ("E062", "Preprocessor", Severity::High, false, true,
        "Macro expansion too deep (cyclic macro?)", "Remove self-referencing macro definitions"),
    ("E063", "Preprocessor", Severity::High, false, true,
        "Unbalanced conditional directive", "Match every ifdef/ifndef with an endif"),
    ("E064", "Preprocessor", Severity::High, false, true,
        "Included source could not be resolved", "Check the include path"),
    ("E065", "Preprocessor", Severity::High, false, true,
        "Include nesting too deep (recursive include?)", "Remove recursive includes"),
    ("E066", "Preprocessor", Severity::High, false, true,
        "Too many macros defined", "Reduce macro definitions"),
    ("E067", "Preprocessor", Severity::Critical, false, true,
        "Macro expansion produced too many tokens", "Avoid macros that multiply their bodies"),
    ("E150", "Interval", Severity::Medium, false, false,
        "Interval start is after its end", "Pass start <= end"),
    ("E160", "Patch", Severity::Medium, true, false,
        "Entry index outside the format's range", "Use an index the selected format supports"),
    ("E161", "Patch", Severity::Medium, true, false,
        "No free slot for a new symbolic entry", "Use the extended format or a numeric index"),
    ("E162", "Patch", Severity::Medium, true, false,
        "Field is not defined for this entry kind", "Check the field name"),
    ("E163", "Patch", Severity::Medium, true, false,
        "Field value has the wrong type", "Check the field type"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

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
    fn test_registry_has_unique_codes() {
        assert_eq!(get_error_registry().len(), REGISTRY_ROWS.len());
    }

    #[test]
    fn test_fatal_and_recoverable_classes() {
        assert!(requires_halt(lexical::UNTERMINATED_COMMENT.as_str()));
        assert!(requires_halt(preprocessor::MACRO_DEPTH_EXCEEDED.as_str()));
        assert!(is_recoverable(syntax::UNEXPECTED_TOKEN.as_str()));
        assert!(!requires_halt(syntax::UNEXPECTED_TOKEN.as_str()));
    }

    #[test]
    fn test_metadata_lookup() {
        assert_eq!(get_category("E064"), "Preprocessor");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert_eq!(get_description("nope"), "Unknown error");
        assert!(get_error_metadata(interval::INVALID_RANGE.as_str()).is_some());
    }
}
