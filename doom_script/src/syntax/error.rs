//! Parse errors: recoverable syntax diagnostics, fatal stream errors, and the
//! aggregate failure a parse ends with when any diagnostic was recorded.

use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::preprocess::PreprocessError;
use crate::tokens::{Token, TokenTag};
use crate::utils::SourceLocation;
use std::fmt;

pub type SyntaxResult<T> = Result<T, ParseError>;

/// A recoverable grammar violation. `Display` is the bare message; the
/// location is prepended by [`SyntaxError::diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Expected {expected}, found end of input")]
    UnexpectedEnd {
        expected: String,
        location: SourceLocation,
    },

    #[error("{message}")]
    InvalidValue {
        message: String,
        location: SourceLocation,
    },

    #[error("Header clause must appear before any entry")]
    HeaderNotFirst { location: SourceLocation },

    #[error("{message}")]
    GrammarViolation {
        message: String,
        location: SourceLocation,
    },
}

impl SyntaxError {
    /// Expected `expected` at `found`
    pub fn unexpected<K: TokenTag>(expected: &str, found: &Token<K>) -> Self {
        if found.is_end() {
            return Self::UnexpectedEnd {
                expected: expected.to_string(),
                location: found.location.clone(),
            };
        }
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.describe(),
            location: found.location.clone(),
        }
    }

    pub fn invalid_value(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::InvalidValue {
            message: message.into(),
            location,
        }
    }

    pub fn grammar_violation(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::GrammarViolation {
            message: message.into(),
            location,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEnd { .. } => codes::syntax::UNEXPECTED_END,
            Self::InvalidValue { .. } => codes::syntax::INVALID_VALUE,
            Self::HeaderNotFirst { .. } => codes::syntax::HEADER_NOT_FIRST,
            Self::GrammarViolation { .. } => codes::syntax::UNEXPECTED_TOKEN,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::UnexpectedToken { location, .. }
            | Self::UnexpectedEnd { location, .. }
            | Self::InvalidValue { location, .. }
            | Self::HeaderNotFirst { location }
            | Self::GrammarViolation { location, .. } => location,
        }
    }

    /// `stream:line:column: message`
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.location(), self)
    }
}

/// Errors that end a parse immediately
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    #[error(transparent)]
    Lexical(LexerError),

    #[error(transparent)]
    Preprocess(PreprocessError),
}

impl FatalError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexical(inner) => inner.error_code(),
            Self::Preprocess(inner) => inner.error_code(),
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Lexical(inner) => inner.location(),
            Self::Preprocess(inner) => inner.location(),
        }
    }
}

impl From<LexerError> for FatalError {
    fn from(error: LexerError) -> Self {
        Self::Lexical(error)
    }
}

impl From<PreprocessError> for FatalError {
    fn from(error: PreprocessError) -> Self {
        match error {
            PreprocessError::Lexer(inner) => Self::Lexical(inner),
            other => Self::Preprocess(other),
        }
    }
}

/// What a grammar production can fail with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl From<LexerError> for ParseError {
    fn from(error: LexerError) -> Self {
        Self::Fatal(error.into())
    }
}

impl From<PreprocessError> for ParseError {
    fn from(error: PreprocessError) -> Self {
        Self::Fatal(error.into())
    }
}

/// Every syntax diagnostic of a failed parse, in encounter order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateParseFailure {
    errors: Vec<SyntaxError>,
    truncated: bool,
}

impl AggregateParseFailure {
    pub fn new(errors: Vec<SyntaxError>, truncated: bool) -> Self {
        Self { errors, truncated }
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Parsing stopped at the error limit; later problems were not reported
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn lines(&self) -> Vec<String> {
        self.errors.iter().map(SyntaxError::diagnostic).collect()
    }
}

impl fmt::Display for AggregateParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

impl std::error::Error for AggregateParseFailure {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Fatal(#[from] FatalError),

    #[error(transparent)]
    Aggregate(#[from] AggregateParseFailure),
}

impl ParseFailure {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Fatal(inner) => inner.error_code(),
            Self::Aggregate(_) => codes::syntax::AGGREGATE_FAILURE,
        }
    }

    /// One line per diagnostic, each prefixed with its location
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Fatal(inner) => vec![inner.to_string()],
            Self::Aggregate(aggregate) => aggregate.lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use crate::utils::Position;
    use std::sync::Arc;

    fn at(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new(Arc::from("patch.dh"), Position::new(line, column))
    }

    #[test]
    fn test_unexpected_token_message() {
        let token: Token<()> = Token::new(TokenKind::Identifier, "bogus", at(3, 7));
        let error = SyntaxError::unexpected("'{'", &token);
        assert_eq!(error.diagnostic(), "patch.dh:3:7: Expected '{', found \"bogus\"");
        assert_eq!(error.error_code(), codes::syntax::UNEXPECTED_TOKEN);
    }

    #[test]
    fn test_unexpected_end_message() {
        let token: Token<()> = Token::end_of_stream(at(9, 1));
        let error = SyntaxError::unexpected("'}'", &token);
        assert_eq!(error.to_string(), "Expected '}', found end of input");
        assert_eq!(error.error_code(), codes::syntax::UNEXPECTED_END);
    }

    #[test]
    fn test_aggregate_lines_in_order() {
        let failure = AggregateParseFailure::new(
            vec![
                SyntaxError::invalid_value("Bad speed", at(2, 5)),
                SyntaxError::grammar_violation("Unknown field", at(5, 3)),
            ],
            false,
        );
        assert_eq!(
            failure.to_string(),
            "patch.dh:2:5: Bad speed\npatch.dh:5:3: Unknown field"
        );
        assert_eq!(failure.len(), 2);
        assert!(!failure.is_truncated());
    }

    #[test]
    fn test_preprocessor_lexer_errors_normalize() {
        let lexical = LexerError::UnterminatedString { location: at(1, 1) };
        let fatal: FatalError = PreprocessError::Lexer(lexical.clone()).into();
        assert_eq!(fatal, FatalError::Lexical(lexical));
        assert_eq!(fatal.error_code(), codes::lexical::UNTERMINATED_STRING);
    }

    #[test]
    fn test_failure_codes() {
        let aggregate = ParseFailure::Aggregate(AggregateParseFailure::new(vec![], false));
        assert_eq!(aggregate.error_code(), codes::syntax::AGGREGATE_FAILURE);
        let fatal = ParseFailure::Fatal(FatalError::Lexical(LexerError::TooManyTokens {
            location: at(4, 2),
        }));
        assert_eq!(fatal.lines().len(), 1);
        assert!(fatal.lines()[0].starts_with("patch.dh:4:2: "));
    }
}
