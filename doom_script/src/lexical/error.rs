//! Fatal lexical errors, each carrying the stream:line:column they occurred at

use crate::config::compile_time::lexical::*;
use crate::config::compile_time::preprocessor::MAX_DIRECTIVE_LENGTH;
use crate::logging::codes;
use crate::utils::SourceLocation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("{location}: Unexpected character '{character}'")]
    UnexpectedCharacter {
        character: char,
        location: SourceLocation,
    },

    #[error("{location}: Unterminated string literal")]
    UnterminatedString { location: SourceLocation },

    #[error("{location}: Unterminated comment")]
    UnterminatedComment { location: SourceLocation },

    #[error("{location}: Invalid escape sequence '\\{sequence}'")]
    InvalidEscape {
        sequence: String,
        location: SourceLocation,
    },

    #[error("{location}: Malformed number '{text}'")]
    InvalidNumber {
        text: String,
        location: SourceLocation,
    },

    #[error("{location}: Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong {
        length: usize,
        location: SourceLocation,
    },

    #[error("{location}: String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge {
        size: usize,
        location: SourceLocation,
    },

    #[error("{location}: Directive too long: {length} characters (max {MAX_DIRECTIVE_LENGTH})")]
    DirectiveTooLong {
        length: usize,
        location: SourceLocation,
    },

    #[error("{location}: Too many tokens (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { location: SourceLocation },

    #[error("Failed to read stream '{stream}': {message}")]
    SourceRead { stream: String, message: String },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::UnexpectedCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::InvalidEscape { .. } => codes::lexical::INVALID_ESCAPE,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::DirectiveTooLong { .. } => codes::preprocessor::MALFORMED_DIRECTIVE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::SourceRead { .. } => codes::lexical::SOURCE_READ_FAILURE,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            LexerError::UnexpectedCharacter { location, .. }
            | LexerError::UnterminatedString { location }
            | LexerError::UnterminatedComment { location }
            | LexerError::InvalidEscape { location, .. }
            | LexerError::InvalidNumber { location, .. }
            | LexerError::IdentifierTooLong { location, .. }
            | LexerError::StringTooLarge { location, .. }
            | LexerError::DirectiveTooLong { location, .. }
            | LexerError::TooManyTokens { location } => Some(location),
            LexerError::SourceRead { .. } => None,
        }
    }
}
