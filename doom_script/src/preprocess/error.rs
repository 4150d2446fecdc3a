//! Preprocessor failures; all are fatal to the parse that triggered them

use crate::config::compile_time::preprocessor::*;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::codes;
use crate::utils::SourceLocation;

/// Why an include resolver could not produce a stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IncludeError {
    #[error("Could not resolve path \"{path}\"")]
    NotFound { path: String },

    #[error(transparent)]
    Read(#[from] FileProcessorError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error("{location}: {message}")]
    MalformedDirective {
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: Not a valid directive: {name}")]
    UnknownDirective {
        name: String,
        location: SourceLocation,
    },

    #[error("{location}: Macro expansion of \"{name}\" exceeded depth {MAX_MACRO_DEPTH} (cyclic definition?)")]
    MacroDepthExceeded {
        name: String,
        location: SourceLocation,
    },

    #[error("{location}: {message}")]
    UnbalancedConditional {
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: {source}")]
    IncludeFailed {
        source: IncludeError,
        location: SourceLocation,
    },

    #[error("{location}: Include of \"{path}\" exceeded depth {MAX_INCLUDE_DEPTH}")]
    IncludeDepthExceeded {
        path: String,
        location: SourceLocation,
    },

    #[error("{location}: Too many macros defined (max {MAX_MACRO_COUNT})")]
    TooManyMacros { location: SourceLocation },

    #[error("{location}: Expansion of \"{name}\" exceeded the budget of {limit} macro tokens")]
    ExpansionLimitExceeded {
        name: String,
        limit: usize,
        location: SourceLocation,
    },
}

impl PreprocessError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PreprocessError::Lexer(inner) => inner.error_code(),
            PreprocessError::MalformedDirective { .. } => codes::preprocessor::MALFORMED_DIRECTIVE,
            PreprocessError::UnknownDirective { .. } => codes::preprocessor::UNKNOWN_DIRECTIVE,
            PreprocessError::MacroDepthExceeded { .. } => {
                codes::preprocessor::MACRO_DEPTH_EXCEEDED
            }
            PreprocessError::UnbalancedConditional { .. } => {
                codes::preprocessor::UNBALANCED_CONDITIONAL
            }
            PreprocessError::IncludeFailed { .. } => codes::preprocessor::INCLUDE_NOT_FOUND,
            PreprocessError::IncludeDepthExceeded { .. } => {
                codes::preprocessor::INCLUDE_DEPTH_EXCEEDED
            }
            PreprocessError::TooManyMacros { .. } => codes::preprocessor::TOO_MANY_MACROS,
            PreprocessError::ExpansionLimitExceeded { .. } => {
                codes::preprocessor::EXPANSION_LIMIT_EXCEEDED
            }
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            PreprocessError::Lexer(inner) => inner.location(),
            PreprocessError::MalformedDirective { location, .. }
            | PreprocessError::UnknownDirective { location, .. }
            | PreprocessError::MacroDepthExceeded { location, .. }
            | PreprocessError::UnbalancedConditional { location, .. }
            | PreprocessError::IncludeFailed { location, .. }
            | PreprocessError::IncludeDepthExceeded { location, .. }
            | PreprocessError::ExpansionLimitExceeded { location, .. }
            | PreprocessError::TooManyMacros { location } => Some(location),
        }
    }
}
