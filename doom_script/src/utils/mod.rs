//! Shared primitive types used by the tokenizer, preprocessor and parser.

pub mod span;

pub use span::{Position, SourceLocation};
