//! Error-collecting recursive-descent parser framework
//!
//! A concrete language supplies a [`Grammar`]; [`parse`] drives it over any
//! [`TokenSource`] (a bare tokenizer or a preprocessor), collecting syntax
//! diagnostics and resynchronizing at top-level tokens.

pub mod error;
pub mod grammar;
pub mod parser;
pub mod source;

pub use error::{
    AggregateParseFailure, FatalError, ParseError, ParseFailure, SyntaxError, SyntaxResult,
};
pub use grammar::Grammar;
pub use parser::{parse, Number, ParserSession, ParserState};
pub use source::{TokenBuffer, TokenSource};
