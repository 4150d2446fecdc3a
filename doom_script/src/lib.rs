// Internal modules
pub mod config;
pub mod file_processor;
pub mod interval;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod patch;
pub mod preprocess;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use interval::{IntervalError, IntervalMap};
pub use lexical::{Kernel, LexerError, Tokenizer};
pub use preprocess::{IncludeResolver, PreprocessError, Preprocessor};
pub use syntax::{parse, AggregateParseFailure, Grammar, ParseFailure, ParserSession};
pub use tokens::{Token, TokenKind, TokenTag};
