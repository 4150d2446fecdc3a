//! Lexical analysis: a declarative [`Kernel`] plus the stateful [`Tokenizer`]
//! that walks one character stream against it.

pub mod error;
pub mod kernel;
pub mod tokenizer;

pub use error::LexerError;
pub use kernel::Kernel;
pub use tokenizer::Tokenizer;
