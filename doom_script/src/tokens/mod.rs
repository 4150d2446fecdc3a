//! Token types shared by the tokenizer, preprocessor and parser framework
//!
//! A [`Token`] records its [`TokenKind`], literal text and [`SourceLocation`].
//! Kinds are generic over the grammar's tag type so one tokenizer serves any
//! kernel.
//!
//! [`SourceLocation`]: crate::utils::SourceLocation

pub mod token;

pub use token::{Token, TokenKind, TokenTag};
