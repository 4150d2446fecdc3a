//! Anything the parser can pull tokens from

use super::error::FatalError;
use crate::lexical::Tokenizer;
use crate::preprocess::Preprocessor;
use crate::tokens::{Token, TokenTag};
use std::collections::VecDeque;

pub trait TokenSource<K> {
    /// Next token; returns end-of-stream repeatedly once exhausted
    fn next_token(&mut self) -> Result<Token<K>, FatalError>;
}

impl<K: TokenTag> TokenSource<K> for Tokenizer<K> {
    fn next_token(&mut self) -> Result<Token<K>, FatalError> {
        Tokenizer::next_token(self).map_err(FatalError::from)
    }
}

impl<K: TokenTag> TokenSource<K> for Preprocessor<K> {
    fn next_token(&mut self) -> Result<Token<K>, FatalError> {
        Preprocessor::next_token(self).map_err(FatalError::from)
    }
}

/// Pre-lexed tokens; the last token is repeated once the buffer drains
#[derive(Debug, Clone)]
pub struct TokenBuffer<K> {
    tokens: VecDeque<Token<K>>,
    end: Token<K>,
}

impl<K: TokenTag> TokenBuffer<K> {
    pub fn new(tokens: impl IntoIterator<Item = Token<K>>, end: Token<K>) -> Self {
        Self {
            tokens: tokens.into_iter().filter(|t| !t.is_end()).collect(),
            end,
        }
    }
}

impl<K: TokenTag> TokenSource<K> for TokenBuffer<K> {
    fn next_token(&mut self) -> Result<Token<K>, FatalError> {
        Ok(self.tokens.pop_front().unwrap_or_else(|| self.end.clone()))
    }
}
