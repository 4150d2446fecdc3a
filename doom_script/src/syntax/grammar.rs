//! The contract a concrete grammar implements to be driven by [`parse`](super::parse)

use super::error::SyntaxResult;
use super::parser::ParserSession;
use super::source::TokenSource;
use crate::tokens::{Token, TokenTag};

pub trait Grammar<K: TokenTag> {
    type Output;

    /// Tokens that may begin a top-level production; recovery stops at these
    fn is_top_level(&self, token: &Token<K>) -> bool;

    /// Token introducing the optional header clause
    fn is_header(&self, _token: &Token<K>) -> bool {
        false
    }

    /// Parse the header clause. Only called when it is the first production.
    fn parse_header<S: TokenSource<K>>(
        &mut self,
        _session: &mut ParserSession<K, S>,
    ) -> SyntaxResult<()> {
        Ok(())
    }

    /// Parse one top-level entry starting at the current token
    fn parse_entry<S: TokenSource<K>>(
        &mut self,
        session: &mut ParserSession<K, S>,
    ) -> SyntaxResult<()>;

    fn finish(self) -> Self::Output;
}
