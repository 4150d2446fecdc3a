//! Tokens produced by the tokenizer and consumed by the preprocessor and parser
//!
//! Token kinds are generic over the grammar's own tag type `K`, which the
//! kernel maps delimiters and keywords to.
use crate::utils::{Position, SourceLocation};
use std::fmt;
use std::hash::Hash;

/// Bound for grammar-defined symbol and keyword tags
pub trait TokenTag: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> TokenTag for T where T: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind<K> {
    /// A kernel delimiter
    Symbol(K),
    /// An identifier run that matched the keyword table
    Keyword(K),
    Identifier,
    /// Digits with optional fraction/exponent, or a `0x` integer. Never signed.
    Number,
    /// Quoted string with escapes already applied
    String,
    /// Raw string, content taken verbatim
    RawString,
    Newline,
    /// A whole preprocessor directive line (marker stripped)
    Directive,
    EndOfStream,
}

impl<K> TokenKind<K> {
    pub fn is_string(&self) -> bool {
        matches!(self, TokenKind::String | TokenKind::RawString)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Symbol(_) => "symbol",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::RawString => "raw string",
            TokenKind::Newline => "newline",
            TokenKind::Directive => "directive",
            TokenKind::EndOfStream => "end of input",
        }
    }
}

/// One lexical unit: kind, literal text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K> {
    pub kind: TokenKind<K>,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl<K: TokenTag> Token<K> {
    pub fn new(kind: TokenKind<K>, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn end_of_stream(location: SourceLocation) -> Self {
        Self::new(TokenKind::EndOfStream, "", location)
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfStream
    }

    pub fn is_symbol(&self, tag: K) -> bool {
        self.kind == TokenKind::Symbol(tag)
    }

    pub fn is_keyword(&self, tag: K) -> bool {
        self.kind == TokenKind::Keyword(tag)
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn position(&self) -> Position {
        self.location.position
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }

    pub fn column(&self) -> u32 {
        self.location.column()
    }

    pub fn stream_name(&self) -> &str {
        self.location.stream_name()
    }

    /// Same token reported at another location (macro expansion sites)
    pub fn relocated(&self, location: SourceLocation) -> Self {
        Self {
            kind: self.kind,
            lexeme: self.lexeme.clone(),
            location,
        }
    }

    /// Short description for diagnostics: `"lexeme"` or `end of input`
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfStream => "end of input".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            _ => format!("\"{}\"", self.lexeme),
        }
    }
}

impl<K: TokenTag> fmt::Display for Token<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.kind.name(), self.describe(), self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tag {
        LBrace,
    }

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("t"), Position::new(2, 5))
    }

    #[test]
    fn test_token_predicates() {
        let token = Token::new(TokenKind::Symbol(Tag::LBrace), "{", loc());
        assert!(token.is_symbol(Tag::LBrace));
        assert!(!token.is_keyword(Tag::LBrace));
        assert!(!token.is_end());
        assert_eq!(token.line(), 2);
        assert_eq!(token.column(), 5);
        assert_eq!(token.describe(), "\"{\"");
    }

    #[test]
    fn test_end_of_stream_description() {
        let token: Token<Tag> = Token::end_of_stream(loc());
        assert!(token.is_end());
        assert_eq!(token.describe(), "end of input");
        assert_eq!(token.to_string(), "end of input end of input at t:2:5");
    }

    #[test]
    fn test_relocated_keeps_kind_and_lexeme() {
        let token: Token<Tag> = Token::new(TokenKind::Number, "42", loc());
        let moved = token.relocated(SourceLocation::new(Arc::from("u"), Position::new(9, 1)));
        assert_eq!(moved.kind, TokenKind::Number);
        assert_eq!(moved.lexeme, "42");
        assert_eq!(moved.location.to_string(), "u:9:1");
    }
}
