//! Stateful tokenizer over one character stream
//!
//! Matching order at each position is fixed: comments, then strings and raw
//! strings, then the longest kernel delimiter, then identifiers/keywords, then
//! unsigned numbers. Once the stream is exhausted every further call returns
//! the same end-of-stream token.

use super::error::LexerError;
use super::kernel::Kernel;
use crate::config::compile_time::lexical::*;
use crate::config::compile_time::preprocessor::MAX_DIRECTIVE_LENGTH;
use crate::tokens::{Token, TokenKind, TokenTag};
use crate::utils::{Position, SourceLocation};
use crate::{log_debug, log_error};
use std::io::Read;
use std::sync::Arc;

pub struct Tokenizer<K> {
    kernel: Arc<Kernel<K>>,
    stream: Arc<str>,
    chars: Vec<char>,
    index: usize,
    position: Position,
    emit_newlines: bool,
    at_line_start: bool,
    directives_enabled: bool,
    token_count: usize,
    finished: bool,
}

impl<K: TokenTag> Tokenizer<K> {
    pub fn new(kernel: Arc<Kernel<K>>, stream: impl Into<Arc<str>>, text: &str) -> Self {
        let emit_newlines = kernel.emits_newlines();
        Self {
            kernel,
            stream: stream.into(),
            chars: text.chars().collect(),
            index: 0,
            position: Position::start(),
            emit_newlines,
            at_line_start: true,
            directives_enabled: true,
            token_count: 0,
            finished: false,
        }
    }

    /// Read the whole stream up front; read failures are fatal
    pub fn from_reader<R: Read>(
        kernel: Arc<Kernel<K>>,
        stream: impl Into<Arc<str>>,
        mut reader: R,
    ) -> Result<Self, LexerError> {
        let stream = stream.into();
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| LexerError::SourceRead {
                stream: stream.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(kernel, stream, &text))
    }

    /// Tokenizer for text embedded elsewhere (directive bodies).
    /// Positions start at `origin`; directive markers are ordinary characters.
    pub fn embedded(
        kernel: Arc<Kernel<K>>,
        stream: Arc<str>,
        text: &str,
        origin: Position,
    ) -> Self {
        let mut tokenizer = Self::new(kernel, stream, text);
        tokenizer.position = origin;
        tokenizer.emit_newlines = false;
        tokenizer.directives_enabled = false;
        tokenizer.at_line_start = false;
        tokenizer
    }

    pub fn set_emit_newlines(&mut self, emit: bool) {
        self.emit_newlines = emit;
    }

    pub fn emits_newlines(&self) -> bool {
        self.emit_newlines
    }

    pub fn stream(&self) -> &Arc<str> {
        &self.stream
    }

    pub fn kernel(&self) -> &Arc<Kernel<K>> {
        &self.kernel
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.stream.clone(), self.position)
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Next token, or the end-of-stream token once input is exhausted
    pub fn next_token(&mut self) -> Result<Token<K>, LexerError> {
        match self.scan() {
            Ok(token) => {
                if !token.is_end() {
                    self.token_count += 1;
                    if self.token_count > MAX_TOKEN_COUNT {
                        return Err(self.report(LexerError::TooManyTokens {
                            location: token.location,
                        }));
                    }
                }
                Ok(token)
            }
            Err(error) => Err(self.report(error)),
        }
    }

    fn report(&self, error: LexerError) -> LexerError {
        match error.location() {
            Some(location) => log_error!(error.error_code(), &error.to_string(),
                location = location.clone(),
                "stream" => &self.stream
            ),
            None => log_error!(error.error_code(), &error.to_string(),
                "stream" => &self.stream
            ),
        }
        error
    }

    fn scan(&mut self) -> Result<Token<K>, LexerError> {
        loop {
            let Some(c) = self.peek(0) else {
                if !self.finished {
                    self.finished = true;
                    log_debug!("Stream exhausted",
                        "stream" => &self.stream,
                        "tokens" => self.token_count
                    );
                }
                return Ok(Token::end_of_stream(self.location()));
            };

            if self.at_line_start
                && self.directives_enabled
                && Some(c) == self.kernel.directive_marker()
            {
                return self.read_directive();
            }

            if c == '\n' {
                let location = self.location();
                self.bump();
                self.at_line_start = true;
                if self.emit_newlines {
                    return Ok(Token::new(TokenKind::Newline, "\n", location));
                }
                continue;
            }

            if c.is_whitespace() {
                self.bump();
                continue;
            }

            self.at_line_start = false;

            let line_comment = self.kernel.match_comment_line(&self.chars, self.index);
            let block_comment = self.kernel.match_comment_start(&self.chars, self.index);
            match (line_comment, block_comment) {
                (Some(line), Some(block)) if block > line => {
                    self.skip_block_comment(block)?;
                    continue;
                }
                (Some(_), _) => {
                    self.skip_line_comment();
                    continue;
                }
                (None, Some(block)) => {
                    self.skip_block_comment(block)?;
                    continue;
                }
                (None, None) => {}
            }

            if let Some(close) = self.kernel.string_close(c) {
                return self.read_string(close);
            }
            if let Some(close) = self.kernel.raw_string_close(c) {
                return self.read_raw_string(close);
            }

            if let Some((length, tag)) = self.kernel.match_delimiter(&self.chars, self.index) {
                let location = self.location();
                let lexeme: String = self.chars[self.index..self.index + length].iter().collect();
                self.bump_n(length);
                return Ok(Token::new(TokenKind::Symbol(tag), lexeme, location));
            }

            if c.is_alphabetic() || c == '_' {
                return self.read_identifier();
            }

            if c.is_ascii_digit()
                || (c == self.kernel.decimal_separator()
                    && self.peek(1).is_some_and(|n| n.is_ascii_digit()))
            {
                return self.read_number();
            }

            return Err(LexerError::UnexpectedCharacter {
                character: c,
                location: self.location(),
            });
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.index).copied()?;
        self.index += 1;
        self.position = self.position.advance(c);
        Some(c)
    }

    fn bump_n(&mut self, count: usize) {
        for _ in 0..count {
            self.bump();
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, opener: usize) -> Result<(), LexerError> {
        let location = self.location();
        self.bump_n(opener);
        loop {
            if self.index >= self.chars.len() {
                return Err(LexerError::UnterminatedComment { location });
            }
            if let Some(closer) = self.kernel.match_comment_end(&self.chars, self.index) {
                self.bump_n(closer);
                return Ok(());
            }
            self.bump();
        }
    }

    /// Rest of the logical line after the marker; backslash-newline joins lines
    fn read_directive(&mut self) -> Result<Token<K>, LexerError> {
        let location = self.location();
        self.bump();
        let mut text = String::new();

        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            if c == '\\' && self.continues_line() {
                while let Some(skipped) = self.bump() {
                    if skipped == '\n' {
                        break;
                    }
                }
                text.push(' ');
                continue;
            }
            text.push(c);
            self.bump();
            if text.len() > MAX_DIRECTIVE_LENGTH {
                return Err(LexerError::DirectiveTooLong {
                    length: text.len(),
                    location,
                });
            }
        }

        // The terminating newline stays in the stream so line structure survives
        Ok(Token::new(
            TokenKind::Directive,
            text.trim().to_string(),
            location,
        ))
    }

    /// Backslash at `index` followed only by blanks and a newline
    fn continues_line(&self) -> bool {
        let mut offset = 1;
        while let Some(c) = self.peek(offset) {
            match c {
                '\n' => return true,
                ' ' | '\t' | '\r' => offset += 1,
                _ => return false,
            }
        }
        false
    }

    fn read_string(&mut self, close: char) -> Result<Token<K>, LexerError> {
        let location = self.location();
        self.bump();
        let mut content = String::new();

        loop {
            let Some(c) = self.peek(0) else {
                return Err(LexerError::UnterminatedString { location });
            };
            if c == '\n' {
                return Err(LexerError::UnterminatedString { location });
            }
            self.bump();
            if c == close {
                break;
            }
            if c == '\\' {
                content.push(self.read_escape()?);
            } else {
                content.push(c);
            }
            self.check_string_size(&content, &location)?;
        }

        Ok(Token::new(TokenKind::String, content, location))
    }

    fn read_escape(&mut self) -> Result<char, LexerError> {
        let location = self.location();
        let Some(c) = self.bump() else {
            return Err(LexerError::InvalidEscape {
                sequence: String::new(),
                location,
            });
        };
        let escaped = match c {
            '0' => '\0',
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            'u' => return self.read_hex_escape('u', 4, location),
            'x' => return self.read_hex_escape('x', 2, location),
            '\n' => {
                return Err(LexerError::UnterminatedString { location });
            }
            // Quotes, backslash, slash and any other non-alphanumeric stand for themselves
            other if !other.is_alphanumeric() => other,
            other => {
                return Err(LexerError::InvalidEscape {
                    sequence: other.to_string(),
                    location,
                });
            }
        };
        Ok(escaped)
    }

    fn read_hex_escape(
        &mut self,
        prefix: char,
        digits: usize,
        location: SourceLocation,
    ) -> Result<char, LexerError> {
        let mut sequence = prefix.to_string();
        for _ in 0..digits {
            match self.peek(0) {
                Some(h) if h.is_ascii_hexdigit() => {
                    sequence.push(h);
                    self.bump();
                }
                _ => {
                    return Err(LexerError::InvalidEscape { sequence, location });
                }
            }
        }
        u32::from_str_radix(&sequence[1..], 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(LexerError::InvalidEscape { sequence, location })
    }

    fn read_raw_string(&mut self, close: char) -> Result<Token<K>, LexerError> {
        let location = self.location();
        self.bump();
        let mut content = String::new();

        loop {
            let Some(c) = self.bump() else {
                return Err(LexerError::UnterminatedString { location });
            };
            if c == close {
                break;
            }
            content.push(c);
            self.check_string_size(&content, &location)?;
        }

        Ok(Token::new(TokenKind::RawString, content, location))
    }

    fn check_string_size(&self, content: &str, location: &SourceLocation) -> Result<(), LexerError> {
        if content.len() > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size: content.len(),
                location: location.clone(),
            });
        }
        Ok(())
    }

    fn read_identifier(&mut self) -> Result<Token<K>, LexerError> {
        let location = self.location();
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            text.push(c);
            self.bump();
        }

        let length = text.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong { length, location });
        }

        let kind = match self.kernel.keyword(&text) {
            Some(tag) => TokenKind::Keyword(tag),
            None => TokenKind::Identifier,
        };
        Ok(Token::new(kind, text, location))
    }

    /// Unsigned decimal (fraction and exponent optional) or `0x` hexadecimal.
    /// The fraction separator is normalized to `.` in the lexeme.
    fn read_number(&mut self) -> Result<Token<K>, LexerError> {
        let location = self.location();
        let mut text = String::new();

        let is_hex = self.peek(0) == Some('0')
            && matches!(self.peek(1), Some('x') | Some('X'))
            && self.peek(2).is_some_and(|c| c.is_ascii_hexdigit());

        if is_hex {
            text.push('0');
            text.push('x');
            self.bump_n(2);
            self.take_while_into(&mut text, |c| c.is_ascii_hexdigit());
        } else {
            self.take_while_into(&mut text, |c| c.is_ascii_digit());

            let separator = self.kernel.decimal_separator();
            if self.peek(0) == Some(separator) && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
                if text.is_empty() {
                    text.push('0');
                }
                text.push('.');
                self.bump();
                self.take_while_into(&mut text, |c| c.is_ascii_digit());
            }

            if matches!(self.peek(0), Some('e') | Some('E')) {
                let signed = matches!(self.peek(1), Some('+') | Some('-'));
                let digit_at = if signed { 2 } else { 1 };
                if self.peek(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    for _ in 0..digit_at {
                        if let Some(c) = self.bump() {
                            text.push(c);
                        }
                    }
                    self.take_while_into(&mut text, |c| c.is_ascii_digit());
                }
            }
        }

        if let Some(c) = self.peek(0) {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                return Err(LexerError::InvalidNumber { text, location });
            }
        }

        Ok(Token::new(TokenKind::Number, text, location))
    }

    fn take_while_into(&mut self, text: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(c) = self.peek(0) {
            if !accept(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tag {
        LBrace,
        RBrace,
        Plus,
        PlusPlus,
        Minus,
        Dot,
        True,
        State,
    }

    fn kernel() -> Arc<Kernel<Tag>> {
        Arc::new(
            Kernel::new()
                .add_delimiter("{", Tag::LBrace)
                .add_delimiter("}", Tag::RBrace)
                .add_delimiter("+", Tag::Plus)
                .add_delimiter("++", Tag::PlusPlus)
                .add_delimiter("-", Tag::Minus)
                .add_delimiter(".", Tag::Dot)
                .add_keyword("state", Tag::State)
                .add_case_insensitive_keyword("true", Tag::True)
                .add_comment_start("/*")
                .add_comment_end("*/")
                .add_comment_line("//")
                .add_string_delimiter('"', '"')
                .add_raw_string_delimiter('`', '`')
                .set_directive_marker('#'),
        )
    }

    fn tokens(text: &str) -> Vec<Token<Tag>> {
        let mut tokenizer = Tokenizer::new(kernel(), "test", text);
        let mut out = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token.is_end() {
                break;
            }
            out.push(token);
        }
        out
    }

    fn kinds(text: &str) -> Vec<TokenKind<Tag>> {
        tokens(text).into_iter().map(|t| t.kind).collect()
    }

    fn first_error(text: &str) -> LexerError {
        let mut tokenizer = Tokenizer::new(kernel(), "test", text);
        loop {
            match tokenizer.next_token() {
                Ok(token) if token.is_end() => panic!("expected an error for {:?}", text),
                Ok(_) => continue,
                Err(error) => return error,
            }
        }
    }

    #[test]
    fn test_end_of_stream_is_idempotent() {
        let mut tokenizer = Tokenizer::new(kernel(), "test", "a");
        assert_eq!(tokenizer.next_token().unwrap().lexeme, "a");
        let first = tokenizer.next_token().unwrap();
        let second = tokenizer.next_token().unwrap();
        assert!(first.is_end());
        assert_eq!(first, second);
        assert_eq!(tokenizer.token_count(), 1);
    }

    #[test]
    fn test_longest_delimiter_and_keywords() {
        assert_eq!(
            kinds("state ++ + { TRUE }"),
            vec![
                TokenKind::Keyword(Tag::State),
                TokenKind::Symbol(Tag::PlusPlus),
                TokenKind::Symbol(Tag::Plus),
                TokenKind::Symbol(Tag::LBrace),
                TokenKind::Keyword(Tag::True),
                TokenKind::Symbol(Tag::RBrace),
            ]
        );
        // Exact keywords are case-sensitive
        assert_eq!(kinds("State"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let lexemes: Vec<String> = tokens("a // line\nb /* block\nstill */ c")
            .into_iter()
            .map(|t| t.lexeme)
            .collect();
        assert_eq!(lexemes, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_string_escapes() {
        let toks = tokens(r#""a\tb\"c\\ \u0041\x42""#);
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].lexeme, "a\tb\"c\\ AB");
    }

    #[test]
    fn test_raw_string_is_verbatim() {
        let toks = tokens("`C:\\path\\n\nnext`");
        assert_eq!(toks[0].kind, TokenKind::RawString);
        assert_eq!(toks[0].lexeme, "C:\\path\\n\nnext");
    }

    #[test]
    fn test_numbers_are_unsigned() {
        let toks = tokens("-12 3.25 0x1F 1e3 2E-2");
        let lexemes: Vec<&str> = toks.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["-", "12", "3.25", "0x1F", "1e3", "2E-2"]);
        assert_eq!(toks[0].kind, TokenKind::Symbol(Tag::Minus));
        assert_eq!(toks[1].kind, TokenKind::Number);
    }

    #[test]
    fn test_dot_after_number_is_delimiter() {
        assert_eq!(
            kinds("1."),
            vec![TokenKind::Number, TokenKind::Symbol(Tag::Dot)]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let toks = tokens("a\n  b");
        assert_eq!(toks[0].location.to_string(), "test:1:1");
        assert_eq!(toks[1].location.to_string(), "test:2:3");
    }

    #[test]
    fn test_newline_emission() {
        let mut tokenizer = Tokenizer::new(kernel(), "test", "a\nb");
        tokenizer.set_emit_newlines(true);
        let mut seen = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token.is_end() {
                break;
            }
            seen.push(token.kind);
        }
        assert_eq!(
            seen,
            vec![TokenKind::Identifier, TokenKind::Newline, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_directive_line_with_continuation() {
        let toks = tokens("  #define X 1 \\\n 2\nX");
        assert_eq!(toks[0].kind, TokenKind::Directive);
        assert_eq!(toks[0].lexeme, "define X 1   2");
        assert_eq!(toks[0].location.to_string(), "test:1:3");
        assert_eq!(toks[1].lexeme, "X");
        assert_eq!(toks[1].line(), 3);
    }

    #[test]
    fn test_marker_mid_line_is_not_a_directive() {
        assert_matches!(
            first_error("a #define"),
            LexerError::UnexpectedCharacter { character: '#', .. }
        );
    }

    #[test]
    fn test_embedded_tokenizer_uses_origin() {
        let mut tokenizer =
            Tokenizer::embedded(kernel(), Arc::from("inc"), "x y", Position::new(4, 9));
        let x = tokenizer.next_token().unwrap();
        let y = tokenizer.next_token().unwrap();
        assert_eq!(x.location.to_string(), "inc:4:9");
        assert_eq!(y.location.to_string(), "inc:4:11");
    }

    #[test]
    fn test_lexical_errors_carry_location() {
        let error = first_error("a\n  \"open");
        assert_matches!(&error, LexerError::UnterminatedString { .. });
        assert_eq!(error.to_string(), "test:2:3: Unterminated string literal");

        assert_matches!(first_error("/* never closed"), LexerError::UnterminatedComment { .. });
        assert_matches!(first_error("\"bad \\q\""), LexerError::InvalidEscape { .. });
        assert_matches!(first_error("12abc"), LexerError::InvalidNumber { .. });
        assert_matches!(
            first_error("ok @"),
            LexerError::UnexpectedCharacter { character: '@', .. }
        );
    }

    #[test]
    fn test_newline_inside_string_is_fatal() {
        assert_matches!(first_error("\"a\nb\""), LexerError::UnterminatedString { .. });
    }

    #[test]
    fn test_from_reader() {
        let reader = std::io::Cursor::new("state {".as_bytes());
        let mut tokenizer = Tokenizer::from_reader(kernel(), "cursor", reader).unwrap();
        assert!(tokenizer.next_token().unwrap().is_keyword(Tag::State));
        assert_eq!(tokenizer.stream().as_ref(), "cursor");
    }
}
