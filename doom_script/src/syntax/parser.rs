//! Parser session and the error-collecting parse driver
//!
//! A session walks `NotStarted -> Primed -> Parsing -> Done | Failed`.
//! Syntax errors are recorded and the session resynchronizes at the next
//! top-level token; fatal errors end the parse at once. A parse with any
//! recorded error fails with one [`AggregateParseFailure`].

use super::error::{
    AggregateParseFailure, FatalError, ParseError, ParseFailure, SyntaxError, SyntaxResult,
};
use super::grammar::Grammar;
use super::source::TokenSource;
use crate::config::compile_time::patch::FIXED_POINT_SHIFT;
use crate::config::compile_time::syntax::MAX_RECOVERY_SCAN_TOKENS;
use crate::config::runtime::ParserPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind, TokenTag};
use crate::utils::SourceLocation;
use crate::{log_debug, log_error, log_success, log_warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    NotStarted,
    Primed,
    Parsing,
    Done,
    Failed,
}

/// A numeric literal after sign combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    /// Parse an unsigned number lexeme (`12`, `0x1F`, `2.5`, `1e3`)
    pub fn parse(lexeme: &str) -> Option<Self> {
        if let Some(hex) = lexeme
            .strip_prefix("0x")
            .or_else(|| lexeme.strip_prefix("0X"))
        {
            return i64::from_str_radix(hex, 16).ok().map(Number::Integer);
        }
        if lexeme.contains(['.', 'e', 'E']) {
            return lexeme
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Number::Decimal);
        }
        lexeme.parse::<i64>().ok().map(Number::Integer)
    }

    pub fn negate(self) -> Self {
        match self {
            Number::Integer(v) => Number::Integer(-v),
            Number::Decimal(v) => Number::Decimal(-v),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(v) => v as f64,
            Number::Decimal(v) => v,
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            Number::Integer(v) => Some(v),
            Number::Decimal(_) => None,
        }
    }

    /// Fixed-point value scaled by 2^FIXED_POINT_SHIFT, truncated toward zero
    pub fn to_fixed(self) -> Option<i32> {
        let scale = 1i64 << FIXED_POINT_SHIFT;
        let scaled = match self {
            Number::Integer(v) => v.checked_mul(scale)?,
            Number::Decimal(v) => {
                let scaled = (v * scale as f64).trunc();
                if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
                    return None;
                }
                scaled as i64
            }
        };
        i32::try_from(scaled).ok()
    }
}

pub struct ParserSession<K, S> {
    source: S,
    current: Token<K>,
    state: ParserState,
    errors: Vec<SyntaxError>,
    error_limit: usize,
    truncated: bool,
    consumed: usize,
    trace_recovery: bool,
}

impl<K: TokenTag, S: TokenSource<K>> ParserSession<K, S> {
    pub fn new(source: S, preferences: &ParserPreferences) -> Self {
        Self {
            source,
            current: Token::end_of_stream(SourceLocation::unknown()),
            state: ParserState::NotStarted,
            errors: Vec::new(),
            error_limit: preferences.error_limit(),
            truncated: false,
            consumed: 0,
            trace_recovery: preferences.trace_recovery,
        }
    }

    /// Read the first token; a no-op once primed
    pub fn prime(&mut self) -> Result<(), FatalError> {
        if self.state == ParserState::NotStarted {
            self.current = self.source.next_token()?;
            self.state = ParserState::Primed;
        }
        Ok(())
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn current(&self) -> &Token<K> {
        &self.current
    }

    pub fn current_kind(&self) -> TokenKind<K> {
        self.current.kind
    }

    pub fn location(&self) -> SourceLocation {
        self.current.location.clone()
    }

    pub fn is_at_end(&self) -> bool {
        self.current.is_end()
    }

    /// Tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Consume the current token and return it
    pub fn advance(&mut self) -> Result<Token<K>, FatalError> {
        if self.current.is_end() {
            return Ok(self.current.clone());
        }
        let next = self.source.next_token()?;
        self.consumed += 1;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub fn check_symbol(&self, tag: K) -> bool {
        self.current.is_symbol(tag)
    }

    pub fn check_keyword(&self, tag: K) -> bool {
        self.current.is_keyword(tag)
    }

    pub fn match_symbol(&mut self, tag: K) -> Result<bool, FatalError> {
        self.advance_if(self.check_symbol(tag))
    }

    pub fn match_keyword(&mut self, tag: K) -> Result<bool, FatalError> {
        self.advance_if(self.check_keyword(tag))
    }

    /// Identifier whose text equals `text`, ignoring ASCII case
    pub fn match_identifier_lexeme(&mut self, text: &str) -> Result<bool, FatalError> {
        let matched =
            self.current.is_identifier() && self.current.lexeme.eq_ignore_ascii_case(text);
        self.advance_if(matched)
    }

    fn advance_if(&mut self, condition: bool) -> Result<bool, FatalError> {
        if condition {
            self.advance()?;
        }
        Ok(condition)
    }

    pub fn expect_symbol(&mut self, tag: K, expected: &str) -> SyntaxResult<Token<K>> {
        if self.check_symbol(tag) {
            return Ok(self.advance()?);
        }
        Err(self.unexpected(expected))
    }

    pub fn expect_keyword(&mut self, tag: K, expected: &str) -> SyntaxResult<Token<K>> {
        if self.check_keyword(tag) {
            return Ok(self.advance()?);
        }
        Err(self.unexpected(expected))
    }

    pub fn expect_identifier(&mut self, expected: &str) -> SyntaxResult<Token<K>> {
        if self.current.is_identifier() {
            return Ok(self.advance()?);
        }
        Err(self.unexpected(expected))
    }

    /// String or raw string content
    pub fn expect_string(&mut self, expected: &str) -> SyntaxResult<String> {
        if self.current.kind.is_string() {
            return Ok(self.advance()?.lexeme);
        }
        Err(self.unexpected(expected))
    }

    /// Optional `plus`/`minus` symbol combined with the following number
    pub fn match_signed_number(&mut self, plus: K, minus: K) -> SyntaxResult<Option<Number>> {
        let negative = if self.match_symbol(minus)? {
            true
        } else if self.match_symbol(plus)? {
            false
        } else if self.current.kind == TokenKind::Number {
            false
        } else {
            return Ok(None);
        };

        if self.current.kind != TokenKind::Number {
            return Err(self.unexpected("number after sign"));
        }
        let token = self.advance()?;
        let value = Number::parse(&token.lexeme).ok_or_else(|| {
            SyntaxError::invalid_value(
                format!("Number out of range: {}", token.lexeme),
                token.location.clone(),
            )
        })?;
        Ok(Some(if negative { value.negate() } else { value }))
    }

    pub fn expect_number(&mut self, plus: K, minus: K, expected: &str) -> SyntaxResult<Number> {
        match self.match_signed_number(plus, minus)? {
            Some(number) => Ok(number),
            None => Err(self.unexpected(expected)),
        }
    }

    pub fn expect_integer(&mut self, plus: K, minus: K, expected: &str) -> SyntaxResult<i64> {
        let location = self.location();
        let number = self.expect_number(plus, minus, expected)?;
        number.as_integer().ok_or_else(|| {
            SyntaxError::invalid_value(format!("Expected {}, found a decimal", expected), location)
                .into()
        })
    }

    pub fn expect_fixed(&mut self, plus: K, minus: K, expected: &str) -> SyntaxResult<i32> {
        let location = self.location();
        let number = self.expect_number(plus, minus, expected)?;
        number.to_fixed().ok_or_else(|| {
            SyntaxError::invalid_value(
                format!("Fixed-point value out of range: {}", number.as_f64()),
                location,
            )
            .into()
        })
    }

    /// Grammar violation at the current token
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        SyntaxError::grammar_violation(message, self.location()).into()
    }

    /// "Expected X, found Y" at the current token
    pub fn unexpected(&self, expected: &str) -> ParseError {
        SyntaxError::unexpected(expected, &self.current).into()
    }

    /// Record a diagnostic; false once the error limit is reached
    fn record(&mut self, error: SyntaxError) -> bool {
        log_error!(error.error_code(), &error.to_string(),
            location = error.location().clone()
        );
        self.errors.push(error);
        if self.errors.len() >= self.error_limit {
            self.truncated = !self.is_at_end();
            if self.truncated {
                log_warning!("Error limit reached, parsing stopped",
                    "limit" => self.error_limit
                );
            }
            return false;
        }
        true
    }

    /// Skip to the next top-level token, always making progress
    fn recover<G: Grammar<K>>(&mut self, grammar: &G, start: usize) -> Result<bool, FatalError> {
        if self.consumed == start && !self.is_at_end() {
            self.advance()?;
        }
        let mut skipped = 0usize;
        while !self.is_at_end() && !grammar.is_top_level(&self.current) {
            self.advance()?;
            skipped += 1;
            if skipped > MAX_RECOVERY_SCAN_TOKENS {
                log_warning!("Recovery scan limit reached, parsing stopped",
                    "at" => &self.current.location
                );
                self.truncated = true;
                return Ok(false);
            }
        }
        if self.trace_recovery {
            log_debug!("Resynchronized", "skipped" => skipped, "at" => &self.current.location);
        }
        Ok(true)
    }

    fn handle<G: Grammar<K>>(
        &mut self,
        error: ParseError,
        grammar: &G,
        start: usize,
    ) -> Result<bool, FatalError> {
        match error {
            ParseError::Fatal(fatal) => Err(fatal),
            ParseError::Syntax(syntax) => {
                if !self.record(syntax) {
                    return Ok(false);
                }
                self.recover(grammar, start)
            }
        }
    }
}

fn run<K, S, G>(grammar: &mut G, session: &mut ParserSession<K, S>) -> Result<(), FatalError>
where
    K: TokenTag,
    S: TokenSource<K>,
    G: Grammar<K>,
{
    session.prime()?;
    session.state = ParserState::Parsing;

    if grammar.is_header(session.current()) {
        let start = session.consumed();
        if let Err(error) = grammar.parse_header(session) {
            if !session.handle(error, grammar, start)? {
                return Ok(());
            }
        }
    }

    while !session.is_at_end() {
        let start = session.consumed();
        let result = if grammar.is_header(session.current()) {
            Err(SyntaxError::HeaderNotFirst {
                location: session.location(),
            }
            .into())
        } else {
            grammar.parse_entry(session)
        };
        if let Err(error) = result {
            if !session.handle(error, grammar, start)? {
                break;
            }
        }
    }
    Ok(())
}

/// Drive `grammar` over `source` to completion
pub fn parse<K, S, G>(
    mut grammar: G,
    source: S,
    preferences: &ParserPreferences,
) -> Result<G::Output, ParseFailure>
where
    K: TokenTag,
    S: TokenSource<K>,
    G: Grammar<K>,
{
    let mut session = ParserSession::new(source, preferences);

    if let Err(fatal) = run(&mut grammar, &mut session) {
        session.state = ParserState::Failed;
        return Err(ParseFailure::Fatal(fatal));
    }

    if session.errors.is_empty() {
        session.state = ParserState::Done;
        log_success!(codes::success::PARSE_COMPLETE, "Parse complete",
            "tokens" => session.consumed
        );
        return Ok(grammar.finish());
    }

    session.state = ParserState::Failed;
    let failure = AggregateParseFailure::new(session.errors, session.truncated);
    log_error!(codes::syntax::AGGREGATE_FAILURE, "Parse failed",
        "errors" => failure.len()
    );
    Err(ParseFailure::Aggregate(failure))
}
