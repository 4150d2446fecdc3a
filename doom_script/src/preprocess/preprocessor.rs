//! Token-level preprocessor layered over a stack of tokenizers
//!
//! Directive lines arrive from the tokenizer as single `Directive` tokens and
//! are interpreted here: `define`, `undefine`, `include`, `ifdef`, `ifndef`,
//! `else` and `endif` (names are case-insensitive; `#!` lines are ignored).
//! Identifiers and keywords naming a macro are replaced by the macro's
//! tokens, recursively, up to `MAX_MACRO_DEPTH` levels and within the
//! session's expansion budget. String tokens are never expanded.

use super::error::{IncludeError, PreprocessError};
use super::macros::MacroTable;
use super::resolver::{FileSystemResolver, IncludeResolver};
use crate::config::compile_time::preprocessor::{MAX_INCLUDE_DEPTH, MAX_MACRO_DEPTH};
use crate::config::runtime::PreprocessorPreferences;
use crate::lexical::{Kernel, Tokenizer};
use crate::logging::codes;
use crate::tokens::{Token, TokenKind, TokenTag};
use crate::utils::{Position, SourceLocation};
use crate::{log_debug, log_error, log_success};
use std::collections::VecDeque;
use std::sync::Arc;

const DEFINE_STREAM: &str = "<define>";

#[derive(Debug, Clone)]
struct Conditional {
    enclosing_active: bool,
    branch_active: bool,
    seen_else: bool,
    location: SourceLocation,
}

impl Conditional {
    fn is_active(&self) -> bool {
        self.enclosing_active && self.branch_active
    }
}

struct Frame<K> {
    tokenizer: Tokenizer<K>,
    conditionals: Vec<Conditional>,
}

impl<K: TokenTag> Frame<K> {
    fn new(tokenizer: Tokenizer<K>) -> Self {
        Self {
            tokenizer,
            conditionals: Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        self.conditionals.last().map_or(true, Conditional::is_active)
    }
}

/// Counters reported when the root stream is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    pub directives: usize,
    pub expansions: usize,
    pub expanded_tokens: usize,
    pub includes: usize,
}

pub struct Preprocessor<K> {
    kernel: Arc<Kernel<K>>,
    frames: Vec<Frame<K>>,
    pending: VecDeque<(Token<K>, usize)>,
    macros: MacroTable<K>,
    resolver: Box<dyn IncludeResolver>,
    preferences: PreprocessorPreferences,
    stats: PreprocessStats,
    completed: bool,
}

impl<K: TokenTag> Preprocessor<K> {
    pub fn new(kernel: Arc<Kernel<K>>, stream: impl Into<Arc<str>>, text: &str) -> Self {
        let root = Tokenizer::new(kernel.clone(), stream, text);
        Self::from_tokenizer(root)
    }

    /// Wrap an existing tokenizer as the root stream
    pub fn from_tokenizer(root: Tokenizer<K>) -> Self {
        let preferences = PreprocessorPreferences::default();
        let mut preprocessor = Self {
            kernel: root.kernel().clone(),
            frames: vec![Frame::new(root)],
            pending: VecDeque::new(),
            macros: MacroTable::new(preferences.case_insensitive_macros),
            resolver: Box::new(FileSystemResolver::new()),
            preferences,
            stats: PreprocessStats::default(),
            completed: false,
        };
        preprocessor.apply_newline_preference();
        preprocessor
    }

    pub fn with_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Apply preferences; switching macro case rules clears existing macros
    pub fn with_preferences(mut self, preferences: PreprocessorPreferences) -> Self {
        if preferences.case_insensitive_macros != self.preferences.case_insensitive_macros {
            self.macros = MacroTable::new(preferences.case_insensitive_macros);
        }
        self.preferences = preferences;
        self.apply_newline_preference();
        self
    }

    pub fn set_emit_newlines(&mut self, emit: bool) {
        self.preferences.emit_newlines = emit;
        self.apply_newline_preference();
    }

    fn apply_newline_preference(&mut self) {
        let emit = self.preferences.emit_newlines || self.kernel.emits_newlines();
        for frame in &mut self.frames {
            frame.tokenizer.set_emit_newlines(emit);
        }
    }

    pub fn preferences(&self) -> &PreprocessorPreferences {
        &self.preferences
    }

    pub fn stats(&self) -> PreprocessStats {
        self.stats
    }

    /// Define a macro from outside the source, as `#define NAME text` would
    pub fn define(&mut self, name: &str, text: &str) -> Result<(), PreprocessError> {
        let location = SourceLocation::new(Arc::from(DEFINE_STREAM), Position::start());
        if !is_identifier(name) {
            return Err(self.report(PreprocessError::MalformedDirective {
                message: format!("Invalid macro name \"{}\"", name),
                location,
            }));
        }
        self.store_macro(name, text, location)
    }

    pub fn undefine(&mut self, name: &str) -> bool {
        self.macros.undefine(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.is_defined(name)
    }

    /// Name of the stream currently being read
    pub fn current_stream(&self) -> Option<&str> {
        self.frames.last().map(|frame| frame.tokenizer.stream().as_ref())
    }

    /// Next fully preprocessed token; end-of-stream repeats once reached
    pub fn next_token(&mut self) -> Result<Token<K>, PreprocessError> {
        loop {
            if let Some((token, depth)) = self.pending.pop_front() {
                if self.expand(&token, depth)? {
                    continue;
                }
                return Ok(token);
            }

            let Some(frame) = self.frames.last_mut() else {
                return Ok(Token::end_of_stream(SourceLocation::unknown()));
            };
            let token = frame.tokenizer.next_token()?;

            match token.kind {
                TokenKind::EndOfStream => {
                    if let Some(open) = frame.conditionals.last() {
                        let error = PreprocessError::UnbalancedConditional {
                            message: "Conditional block is never closed with #endif".to_string(),
                            location: open.location.clone(),
                        };
                        return Err(self.report(error));
                    }
                    if self.frames.len() > 1 {
                        self.frames.pop();
                        continue;
                    }
                    self.complete();
                    return Ok(token);
                }
                TokenKind::Directive => {
                    self.directive(token)?;
                }
                _ if !frame.is_active() => {}
                TokenKind::Identifier | TokenKind::Keyword(_) => {
                    if !self.expand(&token, 0)? {
                        return Ok(token);
                    }
                }
                _ => return Ok(token),
            }
        }
    }

    /// Drain to end of stream, excluding the end-of-stream token
    pub fn collect_tokens(&mut self) -> Result<Vec<Token<K>>, PreprocessError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.is_end() {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        let stream = self.current_stream().unwrap_or("").to_string();
        log_success!(codes::success::PREPROCESSING_COMPLETE, "Preprocessing complete",
            "stream" => stream,
            "directives" => self.stats.directives,
            "expansions" => self.stats.expansions,
            "includes" => self.stats.includes
        );
    }

    /// Queue the macro body for `token` if it names one
    fn expand(&mut self, token: &Token<K>, depth: usize) -> Result<bool, PreprocessError> {
        if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword(_)) {
            return Ok(false);
        }
        let Some(body) = self.macros.get(&token.lexeme) else {
            return Ok(false);
        };
        if depth >= MAX_MACRO_DEPTH {
            let error = PreprocessError::MacroDepthExceeded {
                name: token.lexeme.clone(),
                location: token.location.clone(),
            };
            return Err(self.report(error));
        }

        let expanded_tokens = self.stats.expanded_tokens.saturating_add(body.len());
        let limit = self.preferences.expansion_limit();
        if expanded_tokens > limit {
            let error = PreprocessError::ExpansionLimitExceeded {
                name: token.lexeme.clone(),
                limit,
                location: token.location.clone(),
            };
            return Err(self.report(error));
        }
        self.stats.expanded_tokens = expanded_tokens;

        // Replacement tokens report the invocation site
        let expansion: Vec<Token<K>> = body
            .iter()
            .map(|t| t.relocated(token.location.clone()))
            .collect();
        for replacement in expansion.into_iter().rev() {
            self.pending.push_front((replacement, depth + 1));
        }
        self.stats.expansions += 1;
        Ok(true)
    }

    fn directive(&mut self, token: Token<K>) -> Result<(), PreprocessError> {
        let location = token.location;
        let line = token.lexeme.as_str();
        if line.starts_with('!') {
            return Ok(());
        }
        self.stats.directives += 1;

        let (name, rest) = split_word(line);
        let name = name.to_lowercase();
        if self.preferences.trace_directives {
            log_debug!("Directive", "name" => &name, "at" => &location);
        }

        let active = self.frames.last().map_or(true, Frame::is_active);
        match name.as_str() {
            "ifdef" | "ifndef" => {
                let macro_name = self.directive_operand(&name, rest, &location)?;
                let defined = self.macros.is_defined(macro_name);
                let branch_active = if name == "ifdef" { defined } else { !defined };
                self.push_conditional(Conditional {
                    enclosing_active: active,
                    branch_active,
                    seen_else: false,
                    location,
                });
            }
            "else" => {
                let flipped = self
                    .frames
                    .last_mut()
                    .and_then(|frame| frame.conditionals.last_mut())
                    .map(|open| {
                        let first = !open.seen_else;
                        if first {
                            open.seen_else = true;
                            open.branch_active = !open.branch_active;
                        }
                        first
                    });
                let message = match flipped {
                    Some(true) => None,
                    Some(false) => Some("#else encountered twice for one #if"),
                    None => Some("#else encountered without an #if"),
                };
                if let Some(message) = message {
                    return Err(self.report(PreprocessError::UnbalancedConditional {
                        message: message.to_string(),
                        location,
                    }));
                }
            }
            "endif" => {
                let closed = self
                    .frames
                    .last_mut()
                    .and_then(|frame| frame.conditionals.pop());
                if closed.is_none() {
                    return Err(self.report(PreprocessError::UnbalancedConditional {
                        message: "#endif encountered without an #if".to_string(),
                        location,
                    }));
                }
            }
            _ if !active => {}
            "define" => {
                let macro_name = self.directive_operand(&name, rest, &location)?;
                let body = split_word(rest).1;
                self.store_macro(macro_name, body, location)?;
            }
            "undefine" | "undef" => {
                let macro_name = self.directive_operand(&name, rest, &location)?;
                self.macros.undefine(macro_name);
            }
            "include" => {
                let path = self.include_path(rest, &location)?;
                self.include(&path, location)?;
            }
            "" => {
                return Err(self.report(PreprocessError::MalformedDirective {
                    message: "Empty directive".to_string(),
                    location,
                }));
            }
            _ => {
                return Err(self.report(PreprocessError::UnknownDirective {
                    name: split_word(line).0.to_string(),
                    location,
                }));
            }
        }
        Ok(())
    }

    fn push_conditional(&mut self, conditional: Conditional) {
        if let Some(frame) = self.frames.last_mut() {
            frame.conditionals.push(conditional);
        }
    }

    /// First word after the directive name, which must be a macro identifier
    fn directive_operand<'a>(
        &self,
        directive: &str,
        rest: &'a str,
        location: &SourceLocation,
    ) -> Result<&'a str, PreprocessError> {
        let operand = split_word(rest).0;
        let message = match operand.chars().next() {
            None => format!("Expected macro identifier after #{}", directive),
            Some(c) if self.is_quote(c) => {
                format!("Expected identifier after #{}, not string", directive)
            }
            Some(_) if !is_identifier(operand) => {
                format!("Invalid macro identifier \"{}\" after #{}", operand, directive)
            }
            Some(_) => return Ok(operand),
        };
        Err(self.report(PreprocessError::MalformedDirective {
            message,
            location: location.clone(),
        }))
    }

    fn is_quote(&self, c: char) -> bool {
        self.kernel.string_close(c).is_some() || self.kernel.raw_string_close(c).is_some()
    }

    fn store_macro(
        &mut self,
        name: &str,
        body: &str,
        location: SourceLocation,
    ) -> Result<(), PreprocessError> {
        let mut tokenizer = Tokenizer::embedded(
            self.kernel.clone(),
            location.stream.clone(),
            body,
            location.position,
        );
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token()?;
            if token.is_end() {
                break;
            }
            tokens.push(token);
        }

        if self.macros.define(name, tokens).is_err() {
            return Err(self.report(PreprocessError::TooManyMacros { location }));
        }
        Ok(())
    }

    /// Quoted path (quotes stripped) or the bare remainder of the line
    fn include_path(&self, rest: &str, location: &SourceLocation) -> Result<String, PreprocessError> {
        let rest = rest.trim();
        let mut chars = rest.chars();
        let path = match chars.next() {
            None => None,
            Some(open) => match self
                .kernel
                .string_close(open)
                .or_else(|| self.kernel.raw_string_close(open))
            {
                Some(close) => {
                    let inner = chars.as_str();
                    inner.strip_suffix(close).map(str::to_string)
                }
                None => Some(rest.to_string()),
            },
        };

        match path {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(self.report(PreprocessError::MalformedDirective {
                message: "Expected path after #include".to_string(),
                location: location.clone(),
            })),
        }
    }

    fn include(&mut self, path: &str, location: SourceLocation) -> Result<(), PreprocessError> {
        if self.frames.len() > MAX_INCLUDE_DEPTH {
            return Err(self.report(PreprocessError::IncludeDepthExceeded {
                path: path.to_string(),
                location,
            }));
        }

        let including = location.stream_name().to_string();
        let resolved = match self.resolver.resolve(&including, path) {
            Ok(resolved) => resolved,
            Err(source) => {
                return Err(self.report(include_failure(source, location)));
            }
        };

        log_success!(codes::success::INCLUDE_RESOLVED, "Include resolved",
            "path" => path,
            "stream" => &resolved.name
        );

        let mut tokenizer = Tokenizer::new(self.kernel.clone(), resolved.name, &resolved.text);
        tokenizer.set_emit_newlines(self.preferences.emit_newlines || self.kernel.emits_newlines());
        self.frames.push(Frame::new(tokenizer));
        self.stats.includes += 1;
        Ok(())
    }

    fn report(&self, error: PreprocessError) -> PreprocessError {
        match error.location() {
            Some(location) => log_error!(error.error_code(), &error.to_string(),
                location = location.clone()
            ),
            None => log_error!(error.error_code(), &error.to_string()),
        }
        error
    }
}

fn include_failure(source: IncludeError, location: SourceLocation) -> PreprocessError {
    PreprocessError::IncludeFailed { source, location }
}

/// Split off the first whitespace-delimited word
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::resolver::MemoryResolver;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tag {
        LBrace,
        RBrace,
        Thing,
    }

    fn kernel() -> Arc<Kernel<Tag>> {
        Arc::new(
            Kernel::new()
                .add_delimiter("{", Tag::LBrace)
                .add_delimiter("}", Tag::RBrace)
                .add_case_insensitive_keyword("thing", Tag::Thing)
                .add_comment_line("//")
                .add_string_delimiter('"', '"')
                .set_directive_marker('#'),
        )
    }

    fn preferences() -> PreprocessorPreferences {
        PreprocessorPreferences {
            emit_newlines: false,
            case_insensitive_macros: true,
            trace_directives: false,
            max_expanded_tokens: 10_000,
        }
    }

    fn preprocessor(text: &str) -> Preprocessor<Tag> {
        Preprocessor::new(kernel(), "main.dh", text).with_preferences(preferences())
    }

    fn lexemes(text: &str) -> Vec<String> {
        preprocessor(text)
            .collect_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.lexeme)
            .collect()
    }

    fn error(text: &str) -> PreprocessError {
        preprocessor(text).collect_tokens().unwrap_err()
    }

    #[test]
    fn test_define_expands_to_body() {
        assert_eq!(lexemes("#define X 1 2 3\nX"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_define_expands_transitively() {
        assert_eq!(
            lexemes("#define X 1 2 3\n#define Y X\nY Y"),
            vec!["1", "2", "3", "1", "2", "3"]
        );
    }

    #[test]
    fn test_expansion_reports_invocation_site() {
        let tokens = preprocessor("#define X 7\n\n  X").collect_tokens().unwrap();
        assert_eq!(tokens[0].lexeme, "7");
        assert_eq!(tokens[0].location.to_string(), "main.dh:3:3");
    }

    #[test]
    fn test_macro_names_are_case_insensitive() {
        assert_eq!(lexemes("#DEFINE speed 10\nSPEED Speed"), vec!["10", "10"]);
    }

    #[test]
    fn test_case_sensitive_preference() {
        let mut prefs = preferences();
        prefs.case_insensitive_macros = false;
        let tokens = Preprocessor::new(kernel(), "main.dh", "#define A 1\nA a")
            .with_preferences(prefs)
            .collect_tokens()
            .unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["1", "a"]);
    }

    #[test]
    fn test_keywords_expand_but_strings_do_not() {
        assert_eq!(
            lexemes("#define thing 5\nthing \"thing\""),
            vec!["5", "thing"]
        );
    }

    #[test]
    fn test_cyclic_macro_is_fatal() {
        assert_matches!(
            error("#define A B\n#define B A\nA"),
            PreprocessError::MacroDepthExceeded { .. }
        );
        assert_matches!(
            error("#define SELF SELF\nSELF"),
            PreprocessError::MacroDepthExceeded { .. }
        );
    }

    #[test]
    fn test_doubling_macros_hit_expansion_budget() {
        let mut text = String::from("#define A0 x\n");
        for level in 1..=40 {
            text.push_str(&format!("#define A{} A{} A{}\n", level, level - 1, level - 1));
        }
        text.push_str("A40");

        let failure = error(&text);
        assert_matches!(
            &failure,
            PreprocessError::ExpansionLimitExceeded { limit: 10_000, .. }
        );
        assert_eq!(failure.location().map(|l| l.line()), Some(42));

        // Within budget the same shape expands fully
        let tokens = preprocessor("#define A0 x\n#define A1 A0 A0\n#define A2 A1 A1\nA2")
            .collect_tokens()
            .unwrap();
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_undefine() {
        assert_eq!(lexemes("#define A 1\nA\n#undefine A\nA"), vec!["1", "A"]);
    }

    #[test]
    fn test_continuation_lines_join_macro_body() {
        assert_eq!(lexemes("#define L 1 \\\n 2\nL"), vec!["1", "2"]);
    }

    #[test]
    fn test_conditionals() {
        let text = "#define DEBUG\n\
                    #ifdef DEBUG\n a\n #ifndef DEBUG\n b\n #else\n c\n #endif\n\
                    #else\n d\n #endif\n\
                    #ifndef RELEASE\n e\n#endif";
        assert_eq!(lexemes(text), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_inactive_block_skips_directives() {
        let text = "#ifdef MISSING\n#define A 1\n#include \"nowhere\"\n#endif\nA";
        assert_eq!(lexemes(text), vec!["A"]);
    }

    #[test]
    fn test_unbalanced_conditionals_are_fatal() {
        assert_matches!(error("#endif"), PreprocessError::UnbalancedConditional { .. });
        assert_matches!(error("#else"), PreprocessError::UnbalancedConditional { .. });
        assert_matches!(
            error("#ifdef A\nx\n#else\n#else\n#endif"),
            PreprocessError::UnbalancedConditional { .. }
        );
        let unterminated = error("x\n#ifdef A\ny");
        assert_eq!(unterminated.location().map(|l| l.line()), Some(2));
    }

    #[test]
    fn test_malformed_and_unknown_directives() {
        assert_matches!(error("#define"), PreprocessError::MalformedDirective { .. });
        assert_matches!(error("#define \"X\" 1"), PreprocessError::MalformedDirective { .. });
        assert_matches!(error("#include"), PreprocessError::MalformedDirective { .. });
        let unknown = error("\n#pragma once");
        assert_matches!(&unknown, PreprocessError::UnknownDirective { name, .. } if name == "pragma");
        assert_eq!(unknown.to_string(), "main.dh:2:1: Not a valid directive: pragma");
    }

    #[test]
    fn test_hashbang_is_ignored() {
        assert_eq!(lexemes("#!/usr/bin/env doom_script\nthing"), vec!["thing"]);
    }

    #[test]
    fn test_include_from_memory() {
        let resolver = MemoryResolver::new().with_file("defs.dh", "#define HP 100\n{ }");
        let tokens = Preprocessor::new(kernel(), "main.dh", "#include \"defs.dh\"\nHP")
            .with_preferences(preferences())
            .with_resolver(resolver)
            .collect_tokens()
            .unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["{", "}", "100"]);
        assert_eq!(tokens[0].stream_name(), "defs.dh");
        assert_eq!(tokens[2].stream_name(), "main.dh");
    }

    #[test]
    fn test_include_failure_is_fatal() {
        let failure = Preprocessor::new(kernel(), "main.dh", "#include \"gone.dh\"")
            .with_preferences(preferences())
            .with_resolver(MemoryResolver::new())
            .collect_tokens()
            .unwrap_err();
        assert_matches!(
            &failure,
            PreprocessError::IncludeFailed { source: IncludeError::NotFound { path }, .. } if path == "gone.dh"
        );
        assert!(failure.to_string().starts_with("main.dh:1:1: "));
    }

    #[test]
    fn test_recursive_include_hits_depth_limit() {
        let resolver = MemoryResolver::new().with_file("loop.dh", "#include \"loop.dh\"");
        let failure = Preprocessor::new(kernel(), "main.dh", "#include \"loop.dh\"")
            .with_preferences(preferences())
            .with_resolver(resolver)
            .collect_tokens()
            .unwrap_err();
        assert_matches!(failure, PreprocessError::IncludeDepthExceeded { .. });
    }

    #[test]
    fn test_newline_emission_toggle() {
        let mut quiet = preprocessor("a\nb");
        assert_eq!(quiet.collect_tokens().unwrap().len(), 2);

        let mut loud = preprocessor("#define X 1\na\nb");
        loud.set_emit_newlines(true);
        let kinds: Vec<TokenKind<Tag>> =
            loud.collect_tokens().unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn test_programmatic_define() {
        let mut pp = preprocessor("FLAG");
        pp.define("FLAG", "1 2").unwrap();
        assert!(pp.is_defined("flag"));
        assert_eq!(pp.collect_tokens().unwrap().len(), 2);
        assert_matches!(pp.define("1bad", ""), Err(PreprocessError::MalformedDirective { .. }));
        assert!(pp.undefine("FLAG"));
    }

    #[test]
    fn test_end_of_stream_is_idempotent() {
        let mut pp = preprocessor("#define X 1\nX");
        assert_eq!(pp.next_token().unwrap().lexeme, "1");
        assert!(pp.next_token().unwrap().is_end());
        assert!(pp.next_token().unwrap().is_end());
        let stats = pp.stats();
        assert_eq!(stats.directives, 1);
        assert_eq!(stats.expansions, 1);
        assert_eq!(stats.expanded_tokens, 1);
    }

    #[test]
    fn test_lexical_errors_pass_through() {
        assert_matches!(error("\"open"), PreprocessError::Lexer(_));
    }
}
