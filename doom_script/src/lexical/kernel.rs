//! Tokenizer kernel: the immutable, declarative half of the tokenizer
//!
//! A kernel declares which strings are delimiters, keywords, comment markers
//! and quote characters. It knows nothing about any grammar beyond mapping
//! text to the grammar's tag type `K`. Build it once, wrap it in an `Arc`,
//! and hand it to as many tokenizers as needed.

use crate::tokens::TokenTag;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Kernel<K> {
    delimiters: HashMap<String, K>,
    max_delimiter_chars: usize,
    keywords: HashMap<String, K>,
    case_insensitive_keywords: HashMap<String, K>,
    comment_starts: Vec<Vec<char>>,
    comment_ends: Vec<Vec<char>>,
    comment_lines: Vec<Vec<char>>,
    string_delimiters: HashMap<char, char>,
    raw_string_delimiters: HashMap<char, char>,
    decimal_separator: char,
    directive_marker: Option<char>,
    emit_newlines: bool,
}

impl<K: TokenTag> Default for Kernel<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TokenTag> Kernel<K> {
    pub fn new() -> Self {
        Self {
            delimiters: HashMap::new(),
            max_delimiter_chars: 0,
            keywords: HashMap::new(),
            case_insensitive_keywords: HashMap::new(),
            comment_starts: Vec::new(),
            comment_ends: Vec::new(),
            comment_lines: Vec::new(),
            string_delimiters: HashMap::new(),
            raw_string_delimiters: HashMap::new(),
            decimal_separator: '.',
            directive_marker: None,
            emit_newlines: false,
        }
    }

    /// Symbolic delimiter; longer delimiters win over their prefixes
    pub fn add_delimiter(mut self, text: &str, tag: K) -> Self {
        if text.is_empty() {
            return self;
        }
        self.max_delimiter_chars = self.max_delimiter_chars.max(text.chars().count());
        self.delimiters.insert(text.to_string(), tag);
        self
    }

    pub fn add_keyword(mut self, text: &str, tag: K) -> Self {
        self.keywords.insert(text.to_string(), tag);
        self
    }

    /// Keyword matched regardless of case
    pub fn add_case_insensitive_keyword(mut self, text: &str, tag: K) -> Self {
        self.case_insensitive_keywords
            .insert(text.to_lowercase(), tag);
        self
    }

    /// Block comment opener (e.g. `/*`); closed by any registered comment end
    pub fn add_comment_start(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.comment_starts.push(text.chars().collect());
        }
        self
    }

    pub fn add_comment_end(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.comment_ends.push(text.chars().collect());
        }
        self
    }

    /// Comment running to end of line (e.g. `//`)
    pub fn add_comment_line(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.comment_lines.push(text.chars().collect());
        }
        self
    }

    /// Quoted string with escape processing
    pub fn add_string_delimiter(mut self, open: char, close: char) -> Self {
        self.string_delimiters.insert(open, close);
        self
    }

    /// Quoted string taken verbatim
    pub fn add_raw_string_delimiter(mut self, open: char, close: char) -> Self {
        self.raw_string_delimiters.insert(open, close);
        self
    }

    pub fn set_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    /// Line-initial character introducing a preprocessor directive
    pub fn set_directive_marker(mut self, marker: char) -> Self {
        self.directive_marker = Some(marker);
        self
    }

    /// Default newline emission for tokenizers built on this kernel
    pub fn set_emit_newlines(mut self, emit: bool) -> Self {
        self.emit_newlines = emit;
        self
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn directive_marker(&self) -> Option<char> {
        self.directive_marker
    }

    pub fn emits_newlines(&self) -> bool {
        self.emit_newlines
    }

    pub fn string_close(&self, open: char) -> Option<char> {
        self.string_delimiters.get(&open).copied()
    }

    pub fn raw_string_close(&self, open: char) -> Option<char> {
        self.raw_string_delimiters.get(&open).copied()
    }

    /// Longest delimiter starting at `pos`, as (length in chars, tag)
    pub fn match_delimiter(&self, chars: &[char], pos: usize) -> Option<(usize, K)> {
        let available = chars.len().saturating_sub(pos);
        let longest = self.max_delimiter_chars.min(available);
        let mut candidate = String::with_capacity(longest * 2);
        // Grow once, then test from the longest prefix down
        candidate.extend(&chars[pos..pos + longest]);
        for len in (1..=longest).rev() {
            if let Some(tag) = self.delimiters.get(candidate.as_str()) {
                return Some((len, *tag));
            }
            candidate.pop();
        }
        None
    }

    /// Length of the block comment opener at `pos`, if any
    pub fn match_comment_start(&self, chars: &[char], pos: usize) -> Option<usize> {
        longest_prefix(&self.comment_starts, chars, pos)
    }

    pub fn match_comment_end(&self, chars: &[char], pos: usize) -> Option<usize> {
        longest_prefix(&self.comment_ends, chars, pos)
    }

    pub fn match_comment_line(&self, chars: &[char], pos: usize) -> Option<usize> {
        longest_prefix(&self.comment_lines, chars, pos)
    }

    /// Keyword tag for an identifier run: exact table first, then case-insensitive
    pub fn keyword(&self, text: &str) -> Option<K> {
        self.keywords.get(text).copied().or_else(|| {
            if self.case_insensitive_keywords.is_empty() {
                None
            } else {
                self.case_insensitive_keywords
                    .get(&text.to_lowercase())
                    .copied()
            }
        })
    }
}

fn longest_prefix(markers: &[Vec<char>], chars: &[char], pos: usize) -> Option<usize> {
    let rest = chars.get(pos..)?;
    markers
        .iter()
        .filter(|marker| rest.starts_with(marker))
        .map(|marker| marker.len())
        .max()
}
