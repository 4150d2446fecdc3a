//! Macro table: names mapped to pre-tokenized replacement lists

use crate::config::compile_time::preprocessor::MAX_MACRO_COUNT;
use crate::tokens::{Token, TokenTag};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MacroTable<K> {
    definitions: HashMap<String, Vec<Token<K>>>,
    case_insensitive: bool,
}

/// Returned when a new definition would exceed the macro limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroLimitReached;

impl<K: TokenTag> MacroTable<K> {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            definitions: HashMap::new(),
            case_insensitive,
        }
    }

    fn key(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Define or redefine; redefinition never counts against the limit
    pub fn define(&mut self, name: &str, body: Vec<Token<K>>) -> Result<(), MacroLimitReached> {
        let key = self.key(name);
        if !self.definitions.contains_key(&key) && self.definitions.len() >= MAX_MACRO_COUNT {
            return Err(MacroLimitReached);
        }
        self.definitions.insert(key, body);
        Ok(())
    }

    pub fn undefine(&mut self, name: &str) -> bool {
        let key = self.key(name);
        self.definitions.remove(&key).is_some()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(&self.key(name))
    }

    pub fn get(&self, name: &str) -> Option<&[Token<K>]> {
        self.definitions.get(&self.key(name)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use crate::utils::SourceLocation;

    fn number(text: &str) -> Token<()> {
        Token::new(TokenKind::Number, text, SourceLocation::unknown())
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut table = MacroTable::new(true);
        table.define("Speed", vec![number("10")]).unwrap();
        assert!(table.is_defined("SPEED"));
        assert_eq!(table.get("speed").map(|b| b.len()), Some(1));
        assert!(table.undefine("sPeEd"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_case_sensitive_lookup() {
        let mut table: MacroTable<()> = MacroTable::new(false);
        table.define("Speed", vec![]).unwrap();
        assert!(table.is_defined("Speed"));
        assert!(!table.is_defined("speed"));
        assert!(!table.undefine("SPEED"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_redefinition_replaces_body() {
        let mut table = MacroTable::new(true);
        table.define("x", vec![number("1")]).unwrap();
        table.define("X", vec![number("2"), number("3")]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("x").map(|b| b.len()), Some(2));
    }
}
