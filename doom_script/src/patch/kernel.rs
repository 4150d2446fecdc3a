//! Lexical table for patch scripts

use crate::lexical::Kernel;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchTag {
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Period,
    Colon,
    Plus,
    Minus,

    Using,
    Thing,
    Weapon,
    Ammo,
    State,
    Strings,
    Misc,
    True,
    False,
}

fn build() -> Kernel<PatchTag> {
    Kernel::new()
        .add_delimiter("(", PatchTag::LParen)
        .add_delimiter(")", PatchTag::RParen)
        .add_delimiter("{", PatchTag::LBrace)
        .add_delimiter("}", PatchTag::RBrace)
        .add_delimiter(",", PatchTag::Comma)
        .add_delimiter(".", PatchTag::Period)
        .add_delimiter(":", PatchTag::Colon)
        .add_delimiter("+", PatchTag::Plus)
        .add_delimiter("-", PatchTag::Minus)
        .add_case_insensitive_keyword("using", PatchTag::Using)
        .add_case_insensitive_keyword("thing", PatchTag::Thing)
        .add_case_insensitive_keyword("weapon", PatchTag::Weapon)
        .add_case_insensitive_keyword("ammo", PatchTag::Ammo)
        .add_case_insensitive_keyword("state", PatchTag::State)
        .add_case_insensitive_keyword("strings", PatchTag::Strings)
        .add_case_insensitive_keyword("misc", PatchTag::Misc)
        .add_case_insensitive_keyword("true", PatchTag::True)
        .add_case_insensitive_keyword("false", PatchTag::False)
        .add_comment_start("/*")
        .add_comment_end("*/")
        .add_comment_line("//")
        .add_string_delimiter('"', '"')
        .add_raw_string_delimiter('`', '`')
        .set_decimal_separator('.')
        .set_directive_marker('#')
}

/// Shared patch kernel, built on first use
pub fn patch_kernel() -> Arc<Kernel<PatchTag>> {
    static KERNEL: OnceLock<Arc<Kernel<PatchTag>>> = OnceLock::new();
    KERNEL.get_or_init(|| Arc::new(build())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::Tokenizer;
    use crate::tokens::TokenKind;

    #[test]
    fn test_keywords_ignore_case() {
        let kernel = patch_kernel();
        assert_eq!(kernel.keyword("THING"), Some(PatchTag::Thing));
        assert_eq!(kernel.keyword("Using"), Some(PatchTag::Using));
        assert_eq!(kernel.keyword("health"), None);
    }

    #[test]
    fn test_script_fragment_tokens() {
        let mut tokenizer = Tokenizer::new(
            patch_kernel(),
            "frag.dh",
            "thing 3 `raw \\n` { height -56.0 } // tail",
        );
        let mut kinds = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token.is_end() {
                break;
            }
            kinds.push((token.kind, token.lexeme));
        }
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Keyword(PatchTag::Thing), "thing".to_string()),
                (TokenKind::Number, "3".to_string()),
                (TokenKind::RawString, "raw \\n".to_string()),
                (TokenKind::Symbol(PatchTag::LBrace), "{".to_string()),
                (TokenKind::Identifier, "height".to_string()),
                (TokenKind::Symbol(PatchTag::Minus), "-".to_string()),
                (TokenKind::Number, "56.0".to_string()),
                (TokenKind::Symbol(PatchTag::RBrace), "}".to_string()),
            ]
        );
    }
}
