//! Patch script grammar
//!
//! ```text
//! script  := [ "using" FORMAT ] entry*
//! entry   := ("thing" | "weapon" | "ammo" | "state") index [STRING] "{" field* "}"
//!          | "strings" "{" (IDENT STRING)* "}"
//!          | "misc" "{" field* "}"
//! index   := signed-integer | IDENT
//! field   := IDENT value
//! ```

use super::document::{
    misc_field_type, FieldType, FieldValue, PatchDocument, PatchError, PatchFormat, SlotKind,
};
use super::kernel::{patch_kernel, PatchTag};
use crate::config::runtime::{ParserPreferences, PreprocessorPreferences};
use crate::log_debug;
use crate::preprocess::{IncludeResolver, Preprocessor};
use crate::syntax::{
    parse, Grammar, ParseError, ParseFailure, ParserSession, SyntaxError, SyntaxResult,
    TokenSource,
};
use crate::tokens::{Token, TokenKind};
use crate::utils::SourceLocation;

#[derive(Debug, Clone, Default)]
pub struct PatchGrammar {
    document: PatchDocument,
}

impl PatchGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format used when the script has no `using` clause
    pub fn with_default_format(format: PatchFormat) -> Self {
        Self {
            document: PatchDocument::new(format),
        }
    }

    fn parse_object<S: TokenSource<PatchTag>>(
        &mut self,
        kind: SlotKind,
        session: &mut ParserSession<PatchTag, S>,
    ) -> SyntaxResult<()> {
        session.advance()?;

        let location = session.location();
        let index = if session.current().is_identifier() {
            let name = session.advance()?.lexeme;
            self.document
                .table_mut(kind)
                .resolve_name(&name)
                .map_err(|error| reject(error, location.clone()))?
        } else {
            let expected = format!("{} index", kind);
            session.expect_integer(PatchTag::Plus, PatchTag::Minus, &expected)?
        };

        let table = self.document.table_mut(kind);
        table
            .touch(index)
            .map_err(|error| reject(error, location))?;

        if session.current_kind().is_string() {
            let name = session.expect_string("entry name")?;
            if let Ok(entry) = table.touch(index) {
                entry.name = Some(name);
            }
        }

        session.expect_symbol(PatchTag::LBrace, "'{'")?;
        while !session.match_symbol(PatchTag::RBrace)? {
            if session.is_at_end() {
                return Err(session.unexpected("'}'"));
            }
            let field = session.expect_identifier("field name")?;
            let field_type = kind.field_type(&field.lexeme).ok_or_else(|| {
                reject(
                    PatchError::UnknownField {
                        section: kind.to_string(),
                        field: field.lexeme.clone(),
                    },
                    field.location.clone(),
                )
            })?;
            let value = self.parse_value(&field, field_type, session)?;
            let table = self.document.table_mut(kind);
            let entry = table
                .touch(index)
                .map_err(|error| reject(error, field.location.clone()))?;
            entry.fields.insert(field.lexeme.to_ascii_lowercase(), value);
        }
        Ok(())
    }

    fn parse_strings<S: TokenSource<PatchTag>>(
        &mut self,
        session: &mut ParserSession<PatchTag, S>,
    ) -> SyntaxResult<()> {
        session.advance()?;
        session.expect_symbol(PatchTag::LBrace, "'{' after \"strings\"")?;
        while !session.match_symbol(PatchTag::RBrace)? {
            let key = session.expect_identifier("string key")?.lexeme;
            let value = session.expect_string("string value")?;
            self.document.strings.insert(key.to_ascii_uppercase(), value);
        }
        Ok(())
    }

    fn parse_misc<S: TokenSource<PatchTag>>(
        &mut self,
        session: &mut ParserSession<PatchTag, S>,
    ) -> SyntaxResult<()> {
        session.advance()?;
        session.expect_symbol(PatchTag::LBrace, "'{' after \"misc\"")?;
        while !session.match_symbol(PatchTag::RBrace)? {
            let field = session.expect_identifier("misc field name")?;
            let field_type = misc_field_type(&field.lexeme).ok_or_else(|| {
                reject(
                    PatchError::UnknownField {
                        section: "misc".to_string(),
                        field: field.lexeme.clone(),
                    },
                    field.location.clone(),
                )
            })?;
            let value = self.parse_value(&field, field_type, session)?;
            self.document
                .misc
                .insert(field.lexeme.to_ascii_lowercase(), value);
        }
        Ok(())
    }

    fn parse_value<S: TokenSource<PatchTag>>(
        &mut self,
        field: &Token<PatchTag>,
        field_type: FieldType,
        session: &mut ParserSession<PatchTag, S>,
    ) -> SyntaxResult<FieldValue> {
        let location = session.location();
        let current = session.current();
        let numeric = current.kind == TokenKind::Number
            || current.is_symbol(PatchTag::Plus)
            || current.is_symbol(PatchTag::Minus);
        let string = current.kind.is_string();
        let identifier = current.is_identifier();
        let boolean = if current.is_keyword(PatchTag::True) {
            Some(true)
        } else if current.is_keyword(PatchTag::False) {
            Some(false)
        } else {
            None
        };

        match (field_type, boolean) {
            (FieldType::Integer, _) if numeric => Ok(FieldValue::Integer(session.expect_integer(
                PatchTag::Plus,
                PatchTag::Minus,
                field_type.describe(),
            )?)),
            (FieldType::Fixed, _) if numeric => Ok(FieldValue::Fixed(session.expect_fixed(
                PatchTag::Plus,
                PatchTag::Minus,
                field_type.describe(),
            )?)),
            (FieldType::String, _) if string => {
                Ok(FieldValue::Text(session.expect_string(field_type.describe())?))
            }
            // Bare identifiers name action pointers and sounds
            (FieldType::String, _) if identifier => Ok(FieldValue::Text(session.advance()?.lexeme)),
            (FieldType::Boolean, Some(value)) => {
                session.advance()?;
                Ok(FieldValue::Boolean(value))
            }
            (FieldType::Frame, _) if numeric => {
                let index =
                    session.expect_integer(PatchTag::Plus, PatchTag::Minus, field_type.describe())?;
                self.document
                    .states
                    .check_index(index)
                    .map_err(|error| reject(error, location))?;
                Ok(FieldValue::Frame(index))
            }
            (FieldType::Frame, _) if identifier => {
                let name = session.advance()?.lexeme;
                let index = self
                    .document
                    .states
                    .resolve_name(&name)
                    .map_err(|error| reject(error, location))?;
                Ok(FieldValue::Frame(index))
            }
            _ => Err(reject(
                PatchError::FieldTypeMismatch {
                    field: field.lexeme.clone(),
                    expected: field_type.describe(),
                },
                location,
            )),
        }
    }
}

/// Patch rule violations surface as recoverable syntax errors
fn reject(error: PatchError, location: SourceLocation) -> ParseError {
    log_debug!("Patch rule violated", "code" => error.error_code(), "at" => &location);
    SyntaxError::invalid_value(error.to_string(), location).into()
}

impl Grammar<PatchTag> for PatchGrammar {
    type Output = PatchDocument;

    fn is_top_level(&self, token: &Token<PatchTag>) -> bool {
        [
            PatchTag::Using,
            PatchTag::Thing,
            PatchTag::Weapon,
            PatchTag::Ammo,
            PatchTag::State,
            PatchTag::Strings,
            PatchTag::Misc,
        ]
        .into_iter()
        .any(|tag| token.is_keyword(tag))
    }

    fn is_header(&self, token: &Token<PatchTag>) -> bool {
        token.is_keyword(PatchTag::Using)
    }

    fn parse_header<S: TokenSource<PatchTag>>(
        &mut self,
        session: &mut ParserSession<PatchTag, S>,
    ) -> SyntaxResult<()> {
        session.expect_keyword(PatchTag::Using, "'using'")?;
        let expected = "patch format (doom19, udoom19, boom, mbf, extended)";
        let token = session.expect_identifier(expected)?;
        let format = PatchFormat::from_keyword(&token.lexeme)
            .ok_or_else(|| SyntaxError::unexpected(expected, &token))?;
        self.document = PatchDocument::new(format);
        Ok(())
    }

    fn parse_entry<S: TokenSource<PatchTag>>(
        &mut self,
        session: &mut ParserSession<PatchTag, S>,
    ) -> SyntaxResult<()> {
        let current = session.current();
        if current.is_keyword(PatchTag::Thing) {
            self.parse_object(SlotKind::Thing, session)
        } else if current.is_keyword(PatchTag::Weapon) {
            self.parse_object(SlotKind::Weapon, session)
        } else if current.is_keyword(PatchTag::Ammo) {
            self.parse_object(SlotKind::Ammo, session)
        } else if current.is_keyword(PatchTag::State) {
            self.parse_object(SlotKind::State, session)
        } else if current.is_keyword(PatchTag::Strings) {
            self.parse_strings(session)
        } else if current.is_keyword(PatchTag::Misc) {
            self.parse_misc(session)
        } else {
            Err(session.unexpected("section (thing, weapon, ammo, state, strings, misc)"))
        }
    }

    fn finish(self) -> PatchDocument {
        self.document
    }
}

/// Parse a patch script from any token source
pub fn parse_patch<S: TokenSource<PatchTag>>(
    source: S,
    preferences: &ParserPreferences,
) -> Result<PatchDocument, ParseFailure> {
    parse(PatchGrammar::new(), source, preferences)
}

/// Preprocess and parse `text` with default preferences and the given
/// include resolver
pub fn parse_patch_text(
    stream: &str,
    text: &str,
    resolver: impl IncludeResolver + 'static,
) -> Result<PatchDocument, ParseFailure> {
    parse_patch_text_with(stream, text, resolver, PreprocessorPreferences::default())
}

/// Like [`parse_patch_text`] with explicit preprocessor preferences. The patch
/// grammar is not line-sensitive, so newline tokens are always dropped.
pub fn parse_patch_text_with(
    stream: &str,
    text: &str,
    resolver: impl IncludeResolver + 'static,
    preferences: PreprocessorPreferences,
) -> Result<PatchDocument, ParseFailure> {
    let mut preprocessor = Preprocessor::new(patch_kernel(), stream, text)
        .with_resolver(resolver)
        .with_preferences(preferences);
    preprocessor.set_emit_newlines(false);
    parse_patch(preprocessor, &ParserPreferences::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::{LexerError, Tokenizer};
    use crate::patch::SlotState;
    use crate::preprocess::{MemoryResolver, PreprocessError};
    use crate::syntax::FatalError;
    use assert_matches::assert_matches;

    fn preferences() -> ParserPreferences {
        ParserPreferences {
            max_reported_errors: 100,
            trace_recovery: false,
        }
    }

    fn parse_str(text: &str) -> Result<PatchDocument, ParseFailure> {
        parse_patch(Tokenizer::new(patch_kernel(), "test.dh", text), &preferences())
    }

    fn lines(failure: ParseFailure) -> Vec<String> {
        match failure {
            ParseFailure::Aggregate(aggregate) => aggregate.lines(),
            ParseFailure::Fatal(fatal) => panic!("unexpected fatal error: {}", fatal),
        }
    }

    #[test]
    fn test_full_script() {
        let document = parse_str(
            r#"using boom

thing 3 "Zombieman" {
    health 40
    radius 20.5
    height 56
    seesound "posit1"
    spawnstate 174
}

weapon 2 { ammotype 1 firestate 0x100 }
ammo 0 { max +400 pickup 20 }
state 174 { duration -1 bright true pointer A_Look }

strings {
    GOTARMOR "You got the armor!"
}

misc { initialhealth 200 monstersinfight false }
"#,
        )
        .unwrap();

        assert_eq!(document.format, PatchFormat::Boom);
        let zombie = document.things.get(3).unwrap();
        assert_eq!(zombie.name.as_deref(), Some("Zombieman"));
        assert_eq!(zombie.fields["health"], FieldValue::Integer(40));
        assert_eq!(zombie.fields["radius"], FieldValue::Fixed(20 * 65536 + 32768));
        assert_eq!(zombie.fields["height"], FieldValue::Fixed(56 << 16));
        assert_eq!(zombie.fields["seesound"], FieldValue::Text("posit1".into()));
        assert_eq!(zombie.fields["spawnstate"], FieldValue::Frame(174));

        assert_eq!(
            document.weapons.get(2).unwrap().fields["firestate"],
            FieldValue::Frame(256)
        );
        assert_eq!(document.ammo.get(0).unwrap().fields["max"], FieldValue::Integer(400));

        let state = document.states.get(174).unwrap();
        assert_eq!(state.fields["duration"], FieldValue::Integer(-1));
        assert_eq!(state.fields["bright"], FieldValue::Boolean(true));
        assert_eq!(state.fields["pointer"], FieldValue::Text("A_Look".into()));

        assert_eq!(document.strings["GOTARMOR"], "You got the armor!");
        assert_eq!(document.misc["monstersinfight"], FieldValue::Boolean(false));
        assert_eq!(document.things.slot_state(3), Some(SlotState::Patched));
        assert_eq!(document.things.slot_state(4), Some(SlotState::Vanilla));
        assert_eq!(document.entry_count(), 4);
    }

    #[test]
    fn test_default_format_without_header() {
        let document = parse_str("ammo 1 { pickup 10 }").unwrap();
        assert_eq!(document.format, PatchFormat::Doom19);

        let document = parse(
            PatchGrammar::with_default_format(PatchFormat::Mbf),
            Tokenizer::new(patch_kernel(), "test.dh", "ammo 1 { pickup 10 }"),
            &preferences(),
        )
        .unwrap();
        assert_eq!(document.format, PatchFormat::Mbf);
    }

    #[test]
    fn test_errors_collected_in_order() {
        let failure = parse_str(
            "thing 1 { health \"lots\" }\n\
             thing 2 { speed 8 }\n\
             ammo 9 { max 5 }\n",
        )
        .unwrap_err();
        assert_eq!(
            lines(failure),
            vec![
                "test.dh:1:18: Field \"health\" expects an integer",
                "test.dh:3:6: ammo index 9 is outside 0..=3",
            ]
        );
    }

    #[test]
    fn test_unknown_field_and_recovery() {
        let failure = parse_str("weapon 1 { speed 3 }\nthing }} junk\nammo 2 { max 1 }").unwrap_err();
        let lines = lines(failure);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "test.dh:1:12: Unknown weapon field \"speed\"");
        assert_eq!(lines[1], "test.dh:2:7: Expected thing index, found \"}\"");
    }

    #[test]
    fn test_late_using_is_rejected() {
        let failure = parse_str("ammo 1 { max 2 }\nusing mbf").unwrap_err();
        assert_eq!(
            lines(failure),
            vec!["test.dh:2:1: Header clause must appear before any entry"]
        );
    }

    #[test]
    fn test_unknown_format() {
        let failure = parse_str("using zdoom\nammo 1 { max 2 }").unwrap_err();
        assert_eq!(
            lines(failure),
            vec![
                "test.dh:1:7: Expected patch format (doom19, udoom19, boom, mbf, extended), found \"zdoom\""
            ]
        );
    }

    #[test]
    fn test_symbolic_indices() {
        let document = parse_str(
            "using extended\n\
             state S_GLOW { duration 4 nextstate S_GLOW2 }\n\
             state S_GLOW2 { duration 4 nextstate S_GLOW }\n\
             thing MyBall { spawnstate S_GLOW }\n",
        )
        .unwrap();

        let first = document.states.named("S_GLOW").unwrap();
        let second = document.states.named("s_glow2").unwrap();
        assert_eq!(first, 1089);
        assert_eq!(second, 1090);
        assert_eq!(
            document.states.get(first).unwrap().fields["nextstate"],
            FieldValue::Frame(second)
        );
        let ball = document.things.named("MyBall").unwrap();
        assert_eq!(ball, 151);
        assert_eq!(
            document.things.get(ball).unwrap().fields["spawnstate"],
            FieldValue::Frame(first)
        );
    }

    #[test]
    fn test_symbolic_index_needs_free_slot() {
        let failure = parse_str("thing NewMonster { health 10 }").unwrap_err();
        assert_eq!(
            lines(failure),
            vec!["test.dh:1:7: No free thing slot left for \"NewMonster\""]
        );
    }

    #[test]
    fn test_fixed_point_range() {
        let failure = parse_str("thing 1 { radius 40000 }").unwrap_err();
        assert_eq!(
            lines(failure),
            vec!["test.dh:1:18: Fixed-point value out of range: 40000"]
        );
    }

    #[test]
    fn test_unclosed_entry() {
        let failure = parse_str("thing 1 { health 5").unwrap_err();
        assert_eq!(lines(failure), vec!["test.dh:1:19: Expected '}', found end of input"]);
    }

    #[test]
    fn test_preprocessed_script() {
        let resolver = MemoryResolver::new().with_file(
            "defs.dh",
            "#define ZOMBIE 3\n#define TOUGH 400\n",
        );
        let document = parse_patch_text(
            "main.dh",
            "#include \"defs.dh\"\n\
             #ifdef ZOMBIE\n\
             thing ZOMBIE { health TOUGH }\n\
             #else\n\
             thing 1 { health 1 }\n\
             #endif\n",
            resolver,
        )
        .unwrap();
        assert_eq!(
            document.things.get(3).unwrap().fields["health"],
            FieldValue::Integer(400)
        );
        assert!(document.things.get(1).is_none());
    }

    #[test]
    fn test_newline_preference_does_not_reach_grammar() {
        let preferences = PreprocessorPreferences {
            emit_newlines: true,
            case_insensitive_macros: true,
            trace_directives: false,
            max_expanded_tokens: 1000,
        };
        let document = parse_patch_text_with(
            "m.dh",
            "ammo 1 {\n max 2\n}\n",
            MemoryResolver::new(),
            preferences,
        )
        .unwrap();
        assert_eq!(document.ammo.get(1).unwrap().fields["max"], FieldValue::Integer(2));
    }

    #[test]
    fn test_fatal_errors_stop_parsing() {
        let failure = parse_str("thing 1 { health 5 }\nthing 2 { health \"open").unwrap_err();
        assert_matches!(
            failure,
            ParseFailure::Fatal(FatalError::Lexical(LexerError::UnterminatedString { .. }))
        );

        let failure = parse_patch_text("main.dh", "#include \"missing.dh\"\n", MemoryResolver::new())
            .unwrap_err();
        assert_matches!(
            failure,
            ParseFailure::Fatal(FatalError::Preprocess(PreprocessError::IncludeFailed { .. }))
        );
    }
}
