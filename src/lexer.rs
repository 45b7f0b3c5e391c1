//! The tokenizer: a hand-rolled character state machine over an in-memory
//! source string.
//!
//! [`Lexer::try_next`] classifies UTF-8 input into [`Token`]s, skipping the
//! insignificant whitespace between them and tracking 1-based line/column
//! positions across mixed CR/LF/CRLF line endings. Each token records the
//! byte span of the exact source slice it was read from, which is what makes
//! verbatim reconstruction byte-exact later on.
//!
//! The cursor is forward-only. Lookahead is a single peeked character; a
//! character that terminates a token without belonging to it (the first
//! non-identifier character, the `=` that is not part of `==`) is simply
//! never consumed. Every malformed input is a [`LexError`] carrying the
//! position of the offending character; end of input in the middle of a
//! token is always an error.

use crate::error::{LexError, LexErrorKind, Position};
use crate::token::{excluded_controls, CharSet, ItemOption, Repeat, Token, TokenKind, TokenValue};
use smartstring::alias::String;
use std::str::CharIndices;

/// Dash handling inside a `[...]` character range.
///
/// A dash is literal when it is the first content character, the last
/// character before `]`, or when it follows a completed `X-Y` range; any
/// other dash separates the bounds of an inclusive range.
enum RangeState {
    /// Expecting the first content character.
    First,
    /// Holding a character that may turn out to be a range begin.
    Pending(char),
    /// Saw `begin -`; the next character is the range end.
    Dash(char),
    /// Just completed an `X-Y` range.
    AfterRange,
}

/// The tokenizer. Owns a forward-only cursor over the source text.
pub struct Lexer<'src> {
    source: &'src str,
    chars: CharIndices<'src>,
    peeked: Option<(usize, char)>,
    line: usize,
    column: usize,
    last_was_cr: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over `source`, positioned at line 1, column 1.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            peeked: None,
            line: 1,
            column: 1,
            last_was_cr: false,
        }
    }

    /// The source text this lexer reads from.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Reads the next token.
    ///
    /// At end of input this yields a token of kind [`TokenKind::EndOfInput`],
    /// and keeps yielding it if called again.
    pub fn try_next(&mut self) -> Result<Token, LexError> {
        let token = self.scan()?;
        log::trace!(
            "lexed {:?} {:?} at {}",
            token.kind,
            token.raw_text(self.source),
            token.pos
        );
        Ok(token)
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.peeked.take().or_else(|| self.chars.next());
        if let Some((_, ch)) = next {
            match ch {
                '\r' => {
                    self.line += 1;
                    self.column = 1;
                    self.last_was_cr = true;
                }
                // The LF of a CRLF pair; the CR already advanced the line.
                '\n' if self.last_was_cr => {
                    self.last_was_cr = false;
                }
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => {
                    self.last_was_cr = false;
                    self.column += 1;
                }
            }
        }
        next
    }

    /// Position of the next unconsumed character (or just past the last one).
    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Byte offset of the next unconsumed character.
    fn offset(&mut self) -> usize {
        match self.peek() {
            Some((offset, _)) => offset,
            None => self.source.len(),
        }
    }

    fn token(&mut self, kind: TokenKind, value: TokenValue, start: usize, pos: Position) -> Token {
        let end = self.offset();
        Token {
            kind,
            value,
            span: start..end,
            pos,
        }
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        while let Some((_, ' ' | '\t' | '\r' | '\n')) = self.peek() {
            self.bump();
        }

        let pos = self.pos();
        let start = self.offset();
        let Some((_, ch)) = self.bump() else {
            return Ok(self.token(TokenKind::EndOfInput, TokenValue::None, start, pos));
        };

        match ch {
            'A'..='Z' | 'a'..='z' => self.identifier(ch, start, pos),
            '/' => self.comment(start, pos),
            '"' | '\'' => self.string(ch, start, pos),
            '[' => self.char_range(start, pos),
            '{' => self.braced_repetition(start, pos),
            '?' => Ok(self.repetition(Repeat::new(0, Some(1)), start, pos)),
            '*' => Ok(self.repetition(Repeat::new(0, None), start, pos)),
            '+' => Ok(self.repetition(Repeat::new(1, None), start, pos)),
            ':' => self.option(start, pos),
            '(' => Ok(self.token(TokenKind::OpenParen, TokenValue::None, start, pos)),
            ')' => Ok(self.token(TokenKind::CloseParen, TokenValue::None, start, pos)),
            '|' => Ok(self.token(TokenKind::Bar, TokenValue::None, start, pos)),
            ',' => Ok(self.token(TokenKind::Comma, TokenValue::None, start, pos)),
            ';' => Ok(self.token(TokenKind::SemiColon, TokenValue::None, start, pos)),
            '^' => Ok(self.token(TokenKind::Hat, TokenValue::None, start, pos)),
            '=' => {
                if let Some((_, '=')) = self.peek() {
                    self.bump();
                    Ok(self.token(TokenKind::DoubleEquals, TokenValue::None, start, pos))
                } else {
                    Ok(self.token(TokenKind::Equals, TokenValue::None, start, pos))
                }
            }
            _ => Err(LexError::new(LexErrorKind::UnexpectedCharacter(ch), pos)),
        }
    }

    fn repetition(&mut self, repeat: Repeat, start: usize, pos: Position) -> Token {
        self.token(TokenKind::Repetition, TokenValue::Repeat(repeat), start, pos)
    }

    fn identifier(&mut self, first: char, start: usize, pos: Position) -> Result<Token, LexError> {
        let mut name = String::new();
        name.push(first);
        loop {
            match self.peek() {
                Some((_, c)) if c.is_ascii_alphanumeric() || c == '_' || c == '-' => {
                    self.bump();
                    name.push(c);
                }
                Some(_) => break,
                None => {
                    return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, self.pos()));
                }
            }
        }
        Ok(self.token(TokenKind::Identifier, TokenValue::Text(name), start, pos))
    }

    fn comment(&mut self, start: usize, pos: Position) -> Result<Token, LexError> {
        let mut body = String::new();
        let opener_pos = self.pos();
        match self.bump() {
            // Single line: runs to the end of the line. The EOL character is
            // left for the next token.
            Some((_, '/')) => loop {
                match self.peek() {
                    Some((_, '\r' | '\n')) => break,
                    Some((_, c)) => {
                        self.bump();
                        body.push(c);
                    }
                    None => {
                        return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, self.pos()));
                    }
                }
            },
            // Multi line: runs to the first `*/`. A `*` is withheld from the
            // body until it is known not to start the closer.
            Some((_, '*')) => {
                let mut after_star = false;
                loop {
                    match self.bump() {
                        Some((_, '/')) if after_star => break,
                        Some((_, '*')) => {
                            if after_star {
                                body.push('*');
                            }
                            after_star = true;
                        }
                        Some((_, c)) => {
                            if after_star {
                                body.push('*');
                                after_star = false;
                            }
                            body.push(c);
                        }
                        None => {
                            return Err(LexError::new(
                                LexErrorKind::UnexpectedEndOfInput,
                                self.pos(),
                            ));
                        }
                    }
                }
            }
            Some(_) => return Err(LexError::new(LexErrorKind::InvalidComment, opener_pos)),
            None => return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, opener_pos)),
        }
        Ok(self.token(TokenKind::Comment, TokenValue::Text(body), start, pos))
    }

    fn string(&mut self, quote: char, start: usize, pos: Position) -> Result<Token, LexError> {
        let mut value = String::new();
        loop {
            let char_pos = self.pos();
            match self.bump() {
                None => return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, char_pos)),
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => {
                    let escape_pos = self.pos();
                    let Some((_, e)) = self.bump() else {
                        return Err(LexError::new(
                            LexErrorKind::UnexpectedEndOfInput,
                            escape_pos,
                        ));
                    };
                    value.push(match e {
                        '\\' => '\\',
                        't' => '\t',
                        'r' => '\r',
                        'n' => '\n',
                        // Both quote escapes are legal in either quote style.
                        '\'' => '\'',
                        '"' => '"',
                        _ => {
                            return Err(LexError::new(
                                LexErrorKind::InvalidStringEscape,
                                escape_pos,
                            ));
                        }
                    });
                }
                Some((_, c)) => value.push(c),
            }
        }
        Ok(self.token(TokenKind::Str, TokenValue::Text(value), start, pos))
    }

    fn char_range(&mut self, start: usize, pos: Position) -> Result<Token, LexError> {
        let mut set = CharSet::new(false);
        if let Some((_, '^')) = self.peek() {
            self.bump();
            set.inverted = true;
        }

        let mut state = RangeState::First;
        loop {
            let char_pos = self.pos();
            let (ch, escaped) = match self.bump() {
                None => return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, char_pos)),
                Some((_, '\\')) => {
                    let escape_pos = self.pos();
                    let Some((_, e)) = self.bump() else {
                        return Err(LexError::new(
                            LexErrorKind::UnexpectedEndOfInput,
                            escape_pos,
                        ));
                    };
                    let decoded = match e {
                        '\\' => '\\',
                        't' => '\t',
                        'r' => '\r',
                        'n' => '\n',
                        ']' => ']',
                        _ => {
                            return Err(LexError::new(
                                LexErrorKind::InvalidCharacterRangeEscape,
                                escape_pos,
                            ));
                        }
                    };
                    (decoded, true)
                }
                Some((_, c)) => (c, false),
            };
            let closing = ch == ']' && !escaped;

            state = match state {
                RangeState::First => {
                    if closing {
                        if set.inverted {
                            // `[^]` is everything except the seeded controls.
                            break;
                        }
                        return Err(LexError::new(LexErrorKind::CharacterRangeEmpty, char_pos));
                    }
                    RangeState::Pending(ch)
                }
                RangeState::Pending(begin) => {
                    if closing {
                        set.members.insert(begin);
                        break;
                    }
                    if ch == '-' {
                        RangeState::Dash(begin)
                    } else {
                        set.members.insert(begin);
                        RangeState::Pending(ch)
                    }
                }
                RangeState::Dash(begin) => {
                    if closing {
                        // The dash was a literal dash at the end.
                        set.members.insert(begin);
                        set.members.insert('-');
                        break;
                    }
                    if begin > ch {
                        return Err(LexError::new(
                            LexErrorKind::CharacterRangeOutOfOrder,
                            char_pos,
                        ));
                    }
                    for member in begin..=ch {
                        set.members.insert(member);
                    }
                    RangeState::AfterRange
                }
                RangeState::AfterRange => {
                    if closing {
                        break;
                    }
                    RangeState::Pending(ch)
                }
            };
        }

        if set.inverted {
            set.members.extend(excluded_controls());
        }
        Ok(self.token(TokenKind::CharRange, TokenValue::CharSet(set), start, pos))
    }

    fn braced_repetition(&mut self, start: usize, pos: Position) -> Result<Token, LexError> {
        let mut min: Option<u32> = None;
        let mut max: Option<u32> = None;
        let mut reading_max = false;

        loop {
            let char_pos = self.pos();
            match self.bump() {
                None => return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, char_pos)),
                Some((_, c)) if c.is_ascii_digit() => {
                    let digit = c as u32 - '0' as u32;
                    let bound = if reading_max { &mut max } else { &mut min };
                    *bound = match bound
                        .unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(digit))
                    {
                        Some(value) => Some(value),
                        None => {
                            return Err(LexError::new(
                                LexErrorKind::InvalidRepetitionForm,
                                char_pos,
                            ));
                        }
                    };
                }
                Some((_, ',')) if !reading_max => reading_max = true,
                Some((_, '}')) => {
                    let repeat = if reading_max {
                        // `{N,}`, `{,M}`, or `{N,M}`; a bare `{,}` is invalid,
                        // and so is an upper bound of zero or below the lower.
                        if min.is_none() && max.is_none() {
                            return Err(LexError::new(
                                LexErrorKind::InvalidRepetitionForm,
                                char_pos,
                            ));
                        }
                        let n = min.unwrap_or(0);
                        match max {
                            Some(m) if m == 0 || m < n => {
                                return Err(LexError::new(
                                    LexErrorKind::InvalidRepetitionForm,
                                    char_pos,
                                ));
                            }
                            _ => Repeat::new(n, max),
                        }
                    } else {
                        // `{N}` requires N >= 1.
                        match min {
                            Some(n) if n >= 1 => Repeat::new(n, Some(n)),
                            _ => {
                                return Err(LexError::new(
                                    LexErrorKind::InvalidRepetitionForm,
                                    char_pos,
                                ));
                            }
                        }
                    };
                    return Ok(self.repetition(repeat, start, pos));
                }
                Some(_) => {
                    return Err(LexError::new(LexErrorKind::InvalidRepetitionForm, char_pos));
                }
            }
        }
    }

    fn option(&mut self, start: usize, pos: Position) -> Result<Token, LexError> {
        let mut word = String::new();
        loop {
            match self.peek() {
                Some((_, c)) if c.is_ascii_uppercase() => {
                    self.bump();
                    word.push(c);
                }
                Some(_) => break,
                None => {
                    return Err(LexError::new(LexErrorKind::UnexpectedEndOfInput, self.pos()));
                }
            }
        }
        match ItemOption::from_word(&word) {
            Some(option) => Ok(self.token(TokenKind::Option, TokenValue::Option(option), start, pos)),
            None => Err(LexError::new(LexErrorKind::InvalidOption, pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn lex_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.try_next().unwrap();
            let done = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn lex_one(source: &str) -> Token {
        Lexer::new(source).try_next().unwrap()
    }

    fn lex_err(source: &str) -> LexError {
        let mut lexer = Lexer::new(source);
        loop {
            match lexer.try_next() {
                Ok(token) if token.kind == TokenKind::EndOfInput => {
                    panic!("expected a lexical error in {source:?}")
                }
                Ok(_) => {}
                Err(err) => return err,
            }
        }
    }

    fn range_of(token: &Token) -> &CharSet {
        match &token.value {
            TokenValue::CharSet(set) => set,
            other => panic!("expected a char set payload, got {other:?}"),
        }
    }

    #[test]
    fn lexes_identifier_with_digits_underscore_dash() {
        init_logger();
        let token = lex_one("rule_1-a ");
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.value, TokenValue::Text("rule_1-a".into()));
        assert_eq!(token.span, 0..8);
        assert_eq!(token.pos, Position::new(1, 1));
    }

    #[test]
    fn identifier_stops_at_first_non_matching_character() {
        let tokens = lex_all("abc=d;");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Identifier,
                TokenKind::SemiColon,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn identifier_at_hard_end_of_input_is_an_error() {
        let err = lex_err("abc");
        assert_eq!(err.kind, LexErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.position, Position::new(1, 4));
    }

    #[test]
    fn end_of_input_token_repeats() {
        let mut lexer = Lexer::new("  \n");
        assert_eq!(lexer.try_next().unwrap().kind, TokenKind::EndOfInput);
        assert_eq!(lexer.try_next().unwrap().kind, TokenKind::EndOfInput);
    }

    #[test]
    fn positions_track_lf_cr_and_crlf_line_endings() {
        // Each line ending style advances exactly one line.
        let tokens = lex_all("a;\nb;\rc;\r\nd;\n");
        let idents: Vec<(Position, TokenKind)> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| (t.pos, t.kind))
            .collect();
        assert_eq!(idents[0].0, Position::new(1, 1));
        assert_eq!(idents[1].0, Position::new(2, 1));
        assert_eq!(idents[2].0, Position::new(3, 1));
        assert_eq!(idents[3].0, Position::new(4, 1));
    }

    #[test]
    fn position_is_captured_at_first_significant_character() {
        let token = lex_one("   \t name");
        assert_eq!(token.pos, Position::new(1, 6));
    }

    #[test]
    fn lexes_single_line_comment_without_consuming_eol() {
        let mut lexer = Lexer::new("// hello\nx;");
        let comment = lexer.try_next().unwrap();
        assert_eq!(comment.kind, TokenKind::Comment);
        assert_eq!(comment.value, TokenValue::Text(" hello".into()));
        assert_eq!(comment.raw_text(lexer.source()), "// hello");
        let next = lexer.try_next().unwrap();
        assert_eq!(next.kind, TokenKind::Identifier);
        assert_eq!(next.pos, Position::new(2, 1));
    }

    #[test]
    fn lexes_multi_line_comment_with_embedded_stars() {
        let token = lex_one("/* a * b ** c */;");
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(token.value, TokenValue::Text(" a * b ** c ".into()));
    }

    #[test]
    fn slash_not_starting_a_comment_is_invalid() {
        let err = lex_err("/x");
        assert_eq!(err.kind, LexErrorKind::InvalidComment);
        assert_eq!(err.position, Position::new(1, 2));
    }

    #[test]
    fn unterminated_comments_are_errors() {
        assert_eq!(
            lex_err("// no newline").kind,
            LexErrorKind::UnexpectedEndOfInput
        );
        assert_eq!(
            lex_err("/* still open *").kind,
            LexErrorKind::UnexpectedEndOfInput
        );
    }

    #[test]
    fn lexes_strings_with_escapes() {
        let token = lex_one(r"'single \t quoted' ");
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.value, TokenValue::Text("single \t quoted".into()));
        assert_eq!(token.raw_text(r"'single \t quoted' "), r"'single \t quoted'");
    }

    #[test]
    fn either_quote_escape_is_legal_in_either_quote_style() {
        assert_eq!(
            lex_one(r#"'a\'b\"c' "#).value,
            TokenValue::Text(r#"a'b"c"#.into())
        );
        assert_eq!(
            lex_one(r#""a\'b\"c" "#).value,
            TokenValue::Text(r#"a'b"c"#.into())
        );
    }

    #[test]
    fn opposite_quote_may_appear_unescaped() {
        assert_eq!(lex_one(r#"'say "hi"' "#).value, TokenValue::Text(r#"say "hi""#.into()));
        assert_eq!(lex_one(r#""it's" "#).value, TokenValue::Text("it's".into()));
    }

    #[test]
    fn empty_string_is_legal() {
        let token = lex_one("'' ");
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.value, TokenValue::Text("".into()));
    }

    #[test]
    fn invalid_string_escape_is_an_error() {
        let err = lex_err(r"'a\qb' ");
        assert_eq!(err.kind, LexErrorKind::InvalidStringEscape);
        assert_eq!(err.position, Position::new(1, 4));
    }

    #[test]
    fn unterminated_string_errors_past_the_last_character() {
        let err = lex_err("'abc");
        assert_eq!(err.kind, LexErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.position, Position::new(1, 5));
    }

    #[test]
    fn lexes_simple_character_range() {
        let token = lex_one("[A-C] ");
        assert_eq!(token.kind, TokenKind::CharRange);
        let set = range_of(&token);
        assert!(!set.inverted);
        let members: Vec<char> = set.members.iter().copied().collect();
        assert_eq!(members, vec!['A', 'B', 'C']);
    }

    #[test]
    fn inverted_range_is_seeded_with_excluded_controls() {
        let token = lex_one("[^A] ");
        let set = range_of(&token);
        assert!(set.inverted);
        assert!(set.members.contains(&'A'));
        assert!(set.members.contains(&'\u{0}'));
        assert!(set.members.contains(&'\u{7f}'));
        assert!(!set.members.contains(&'\t'));
        assert!(!set.matches('A'));
        assert!(!set.matches('\u{1}'));
        assert!(set.matches('B'));
    }

    #[test]
    fn inverted_empty_range_is_legal() {
        let token = lex_one("[^] ");
        let set = range_of(&token);
        assert!(set.inverted);
        assert_eq!(set.members.len(), excluded_controls().count());
    }

    #[test]
    fn empty_range_is_an_error() {
        let err = lex_err("[] ");
        assert_eq!(err.kind, LexErrorKind::CharacterRangeEmpty);
    }

    #[test]
    fn dash_is_literal_first_last_and_after_a_range() {
        let first = range_of(&lex_one("[-a] ")).members.clone();
        assert!(first.contains(&'-') && first.contains(&'a'));

        let last = range_of(&lex_one("[a-] ")).members.clone();
        assert!(last.contains(&'-') && last.contains(&'a'));

        let after = range_of(&lex_one("[a-c-] ")).members.clone();
        assert!(after.contains(&'-'));
        assert!(after.contains(&'a') && after.contains(&'b') && after.contains(&'c'));
    }

    #[test]
    fn multiple_ranges_and_singles_combine() {
        let set = range_of(&lex_one("[a-cXy-z] ")).members.clone();
        let members: Vec<char> = set.iter().copied().collect();
        assert_eq!(members, vec!['a', 'b', 'c', 'X', 'y', 'z']);
    }

    #[test]
    fn out_of_order_range_is_an_error() {
        let err = lex_err("[c-a] ");
        assert_eq!(err.kind, LexErrorKind::CharacterRangeOutOfOrder);
        assert_eq!(err.position, Position::new(1, 4));
    }

    #[test]
    fn range_escapes_decode_and_escaped_bracket_does_not_close() {
        let set = range_of(&lex_one(r"[\t\]x] ")).members.clone();
        assert!(set.contains(&'\t'));
        assert!(set.contains(&']'));
        assert!(set.contains(&'x'));
    }

    #[test]
    fn invalid_range_escape_is_an_error() {
        let err = lex_err(r"[\q] ");
        assert_eq!(err.kind, LexErrorKind::InvalidCharacterRangeEscape);
    }

    #[test]
    fn shorthand_repetitions_map_to_bounds() {
        for (source, repeat) in [
            ("? ", Repeat::new(0, Some(1))),
            ("* ", Repeat::new(0, None)),
            ("+ ", Repeat::new(1, None)),
        ] {
            let token = lex_one(source);
            assert_eq!(token.kind, TokenKind::Repetition);
            assert_eq!(token.value, TokenValue::Repeat(repeat));
        }
    }

    #[test]
    fn braced_repetitions_map_to_bounds() {
        for (source, repeat) in [
            ("{2,5} ", Repeat::new(2, Some(5))),
            ("{3} ", Repeat::new(3, Some(3))),
            ("{3,} ", Repeat::new(3, None)),
            ("{,4} ", Repeat::new(0, Some(4))),
        ] {
            let token = lex_one(source);
            assert_eq!(token.kind, TokenKind::Repetition);
            assert_eq!(token.value, TokenValue::Repeat(repeat), "source {source:?}");
        }
    }

    #[test]
    fn malformed_repetitions_are_errors() {
        for source in ["{} ", "{,} ", "{0} ", "{0,0} ", "{,0} ", "{2,1} ", "{2x} "] {
            let err = lex_err(source);
            assert_eq!(err.kind, LexErrorKind::InvalidRepetitionForm, "source {source:?}");
        }
    }

    #[test]
    fn repetition_bound_overflow_is_an_error() {
        let err = lex_err("{99999999999} ");
        assert_eq!(err.kind, LexErrorKind::InvalidRepetitionForm);
    }

    #[test]
    fn lexes_options_and_concatenated_options() {
        let token = lex_one(":AST ");
        assert_eq!(token.kind, TokenKind::Option);
        assert_eq!(token.value, TokenValue::Option(ItemOption::Ast));

        let tokens = lex_all(":EOL:INDENT ");
        assert_eq!(tokens[0].value, TokenValue::Option(ItemOption::Eol));
        assert_eq!(tokens[1].value, TokenValue::Option(ItemOption::Indent));
    }

    #[test]
    fn unknown_or_lowercase_option_is_an_error() {
        assert_eq!(lex_err(":NOPE ").kind, LexErrorKind::InvalidOption);
        assert_eq!(lex_err(":ast ").kind, LexErrorKind::InvalidOption);
    }

    #[test]
    fn equals_looks_ahead_for_double_equals() {
        let tokens = lex_all("= == =;");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Equals,
                TokenKind::DoubleEquals,
                TokenKind::Equals,
                TokenKind::SemiColon,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn symbols_map_to_their_kinds() {
        let tokens = lex_all("( ) | , ; ^ ");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::Bar,
                TokenKind::Comma,
                TokenKind::SemiColon,
                TokenKind::Hat,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn unexpected_character_reports_its_position() {
        let err = lex_err("  @");
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('@'));
        assert_eq!(err.position, Position::new(1, 3));
    }

    #[test]
    fn raw_text_round_trips_every_token() {
        let source = "expr = (term '+'):AST | [0-9]{2,5};\n";
        let mut lexer = Lexer::new(source);
        let mut rebuilt = String::new();
        let mut last_end = 0;
        loop {
            let token = lexer.try_next().unwrap();
            if token.kind == TokenKind::EndOfInput {
                break;
            }
            rebuilt.push_str(&source[last_end..token.span.start]);
            rebuilt.push_str(token.raw_text(source));
            last_end = token.span.end;
        }
        rebuilt.push_str(&source[last_end..]);
        assert_eq!(rebuilt, source);
    }
}
