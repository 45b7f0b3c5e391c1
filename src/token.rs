//! Token definitions shared by the lexer and the parser.
//!
//! A [`Token`] pairs a [`TokenKind`] with a kind-dependent [`TokenValue`]
//! payload, the byte range of the exact source slice it was read from, and
//! the [`Position`] of its first character. The payload types [`CharSet`],
//! [`Repeat`], and [`ItemOption`] are also the building blocks of the AST,
//! so they live here rather than in the lexer.

use crate::error::Position;
use indexmap::IndexSet;
use smartstring::alias::String;
use std::fmt;
use std::ops::{Range, RangeInclusive};

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `// ...` or `/* ... */`; discarded by the parser.
    Comment,
    /// A rule name: `[A-Za-z][A-Za-z0-9_-]*`.
    Identifier,
    /// A single- or double-quoted string.
    Str,
    /// A `[...]` character range.
    CharRange,
    /// `?`, `*`, `+`, or a braced `{N,M}` form.
    Repetition,
    /// `:AST`, `:EOL`, `:INDENT`, or `:OUTDENT`.
    Option,
    /// `^` outside a character range.
    Hat,
    OpenParen,
    CloseParen,
    Bar,
    Comma,
    Equals,
    DoubleEquals,
    SemiColon,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Comment => "a comment",
            TokenKind::Identifier => "an identifier",
            TokenKind::Str => "a string",
            TokenKind::CharRange => "a character range",
            TokenKind::Repetition => "a repetition",
            TokenKind::Option => "an option",
            TokenKind::Hat => "'^'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Bar => "'|'",
            TokenKind::Comma => "','",
            TokenKind::Equals => "'='",
            TokenKind::DoubleEquals => "'=='",
            TokenKind::SemiColon => "';'",
            TokenKind::EndOfInput => "end of input",
        };
        f.write_str(name)
    }
}

/// Control characters that an inverted character range always excludes:
/// the ASCII controls minus tab, CR, and LF.
pub(crate) const EXCLUDED_CONTROLS: [RangeInclusive<u32>; 4] =
    [0x00..=0x08, 0x0B..=0x0C, 0x0E..=0x1F, 0x7F..=0x7F];

/// Iterates the control characters seeded into every inverted range.
pub(crate) fn excluded_controls() -> impl Iterator<Item = char> {
    EXCLUDED_CONTROLS
        .iter()
        .flat_map(|r| r.clone())
        .filter_map(char::from_u32)
}

/// Is `ch` one of the controls an inverted range always excludes?
pub(crate) fn is_excluded_control(ch: char) -> bool {
    EXCLUDED_CONTROLS.iter().any(|r| r.contains(&(ch as u32)))
}

/// The membership set of a `[...]` character range.
///
/// `members` holds the listed codepoints; `inverted` flips the meaning to
/// "every character not listed". An inverted set's members are seeded with
/// the excluded controls at lexing time, so the stored set is exactly the
/// complement of what the range matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    pub inverted: bool,
    pub members: IndexSet<char>,
}

impl CharSet {
    /// Creates an empty set.
    pub fn new(inverted: bool) -> Self {
        Self {
            inverted,
            members: IndexSet::new(),
        }
    }

    /// Creates a set from an iterator of member characters.
    pub fn from_members(inverted: bool, members: impl IntoIterator<Item = char>) -> Self {
        Self {
            inverted,
            members: members.into_iter().collect(),
        }
    }

    /// Does this set match the character `ch`?
    pub fn matches(&self, ch: char) -> bool {
        self.members.contains(&ch) != self.inverted
    }
}

/// Repetition bounds: at least `min` and at most `max` occurrences,
/// `None` meaning unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeat {
    pub min: u32,
    pub max: Option<u32>,
}

impl Repeat {
    /// The default bounds of an item with no repetition attached.
    pub const ONCE: Repeat = Repeat {
        min: 1,
        max: Some(1),
    };

    #[inline]
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Is this the default exactly-once repetition?
    #[inline]
    pub fn is_once(self) -> bool {
        self == Self::ONCE
    }
}

/// A formatting option attached to a list item with `:NAME` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOption {
    /// The item produces an AST node.
    Ast,
    /// Emit an end-of-line after the item.
    Eol,
    /// Increase the indentation level after the item.
    Indent,
    /// Decrease the indentation level after the item.
    Outdent,
}

/// Option words as they appear in source (without the leading `:`).
pub(crate) const OPTION_WORDS: &[(&str, ItemOption)] = &[
    ("AST", ItemOption::Ast),
    ("EOL", ItemOption::Eol),
    ("INDENT", ItemOption::Indent),
    ("OUTDENT", ItemOption::Outdent),
];

impl ItemOption {
    /// Looks up an option by its source word (the part after `:`).
    pub fn from_word(word: &str) -> Option<Self> {
        OPTION_WORDS
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, opt)| *opt)
    }

    /// The canonical spelling, leading `:` included.
    pub fn spelling(self) -> &'static str {
        match self {
            ItemOption::Ast => ":AST",
            ItemOption::Eol => ":EOL",
            ItemOption::Indent => ":INDENT",
            ItemOption::Outdent => ":OUTDENT",
        }
    }
}

impl fmt::Display for ItemOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// The kind-dependent payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// No payload (symbols, end of input).
    None,
    /// Comment body, identifier name, or decoded string value.
    Text(String),
    /// Character range membership.
    CharSet(CharSet),
    /// Repetition bounds.
    Repeat(Repeat),
    /// A single option.
    Option(ItemOption),
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// Byte range of the exact source slice consumed for this token.
    pub span: Range<usize>,
    /// Position of the token's first character.
    pub pos: Position,
}

impl Token {
    /// The exact source slice this token was read from.
    pub fn raw_text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}
