//! Core source-location and error types used in lexical and syntactic
//! analysis.
//!
//! Every error produced by the lexer or the parser carries the 1-based
//! [`Position`] of the offending character or token, so tooling can point at
//! the exact source location. Errors are ordinary values propagated with `?`;
//! nothing in this crate panics on malformed input.

use crate::token::TokenKind;
use thiserror::Error;

/// A 1-based line/column position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number (character position in the line).
    pub column: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// What went wrong while reading a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// End of input inside a token, or directly after a token that needs a
    /// following character to terminate it.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// A character that cannot start any token.
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),

    /// `/` not followed by `/` or `*`.
    #[error("a comment is either // to the end of the line, or all characters between /* and */")]
    InvalidComment,

    /// An escape sequence not valid inside a quoted string.
    #[error("the only valid string escapes are \\\\, \\t, \\r, \\n, \\', and \\\"")]
    InvalidStringEscape,

    /// An escape sequence not valid inside a character range.
    #[error("the only valid character range escapes are \\\\, \\t, \\r, \\n, and \\]")]
    InvalidCharacterRangeEscape,

    /// `[]` with nothing between the brackets (and no inversion).
    #[error("a character range cannot be empty")]
    CharacterRangeEmpty,

    /// `X-Y` where `X` is greater than `Y`.
    #[error("a character range must be in order, with begin character <= end character")]
    CharacterRangeOutOfOrder,

    /// A braced repetition that does not match `{N}`, `{N,}`, `{,M}`, or
    /// `{N,M}` with `N >= 1` in `{N}` and `M >= max(N, 1)` when present.
    #[error("a repetition must be of the form {{N}}, {{N,}}, {{,M}}, or {{N,M}}, with N >= 1 in {{N}} and M >= max(N, 1) when M is present")]
    InvalidRepetitionForm,

    /// `:` followed by anything other than a known option spelling.
    #[error("the only valid options are :AST, :EOL, :INDENT, and :OUTDENT")]
    InvalidOption,
}

/// A lexical error: what went wrong and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl LexError {
    #[inline]
    pub const fn new(kind: LexErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// A structural error raised by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The parser needed one kind of token and found another.
    #[error("expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        /// Human-readable description of what would have been accepted.
        expected: String,
        found: TokenKind,
        position: Position,
    },

    /// Input ended before the rule's closing `;`.
    #[error("rule {name:?} is not terminated by ';' ({position})")]
    UnterminatedRule { name: String, position: Position },

    /// The input contained no rules at all.
    #[error("a grammar must contain at least one rule ({position})")]
    EmptyGrammar { position: Position },
}

impl SyntaxError {
    /// The position the error points at.
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::UnterminatedRule { position, .. }
            | SyntaxError::EmptyGrammar { position } => *position,
        }
    }
}

/// The unified error surface of the crate.
///
/// Both phases abort on their first error; whichever fired is wrapped here,
/// so callers of [`parse`](crate::parse) handle a single type. Conversions
/// are derived with `#[from]`, enabling plain `?` propagation internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GramlexError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl GramlexError {
    /// The position the underlying error points at.
    pub fn position(&self) -> Position {
        match self {
            GramlexError::Lex(e) => e.position,
            GramlexError::Syntax(e) => e.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_error_trait_obj(e: &dyn std::error::Error) -> &dyn std::error::Error {
        e
    }

    #[test]
    fn lex_error_display_includes_position() {
        let err = LexError::new(LexErrorKind::CharacterRangeEmpty, Position::new(3, 7));
        let msg = err.to_string();
        assert!(msg.contains("cannot be empty"));
        assert!(msg.contains("line 3, column 7"));
        let _ = _assert_error_trait_obj(&err);
    }

    #[test]
    fn lex_error_maps_to_gramlex_error() {
        let err: GramlexError =
            LexError::new(LexErrorKind::UnexpectedEndOfInput, Position::new(1, 1)).into();
        assert!(matches!(err, GramlexError::Lex(_)));
        assert_eq!(err.position(), Position::new(1, 1));
    }

    #[test]
    fn syntax_error_maps_to_gramlex_error() {
        let underlying = SyntaxError::UnterminatedRule {
            name: "expr".into(),
            position: Position::new(2, 10),
        };
        let err: GramlexError = underlying.into();
        assert!(matches!(err, GramlexError::Syntax(_)));
        assert!(err.to_string().contains("\"expr\""));
        assert_eq!(err.position(), Position::new(2, 10));
    }

    #[test]
    fn unexpected_token_display_names_both_sides() {
        let err = SyntaxError::UnexpectedToken {
            expected: "';'".into(),
            found: TokenKind::Bar,
            position: Position::new(1, 4),
        };
        let msg = err.to_string();
        assert!(msg.contains("expected ';'"));
        assert!(msg.contains("'|'"));
    }

    // Compile-time trait bounds sanity check.
    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn errors_are_send_sync_static() {
        _assert_send_sync_static::<LexError>();
        _assert_send_sync_static::<SyntaxError>();
        _assert_send_sync_static::<GramlexError>();
    }
}
