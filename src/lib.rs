//! # gramlex
//!
//! A front end for a small EBNF-like grammar-description language. UTF-8
//! source text describing grammar rules is tokenized by a hand-rolled state
//! machine, parsed by an LL(1) recursive-descent parser into an immutable
//! grammar AST, and re-rendered either verbatim (the exact original text) or
//! pretty-printed (a normalized, re-indented form).
//!
//! ## Overview
//!
//! The pipeline is strictly unidirectional: the [`Lexer`] feeds the
//! [`Parser`], which builds a [`Grammar`]; the renderers are pure functions
//! of the result. The parser pulls tokens lazily with a single token of
//! lookahead, and every error — lexical or syntactic — aborts the parse and
//! carries the 1-based line and column of the offending source location.
//!
//! ```rust
//! use gramlex::parse;
//!
//! let source = "digit = [0-9];\nnumber = (digit)+;\n";
//! let grammar = parse(source).unwrap();
//!
//! // Verbatim rendering is the exact original text.
//! assert_eq!(grammar.source_text(), source);
//!
//! // Pretty rendering is computed from the AST alone.
//! assert_eq!(grammar.to_string(), "digit = [0-9];\nnumber = (digit)+;");
//!
//! // Rule references resolve by name, on demand.
//! let number = grammar.find_rule("number").unwrap();
//! let item = &number.expr().items()[0];
//! assert_eq!(item.items()[0].rule_name(), Some("digit"));
//! ```
//!
//! ## Modules
//!
//! - [`lexer`] — the tokenizer (character state machine, position tracking)
//! - [`parser`] — the LL(1) recursive-descent grammar parser
//! - [`ast`] — the immutable grammar AST
//! - [`render`] — the pretty renderer and `Display` implementations
//! - [`token`] — token kinds, payloads, character sets, repetition bounds
//! - [`error`] — positions and the lexical/syntactic error types

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod token;

pub use ast::{
    Expression, ExpressionItem, Grammar, ListItem, ListItemKind, Rule, Terminal, TerminalValue,
};
pub use error::{GramlexError, LexError, LexErrorKind, Position, SyntaxError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{CharSet, ItemOption, Repeat, Token, TokenKind, TokenValue};

/// Parses grammar-description source text into a [`Grammar`].
pub fn parse(source: &str) -> Result<Grammar, GramlexError> {
    Parser::new(source).parse_grammar()
}
