//! The LL(1) recursive-descent parser: tokens in, [`Grammar`] out.
//!
//! The parser drives a [`Lexer`] it owns exclusively, holding one token of
//! lookahead in a peek slot and discarding `Comment` tokens in its pump. One
//! rule is parsed at a time until end of input; the first structural mismatch
//! aborts the whole parse with a [`SyntaxError`] and no partial grammar is
//! ever returned.
//!
//! Grammar, one rule per `;`:
//!
//! ```text
//! grammar    = rule+
//! rule       = Identifier '=' expression ';'
//! expression = expr-item ('|' expr-item)*
//! expr-item  = '(' list ')' Repetition? | list-item Repetition?
//! list       = list-item (','? list-item)*
//! list-item  = (Identifier | terminal) Option*
//! terminal   = (Str | CharRange)+
//! ```
//!
//! A repetition binds to the immediately preceding parenthesized list or
//! single item; a bare item followed by `(` is not implicitly grouped.
//! Adjacent terminals merge into one: strings concatenate, ranges of
//! identical inversion union their members, and any other adjacency is a
//! syntax error. Every node records the byte span from its first to its last
//! token, so its source text is the exact input slice, interior whitespace
//! and comments included.

use crate::ast::{Expression, ExpressionItem, Grammar, ListItem, ListItemKind, Rule, Terminal, TerminalValue};
use crate::error::{GramlexError, SyntaxError};
use crate::lexer::Lexer;
use crate::token::{Repeat, Token, TokenKind, TokenValue};
use smartstring::alias::String;
use std::ops::Range;

/// The grammar parser. Owns the lexer and its single token of lookahead.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    peeked: Option<Token>,
}

impl<'src> Parser<'src> {
    /// Creates a parser over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    /// Parses the whole input into a [`Grammar`].
    ///
    /// Fails with the lexer's or parser's first error; an input with no rules
    /// at all is [`SyntaxError::EmptyGrammar`].
    pub fn parse_grammar(mut self) -> Result<Grammar, GramlexError> {
        let mut rules = Vec::new();
        while self.peek_kind()? != TokenKind::EndOfInput {
            rules.push(self.parse_rule()?);
        }
        if rules.is_empty() {
            let end = self.next_token()?;
            return Err(SyntaxError::EmptyGrammar { position: end.pos }.into());
        }
        Ok(Grammar::new(rules, self.lexer.source()))
    }

    /// Pulls the next non-comment token from the lexer.
    fn pump(&mut self) -> Result<Token, GramlexError> {
        loop {
            let token = self.lexer.try_next()?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, GramlexError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.pump(),
        }
    }

    fn peek_kind(&mut self) -> Result<TokenKind, GramlexError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.pump()?);
        }
        Ok(self
            .peeked
            .as_ref()
            .map_or(TokenKind::EndOfInput, |token| token.kind))
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, GramlexError> {
        let token = self.next_token()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(expected, &token))
        }
    }

    fn slice(&self, span: Range<usize>) -> String {
        self.lexer.source()[span].into()
    }

    fn parse_rule(&mut self) -> Result<Rule, GramlexError> {
        let name_token = self.expect(TokenKind::Identifier, "a rule name")?;
        let mut span = name_token.span.clone();
        let name = match name_token.value {
            TokenValue::Text(name) => name,
            _ => return Err(unexpected("a rule name", &name_token)),
        };

        self.expect(TokenKind::Equals, "'='")?;
        let (expr, _) = self.parse_expression()?;

        let terminator = self.next_token()?;
        match terminator.kind {
            TokenKind::SemiColon => span.end = terminator.span.end,
            TokenKind::EndOfInput => {
                return Err(SyntaxError::UnterminatedRule {
                    name: name.to_string(),
                    position: terminator.pos,
                }
                .into());
            }
            _ => return Err(unexpected("';' or '|'", &terminator)),
        }

        log::debug!("parsed rule {name}");
        Ok(Rule::new(name, expr, self.slice(span)))
    }

    fn parse_expression(&mut self) -> Result<(Expression, Range<usize>), GramlexError> {
        let (first, mut span) = self.parse_expression_item()?;
        let mut items = vec![first];
        while self.peek_kind()? == TokenKind::Bar {
            self.next_token()?;
            let (item, item_span) = self.parse_expression_item()?;
            span.end = item_span.end;
            items.push(item);
        }
        let source_text = self.slice(span.clone());
        Ok((Expression::new(items, source_text), span))
    }

    fn parse_expression_item(&mut self) -> Result<(ExpressionItem, Range<usize>), GramlexError> {
        let (items, mut span) = if self.peek_kind()? == TokenKind::OpenParen {
            let open = self.next_token()?;
            let mut span = open.span;
            let items = self.parse_list()?;
            let close = self.expect(TokenKind::CloseParen, "')'")?;
            span.end = close.span.end;
            (items, span)
        } else {
            let (item, span) = self.parse_list_item()?;
            (vec![item], span)
        };
        let repeat = self.parse_repetition(&mut span)?;
        let source_text = self.slice(span.clone());
        Ok((ExpressionItem::new(items, repeat, source_text), span))
    }

    /// One or more list items inside parentheses, separated by adjacency or
    /// by an explicit `,` (both produce the same list).
    fn parse_list(&mut self) -> Result<Vec<ListItem>, GramlexError> {
        let (first, _) = self.parse_list_item()?;
        let mut items = vec![first];
        loop {
            match self.peek_kind()? {
                TokenKind::Comma => {
                    self.next_token()?;
                    let (item, _) = self.parse_list_item()?;
                    items.push(item);
                }
                TokenKind::Identifier | TokenKind::Str | TokenKind::CharRange => {
                    let (item, _) = self.parse_list_item()?;
                    items.push(item);
                }
                _ => break,
            }
        }
        Ok(items)
    }

    fn parse_list_item(&mut self) -> Result<(ListItem, Range<usize>), GramlexError> {
        let (kind, mut span) = match self.peek_kind()? {
            TokenKind::Identifier => {
                let token = self.next_token()?;
                let span = token.span.clone();
                match token.value {
                    TokenValue::Text(name) => (ListItemKind::RuleRef(name), span),
                    _ => return Err(unexpected("a rule name", &token)),
                }
            }
            TokenKind::Str | TokenKind::CharRange => {
                let (terminal, span) = self.parse_terminal()?;
                (ListItemKind::Terminal(terminal), span)
            }
            _ => {
                let token = self.next_token()?;
                return Err(unexpected(
                    "a rule name, a string, or a character range",
                    &token,
                ));
            }
        };

        let mut options = Vec::new();
        while self.peek_kind()? == TokenKind::Option {
            let token = self.next_token()?;
            match token.value {
                TokenValue::Option(option) => {
                    span.end = token.span.end;
                    options.push(option);
                }
                _ => return Err(unexpected("an option", &token)),
            }
        }

        let source_text = self.slice(span.clone());
        Ok((ListItem::new(kind, options, source_text), span))
    }

    /// One or more adjacent strings or character ranges merged into a single
    /// terminal.
    fn parse_terminal(&mut self) -> Result<(Terminal, Range<usize>), GramlexError> {
        let token = self.next_token()?;
        let mut span = token.span.clone();
        let pos = token.pos;
        let mut value = match (token.kind, token.value) {
            (TokenKind::Str, TokenValue::Text(text)) => TerminalValue::Str(text),
            (TokenKind::CharRange, TokenValue::CharSet(set)) => TerminalValue::Range(set),
            (kind, _) => {
                return Err(SyntaxError::UnexpectedToken {
                    expected: "a string or a character range".into(),
                    found: kind,
                    position: pos,
                }
                .into());
            }
        };

        loop {
            match (&mut value, self.peek_kind()?) {
                (TerminalValue::Str(text), TokenKind::Str) => {
                    let token = self.next_token()?;
                    match token.value {
                        TokenValue::Text(more) => {
                            span.end = token.span.end;
                            text.push_str(&more);
                        }
                        _ => return Err(unexpected("a string", &token)),
                    }
                }
                (TerminalValue::Range(set), TokenKind::CharRange) => {
                    let token = self.next_token()?;
                    match token.value {
                        TokenValue::CharSet(more) if more.inverted == set.inverted => {
                            span.end = token.span.end;
                            set.members.extend(more.members);
                        }
                        _ => {
                            return Err(unexpected(
                                "an adjacent character range with the same inversion",
                                &token,
                            ));
                        }
                    }
                }
                (TerminalValue::Str(_), TokenKind::CharRange) => {
                    let token = self.next_token()?;
                    return Err(unexpected("an adjacent string", &token));
                }
                (TerminalValue::Range(_), TokenKind::Str) => {
                    let token = self.next_token()?;
                    return Err(unexpected("an adjacent character range", &token));
                }
                _ => break,
            }
        }

        let source_text = self.slice(span.clone());
        Ok((Terminal::new(value, source_text), span))
    }

    fn parse_repetition(&mut self, span: &mut Range<usize>) -> Result<Repeat, GramlexError> {
        if self.peek_kind()? != TokenKind::Repetition {
            return Ok(Repeat::ONCE);
        }
        let token = self.next_token()?;
        match token.value {
            TokenValue::Repeat(repeat) => {
                span.end = token.span.end;
                Ok(repeat)
            }
            _ => Err(unexpected("a repetition", &token)),
        }
    }
}

fn unexpected(expected: &str, found: &Token) -> GramlexError {
    SyntaxError::UnexpectedToken {
        expected: expected.into(),
        found: found.kind,
        position: found.pos,
    }
    .into()
}
