//! The grammar AST: immutable value types built by the parser.
//!
//! A [`Grammar`] is an ordered, non-empty sequence of [`Rule`]s; each rule
//! holds an [`Expression`] of `|`-separated [`ExpressionItem`] alternatives,
//! each of which repeats a list of [`ListItem`]s. A list item is either a
//! reference to another rule by name or a [`Terminal`] (a literal string or a
//! character set), with zero or more formatting options attached.
//!
//! Every node carries the exact source slice it was parsed from, available
//! through `source_text()`; this is the verbatim rendering and is byte-exact
//! with the input. Rule references stay name-based — [`Grammar::find_rule`]
//! is the lookup hook for downstream consumers — so the tree has no cycles
//! even when rules refer to each other or to themselves.
//!
//! All fields are private and set once at construction; nodes never change
//! after the parser returns them.

use crate::token::{CharSet, ItemOption, Repeat};
use smartstring::alias::String;

/// The value a terminal matches: a literal string or a character set.
///
/// An empty string denotes the epsilon terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalValue {
    Str(String),
    Range(CharSet),
}

/// A literal string or character set matched directly against input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    value: TerminalValue,
    source_text: String,
}

impl Terminal {
    /// Creates a terminal from its value and original source slice.
    pub fn new(value: TerminalValue, source_text: impl Into<String>) -> Self {
        Self {
            value,
            source_text: source_text.into(),
        }
    }

    pub fn value(&self) -> &TerminalValue {
        &self.value
    }

    /// Is this terminal a character set rather than a literal string?
    pub fn is_range(&self) -> bool {
        matches!(self.value, TerminalValue::Range(_))
    }

    /// The original source slice, covering the one or more concatenated
    /// quoted strings or bracket ranges this terminal was built from.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// What a list item refers to: another rule by name, or a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItemKind {
    RuleRef(String),
    Terminal(Terminal),
}

/// A rule reference or terminal with its attached options.
///
/// Options keep their encounter order; duplicates are legal and each has
/// independent effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    kind: ListItemKind,
    options: Vec<ItemOption>,
    source_text: String,
}

impl ListItem {
    pub fn new(kind: ListItemKind, options: Vec<ItemOption>, source_text: impl Into<String>) -> Self {
        Self {
            kind,
            options,
            source_text: source_text.into(),
        }
    }

    /// Creates a list item referring to the rule named `name`.
    pub fn rule_ref(
        name: impl Into<String>,
        options: Vec<ItemOption>,
        source_text: impl Into<String>,
    ) -> Self {
        Self::new(ListItemKind::RuleRef(name.into()), options, source_text)
    }

    /// Creates a list item holding a terminal.
    pub fn terminal(
        terminal: Terminal,
        options: Vec<ItemOption>,
        source_text: impl Into<String>,
    ) -> Self {
        Self::new(ListItemKind::Terminal(terminal), options, source_text)
    }

    pub fn kind(&self) -> &ListItemKind {
        &self.kind
    }

    /// The referenced rule name, if this item is a rule reference.
    pub fn rule_name(&self) -> Option<&str> {
        match &self.kind {
            ListItemKind::RuleRef(name) => Some(name),
            ListItemKind::Terminal(_) => None,
        }
    }

    /// The terminal, if this item holds one.
    pub fn as_terminal(&self) -> Option<&Terminal> {
        match &self.kind {
            ListItemKind::RuleRef(_) => None,
            ListItemKind::Terminal(terminal) => Some(terminal),
        }
    }

    pub fn options(&self) -> &[ItemOption] {
        &self.options
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// One or more list items subject to a repetition count.
///
/// Invariant: `items` is non-empty, and the bounds satisfy `max >= min` with
/// `max >= 1` when present; the lexer rejects every repetition token that
/// would violate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionItem {
    items: Vec<ListItem>,
    repeat: Repeat,
    source_text: String,
}

impl ExpressionItem {
    pub fn new(items: Vec<ListItem>, repeat: Repeat, source_text: impl Into<String>) -> Self {
        debug_assert!(!items.is_empty());
        Self {
            items,
            repeat,
            source_text: source_text.into(),
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// Ordered `|`-separated alternatives, first match semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    items: Vec<ExpressionItem>,
    source_text: String,
}

impl Expression {
    pub fn new(items: Vec<ExpressionItem>, source_text: impl Into<String>) -> Self {
        debug_assert!(!items.is_empty());
        Self {
            items,
            source_text: source_text.into(),
        }
    }

    pub fn items(&self) -> &[ExpressionItem] {
        &self.items
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// A named production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    expr: Expression,
    source_text: String,
}

impl Rule {
    pub fn new(name: impl Into<String>, expr: Expression, source_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr,
            source_text: source_text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Expression {
        &self.expr
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// The parse result: rules in source order, plus the whole input text.
///
/// Rule-name uniqueness is not enforced; callers that care must check, and
/// [`Grammar::find_rule`] resolves to the first rule with a given name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    source_text: String,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>, source_text: impl Into<String>) -> Self {
        debug_assert!(!rules.is_empty());
        Self {
            rules,
            source_text: source_text.into(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The first rule named `name`, if any.
    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    /// The entire original input.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}
