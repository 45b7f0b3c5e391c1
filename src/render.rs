//! The pretty renderer: a normalized textual projection of the AST, computed
//! without looking at any node's stored source text.
//!
//! Strings render double-quoted with their escapes re-applied. Character
//! sets render minimally: members are sorted and contiguous runs of three or
//! more codepoints collapse into `X-Y` spans, with a literal `-` member
//! placed first and a `^` member kept away from the first position so the
//! result re-lexes to the same membership. Repetitions render as the
//! shortest equivalent suffix. An expression is joined on one line with
//! `" | "` until it reaches 80 columns, at which point every separator —
//! including the ones already emitted — becomes a newline plus an indented
//! `"| "`.
//!
//! `Display` on every node delegates to its `pretty()` method.

use crate::ast::{Expression, ExpressionItem, Grammar, ListItem, ListItemKind, Rule, Terminal, TerminalValue};
use crate::token::{is_excluded_control, CharSet, Repeat};
use std::fmt;

const SAME_LINE_SEPARATOR: &str = " | ";
const NEXT_LINE_SEPARATOR: &str = "\n    | ";
const MAX_LINE_WIDTH: usize = 80;

impl Terminal {
    /// The normalized text of this terminal.
    pub fn pretty(&self) -> String {
        match self.value() {
            TerminalValue::Str(value) => quote_string(value),
            TerminalValue::Range(set) => render_char_set(set),
        }
    }
}

impl ListItem {
    /// Rule name or terminal text, with each option's canonical spelling
    /// appended without separating spaces.
    pub fn pretty(&self) -> String {
        let mut out = match self.kind() {
            ListItemKind::RuleRef(name) => name.to_string(),
            ListItemKind::Terminal(terminal) => terminal.pretty(),
        };
        for option in self.options() {
            out.push_str(option.spelling());
        }
        out
    }
}

impl ExpressionItem {
    /// Space-separated items; wrapped in parentheses with a repetition
    /// suffix unless the bounds are exactly once.
    pub fn pretty(&self) -> String {
        let body = self
            .items()
            .iter()
            .map(ListItem::pretty)
            .collect::<Vec<_>>()
            .join(" ");
        if self.repeat().is_once() {
            body
        } else {
            format!("({body}){}", repeat_suffix(self.repeat()))
        }
    }
}

impl Expression {
    /// Alternatives joined by `" | "`, or by `"\n    | "` once the one-line
    /// rendering reaches 80 columns. The switch applies to the whole
    /// expression, separators already emitted included.
    pub fn pretty(&self) -> String {
        let rendered: Vec<String> = self.items().iter().map(ExpressionItem::pretty).collect();

        let mut width = 0;
        let mut multiline = false;
        for (i, item) in rendered.iter().enumerate() {
            if i > 0 {
                width += SAME_LINE_SEPARATOR.len();
                if width >= MAX_LINE_WIDTH {
                    multiline = true;
                    break;
                }
            }
            width += item.chars().count();
        }

        let separator = if multiline {
            NEXT_LINE_SEPARATOR
        } else {
            SAME_LINE_SEPARATOR
        };
        rendered.join(separator)
    }
}

impl Rule {
    pub fn pretty(&self) -> String {
        format!("{} = {};", self.name(), self.expr().pretty())
    }
}

impl Grammar {
    /// Each rule's pretty text, one rule per line.
    pub fn pretty(&self) -> String {
        self.rules()
            .iter()
            .map(Rule::pretty)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Minimal `[...]` encoding of a character set.
///
/// An inverted set drops its seeded control members; lexing the result seeds
/// them again, so membership round-trips even though the text may not.
fn render_char_set(set: &CharSet) -> String {
    let mut members: Vec<char> = set
        .members
        .iter()
        .copied()
        .filter(|&ch| !(set.inverted && is_excluded_control(ch)))
        .collect();
    members.sort_unstable();

    let has_dash = members.contains(&'-');
    members.retain(|&ch| ch != '-');

    // A `^` in first content position would read as an inversion marker;
    // emit it last instead, where it is literal.
    let mut trailing_hat = false;
    if !set.inverted && !has_dash && members.first() == Some(&'^') {
        members.remove(0);
        trailing_hat = true;
    }

    let mut out = String::from("[");
    if set.inverted {
        out.push('^');
    }
    if has_dash {
        out.push('-');
    }

    let mut i = 0;
    while i < members.len() {
        let mut j = i;
        while j + 1 < members.len() && members[j + 1] as u32 == members[j] as u32 + 1 {
            j += 1;
        }
        if j - i >= 2 {
            push_range_char(&mut out, members[i]);
            out.push('-');
            push_range_char(&mut out, members[j]);
        } else {
            for &ch in &members[i..=j] {
                push_range_char(&mut out, ch);
            }
        }
        i = j + 1;
    }

    if trailing_hat {
        out.push('^');
    }
    out.push(']');
    out
}

fn push_range_char(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\n' => out.push_str("\\n"),
        ']' => out.push_str("\\]"),
        _ => out.push(ch),
    }
}

fn repeat_suffix(repeat: Repeat) -> String {
    match (repeat.min, repeat.max) {
        (0, Some(1)) => "?".into(),
        (0, None) => "*".into(),
        (1, None) => "+".into(),
        (n, Some(m)) if n == m => format!("{{{n}}}"),
        (n, None) => format!("{{{n},}}"),
        (0, Some(m)) => format!("{{,{m}}}"),
        (n, Some(m)) => format!("{{{n},{m}}}"),
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl fmt::Display for ExpressionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}
