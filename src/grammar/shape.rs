//! Rule-shape algebra
//!
//! A [`RuleShape`] describes what a non-terminal matches in terms of other
//! terms. Shapes compose with `+` (sequence) and `|` (ordered choice):
//!
//! ```text
//! Sum ::= Num { ("+" | "-") Num }*
//!   = num + (plus | minus).then(num).star()
//! ```
//!
//! Nested sequences and choices are spliced into their parent; only terms
//! produce their own tree nodes.

use std::fmt;
use std::ops::{Add, BitOr};

use smol_str::SmolStr;

use super::terms::{Precedence, Term, TermId, TermKind};

/// Grammar description of one production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleShape {
    /// Matches without consuming input.
    Empty,
    Term(TermId),
    Sequence(Vec<RuleShape>),
    /// Alternatives tried in order.
    Choice(Vec<RuleShape>),
    Repeat(Box<Repetition>),
    /// Zero-width hint forwarded to the engine.
    Hint(GrammarHint),
}

/// A repetition of `item`, optionally separated by `delimiter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repetition {
    pub item: RuleShape,
    pub delimiter: Option<RuleShape>,
    pub allow_empty: bool,
    pub allow_trailing: bool,
}

/// Parser-generator hints.
///
/// The combinator engine resolves conflicts by ordered choice, so hints are
/// recorded in the rule dump and otherwise have no effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrammarHint {
    PreferShift,
    PreferReduce,
    ImpliedPrecedence(Precedence),
    /// Prefer shifting when `symbol` is seen before any of `before`.
    ShiftIf { symbol: SmolStr, before: Vec<SmolStr> },
    /// Prefer reducing when `symbol` is seen before any of `before`.
    ReduceIf { symbol: SmolStr, before: Vec<SmolStr> },
}

impl RuleShape {
    /// Zero or more inline repetitions, spliced into the parent.
    pub fn star(self) -> Self {
        Self::Repeat(Box::new(Repetition {
            item: self,
            delimiter: None,
            allow_empty: true,
            allow_trailing: false,
        }))
    }

    /// One or more inline repetitions, spliced into the parent.
    pub fn plus(self) -> Self {
        Self::Repeat(Box::new(Repetition {
            item: self,
            delimiter: None,
            allow_empty: false,
            allow_trailing: false,
        }))
    }

    /// `self | ε`, spliced into the parent.
    pub fn or_empty(self) -> Self {
        self | Self::Empty
    }

    pub fn then(self, next: impl Into<RuleShape>) -> Self {
        self + next.into()
    }

    /// The single term this shape stands for, if it is one.
    pub fn as_term(&self) -> Option<TermId> {
        match self {
            Self::Term(id) => Some(*id),
            _ => None,
        }
    }

    /// Render against the term table that owns the referenced terms.
    pub fn display<'a>(&'a self, terms: &'a [Term]) -> ShapeDisplay<'a> {
        ShapeDisplay {
            shape: self,
            terms,
            nested: false,
        }
    }
}

impl From<TermId> for RuleShape {
    fn from(id: TermId) -> Self {
        Self::Term(id)
    }
}

impl Add for RuleShape {
    type Output = RuleShape;

    fn add(self, rhs: RuleShape) -> RuleShape {
        let mut items = match self {
            RuleShape::Sequence(items) => items,
            RuleShape::Empty => Vec::new(),
            other => vec![other],
        };
        match rhs {
            RuleShape::Sequence(more) => items.extend(more),
            RuleShape::Empty => {}
            other => items.push(other),
        }
        match items.len() {
            0 => RuleShape::Empty,
            1 => items.pop().unwrap_or(RuleShape::Empty),
            _ => RuleShape::Sequence(items),
        }
    }
}

impl BitOr for RuleShape {
    type Output = RuleShape;

    fn bitor(self, rhs: RuleShape) -> RuleShape {
        let mut alternatives = match self {
            RuleShape::Choice(alternatives) => alternatives,
            other => vec![other],
        };
        match rhs {
            RuleShape::Choice(more) => alternatives.extend(more),
            other => alternatives.push(other),
        }
        RuleShape::Choice(alternatives)
    }
}

/// [`Display`](fmt::Display) adapter naming terms through their table.
pub struct ShapeDisplay<'a> {
    shape: &'a RuleShape,
    terms: &'a [Term],
    nested: bool,
}

impl ShapeDisplay<'_> {
    fn child<'b>(&'b self, shape: &'b RuleShape) -> ShapeDisplay<'b> {
        ShapeDisplay {
            shape,
            terms: self.terms,
            nested: true,
        }
    }

    fn term(&self, f: &mut fmt::Formatter<'_>, id: TermId) -> fmt::Result {
        match self.terms.get(id.index()) {
            Some(Term {
                kind: TermKind::KeyTerm { text },
                ..
            }) => write!(f, "{text:?}"),
            Some(term) => f.write_str(&term.name),
            None => write!(f, "{id}"),
        }
    }
}

impl fmt::Display for ShapeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            RuleShape::Empty => f.write_str("<empty>"),
            RuleShape::Term(id) => self.term(f, *id),
            RuleShape::Sequence(items) => {
                if self.nested {
                    f.write_str("(")?;
                }
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", self.child(item))?;
                }
                if self.nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
            RuleShape::Choice(alternatives) => {
                if self.nested {
                    f.write_str("(")?;
                }
                for (index, alternative) in alternatives.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", self.child(alternative))?;
                }
                if self.nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
            RuleShape::Repeat(repetition) => {
                write!(f, "{{{}", self.child(&repetition.item))?;
                if let Some(delimiter) = &repetition.delimiter {
                    write!(f, " / {}", self.child(delimiter))?;
                    if repetition.allow_trailing {
                        f.write_str("?")?;
                    }
                }
                let count = if repetition.allow_empty { '*' } else { '+' };
                write!(f, "}}{count}")
            }
            RuleShape::Hint(hint) => match hint {
                GrammarHint::PreferShift => f.write_str("%prefer-shift"),
                GrammarHint::PreferReduce => f.write_str("%prefer-reduce"),
                GrammarHint::ImpliedPrecedence(precedence) => write!(f, "%prec({precedence})"),
                GrammarHint::ShiftIf { symbol, before } => {
                    write!(f, "%shift-if({symbol:?} < {})", before.join(", "))
                }
                GrammarHint::ReduceIf { symbol, before } => {
                    write!(f, "%reduce-if({symbol:?} < {})", before.join(", "))
                }
            },
        }
    }
}
