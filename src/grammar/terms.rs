//! Term definitions: the entries of a grammar's term arena.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use smol_str::SmolStr;

use super::shape::RuleShape;
use crate::errors::Result;
use crate::nodes::{Node, TreePosition};

/// Stable handle of a term inside one grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(u16);

impl TermId {
    /// Number of raw kinds usable by terms; the rest are reserved for trivia and the document.
    pub const LIMIT: usize = u16::MAX as usize - 1;

    pub(crate) fn new(index: usize) -> Option<Self> {
        (index < Self::LIMIT).then(|| Self(index as u16))
    }

    pub(crate) fn from_raw(raw: u16) -> Option<Self> {
        Self::new(raw as usize)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Marks that change how a term takes part in parsing and value building.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TermFlags(u16);

impl TermFlags {
    /// Children splice into the parent; no tree node of its own.
    pub const TRANSIENT: Self = Self(1 << 0);
    /// Matched but produces no value node.
    pub const NO_AST: Self = Self(1 << 1);
    pub const KEYWORD: Self = Self(1 << 2);
    /// Cannot be scanned as an identifier.
    pub const RESERVED: Self = Self(1 << 3);
    /// Dropped from value trees entirely.
    pub const PUNCTUATION: Self = Self(1 << 4);
    pub const OPERATOR: Self = Self(1 << 5);
    pub const OPEN_BRACE: Self = Self(1 << 6);
    pub const CLOSE_BRACE: Self = Self(1 << 7);
    pub const LITERAL: Self = Self(1 << 8);
    pub const LIST: Self = Self(1 << 9);

    const NAMES: [(Self, &'static str); 10] = [
        (Self::TRANSIENT, "transient"),
        (Self::NO_AST, "no-ast"),
        (Self::KEYWORD, "keyword"),
        (Self::RESERVED, "reserved"),
        (Self::PUNCTUATION, "punctuation"),
        (Self::OPERATOR, "operator"),
        (Self::OPEN_BRACE, "open-brace"),
        (Self::CLOSE_BRACE, "close-brace"),
        (Self::LITERAL, "literal"),
        (Self::LIST, "list"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for TermFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for TermFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for TermFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "[{}]", names.join("|"))
    }
}

/// How operators of equal precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Associativity {
    #[default]
    Left,
    Right,
    /// Not associative; grouped like `Left` when chained.
    Neutral,
}

/// Binding strength of an operator; higher levels bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub level: i32,
    pub associativity: Associativity,
}

impl Precedence {
    pub const fn new(level: i32, associativity: Associativity) -> Self {
        Self {
            level,
            associativity,
        }
    }

    pub const fn left(level: i32) -> Self {
        Self::new(level, Associativity::Left)
    }

    pub const fn right(level: i32) -> Self {
        Self::new(level, Associativity::Right)
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let associativity = match self.associativity {
            Associativity::Left => "left",
            Associativity::Right => "right",
            Associativity::Neutral => "neutral",
        };
        write!(f, "{} {}", self.level, associativity)
    }
}

/// Letter-case rule an identifier must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseRestriction {
    #[default]
    None,
    FirstUpper,
    FirstLower,
    AllUpper,
    AllLower,
}

impl CaseRestriction {
    pub fn admits(self, ident: &str) -> bool {
        let first = ident.chars().next();
        match self {
            Self::None => true,
            Self::FirstUpper => first.is_some_and(char::is_uppercase),
            Self::FirstLower => first.is_some_and(char::is_lowercase),
            Self::AllUpper => !ident.chars().any(char::is_lowercase),
            Self::AllLower => !ident.chars().any(char::is_uppercase),
        }
    }
}

/// Raw token shapes recognised for literal terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scanner {
    /// `[0-9]+`
    Integer,
    /// Digits with optional fraction and exponent.
    Number,
    /// Text between two `quote` characters; `\` escapes the next character.
    QuotedString { quote: char },
}

/// A comment skipped between tokens, like whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentTerminal {
    pub name: SmolStr,
    pub start: SmolStr,
    /// The comment ends at the first of these; line comments end at a line break.
    pub end: Vec<SmolStr>,
}

impl CommentTerminal {
    pub fn line(name: impl Into<SmolStr>, start: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: vec![SmolStr::new_static("\n"), SmolStr::new_static("\r")],
        }
    }

    pub fn block(
        name: impl Into<SmolStr>,
        start: impl Into<SmolStr>,
        end: impl Into<SmolStr>,
    ) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: vec![end.into()],
        }
    }

    /// Line comments stop before the line break instead of consuming it.
    pub fn is_line(&self) -> bool {
        !self.end.is_empty() && self.end.iter().all(|end| end == "\n" || end == "\r" || end == "\r\n")
    }
}

/// Creates the value node of one occurrence of a term.
pub type NodeCreator = Arc<dyn Fn(TreePosition<'_>) -> Result<Node> + Send + Sync>;

/// What a term matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKind {
    /// Fixed text: keywords, punctuation, operators, braces.
    KeyTerm { text: SmolStr },
    Identifier { case: CaseRestriction },
    Literal { scanner: Scanner },
    /// `rule` is `None` while the definition is still a placeholder.
    NonTerminal { rule: Option<RuleShape> },
}

/// One entry of the term arena.
#[derive(Clone)]
pub struct Term {
    pub(crate) name: SmolStr,
    pub(crate) kind: TermKind,
    pub(crate) flags: TermFlags,
    pub(crate) precedence: Option<Precedence>,
    pub(crate) creator: Option<NodeCreator>,
}

impl Term {
    pub(crate) fn new(name: impl Into<SmolStr>, kind: TermKind) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: TermFlags::empty(),
            precedence: None,
            creator: None,
        }
    }

    pub(crate) fn placeholder(name: impl Into<SmolStr>) -> Self {
        Self::new(name, TermKind::NonTerminal { rule: None })
    }

    pub(crate) fn with_flags(mut self, flags: TermFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub(crate) fn with_creator(mut self, creator: NodeCreator) -> Self {
        self.creator = Some(creator);
        self
    }

    pub(crate) fn with_precedence(mut self, precedence: Option<Precedence>) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TermKind {
        &self.kind
    }

    pub fn flags(&self) -> TermFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: TermFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, TermKind::NonTerminal { .. })
    }

    /// Text of a key term.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            TermKind::KeyTerm { text } => Some(text),
            _ => None,
        }
    }

    pub fn rule(&self) -> Option<&RuleShape> {
        match &self.kind {
            TermKind::NonTerminal { rule } => rule.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn set_rule(&mut self, rule: RuleShape) {
        self.kind = TermKind::NonTerminal { rule: Some(rule) };
    }

    pub(crate) fn creator(&self) -> Option<&NodeCreator> {
        self.creator.as_ref()
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("precedence", &self.precedence)
            .field("creator", &self.creator.is_some())
            .finish()
    }
}

/// Whether `text` scans as one identifier-shaped word.
pub fn is_word(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(unicode_ident::is_xid_continue)
}
