//! Syntax kinds for the rowan-based concrete tree
//!
//! Node and token kinds are term ids of the grammar being parsed, plus two
//! reserved kinds for skipped trivia and the document root.

use crate::grammar::TermId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SyntaxKind(u16);

impl SyntaxKind {
    /// Root node wrapping the start rule and trailing trivia.
    pub const DOCUMENT: Self = Self(u16::MAX - 1);
    /// Whitespace and comments.
    pub const TRIVIA: Self = Self(u16::MAX);

    /// The term this kind stands for; `None` for trivia and the document.
    pub fn term(self) -> Option<TermId> {
        TermId::from_raw(self.0)
    }

    pub fn is_trivia(self) -> bool {
        self == Self::TRIVIA
    }
}

impl From<TermId> for SyntaxKind {
    fn from(id: TermId) -> Self {
        Self(id.raw())
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind.0)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        Self(raw.0)
    }
}

/// Language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarLanguage {}

impl rowan::Language for GrammarLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<GrammarLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<GrammarLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<GrammarLanguage>;
