//! The frozen term table of a built grammar.

use std::fmt;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use crate::grammar::{CommentTerminal, KeyTermRegistry, Term, TermId, TermKind, is_word};

/// Everything the engine needs to parse with one grammar. Read-only.
#[derive(Debug)]
pub struct Language {
    name: SmolStr,
    terms: Vec<Term>,
    key_terms: KeyTermRegistry,
    root: TermId,
    comments: Vec<CommentTerminal>,
    reserved: FxHashSet<SmolStr>,
    symbols: Vec<SmolStr>,
}

impl Language {
    pub(crate) fn new(
        name: SmolStr,
        terms: Vec<Term>,
        key_terms: KeyTermRegistry,
        root: TermId,
        comments: Vec<CommentTerminal>,
    ) -> Self {
        let reserved = key_terms.reserved_words().map(SmolStr::new).collect();
        let mut symbols: Vec<SmolStr> = key_terms
            .iter()
            .map(|key_term| key_term.text.clone())
            .filter(|text| !text.is_empty() && !is_word(text))
            .collect();
        symbols.sort();
        symbols.dedup();
        Self {
            name,
            terms,
            key_terms,
            root,
            comments,
            reserved,
            symbols,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> TermId {
        self.root
    }

    /// Term of an id taken from this language's own rule table.
    pub(crate) fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index())
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn key_terms(&self) -> &KeyTermRegistry {
        &self.key_terms
    }

    pub fn comments(&self) -> &[CommentTerminal] {
        &self.comments
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(word)
    }

    /// Texts of key terms that are not word shaped, sorted.
    pub fn symbols(&self) -> &[SmolStr] {
        &self.symbols
    }

    /// Term of a tree kind, if it stands for one.
    pub fn term_of(&self, kind: SyntaxKind) -> Option<&Term> {
        kind.term().and_then(|id| self.terms.get(id.index()))
    }

    /// Display name of a tree kind.
    pub fn kind_name(&self, kind: SyntaxKind) -> &str {
        match self.term_of(kind) {
            Some(term) => term.name(),
            None if kind == SyntaxKind::DOCUMENT => "<document>",
            None => "<trivia>",
        }
    }

    /// Printable rule table.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.terms.get(self.root.index()).map_or("?", Term::name);
        writeln!(f, "grammar `{}` (root: {root})", self.name)?;
        for (index, term) in self.terms.iter().enumerate() {
            write!(f, "  #{index:<4} {} ", term.name())?;
            match term.kind() {
                TermKind::KeyTerm { text } => write!(f, "= {text:?}")?,
                TermKind::Identifier { case } => write!(f, "= <identifier {case:?}>")?,
                TermKind::Literal { scanner } => write!(f, "= <literal {scanner:?}>")?,
                TermKind::NonTerminal { rule: Some(rule) } => {
                    write!(f, "::= {}", rule.display(&self.terms))?
                }
                TermKind::NonTerminal { rule: None } => f.write_str("::= <undefined>")?,
            }
            if !term.flags().is_empty() {
                write!(f, " {:?}", term.flags())?;
            }
            if let Some(precedence) = term.precedence() {
                write!(f, " prec({precedence})")?;
            }
            writeln!(f)?;
        }
        for comment in &self.comments {
            writeln!(
                f,
                "  comment {} {:?} .. {:?}",
                comment.name, comment.start, comment.end
            )?;
        }
        Ok(())
    }
}
