//! Value trees from concrete trees.

use std::sync::Arc;

use rowan::NodeOrToken;

use crate::base::{LineIndex, Location, TextSize};
use crate::engine::{Language, MAX_NESTING, SyntaxKind, SyntaxNode, SyntaxToken};
use crate::errors::{Error, ParseError, Result};
use crate::grammar::{Term, TermFlags};
use crate::nodes::{Node, ParsedChild, SequenceNode, TreePosition};

/// Walks a concrete tree bottom-up, creating one value node per position.
///
/// Every location created by one builder names the same source.
pub(crate) struct ValueBuilder<'a> {
    language: &'a Language,
    index: &'a LineIndex,
    source: Arc<str>,
}

impl<'a> ValueBuilder<'a> {
    pub(crate) fn new(language: &'a Language, index: &'a LineIndex, source: Arc<str>) -> Self {
        Self {
            language,
            index,
            source,
        }
    }

    /// Value of the root rule below a document node.
    pub(crate) fn document(&self, document: &SyntaxNode) -> Result<Option<Node>> {
        match document.children().next() {
            Some(root) => self.node(&root, 0),
            None => Err(Error::invalid_state("document has no root rule")),
        }
    }

    fn node(&self, node: &SyntaxNode, depth: usize) -> Result<Option<Node>> {
        let term = self.term(node.kind())?;
        if term.has_flag(TermFlags::NO_AST) {
            return Ok(None);
        }
        if depth > MAX_NESTING {
            let message = format!("input nests deeper than {MAX_NESTING} rules");
            return Err(ParseError::single(self.location_of(node), message).into());
        }
        let mut children = Vec::new();
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Token(token) if token.kind().is_trivia() => {}
                NodeOrToken::Token(token) => {
                    let child = self.term(token.kind())?;
                    children.push(ParsedChild::new(child, self.token(child, &token)?));
                }
                NodeOrToken::Node(inner) => {
                    let child = self.term(inner.kind())?;
                    children.push(ParsedChild::new(child, self.node(&inner, depth + 1)?));
                }
            }
        }
        let position = TreePosition::new(term, self.location_of(node), None, children);
        match term.creator() {
            Some(create) => create(position).map(Some),
            None => Ok(Some(Box::new(SequenceNode::from_position(position)) as Node)),
        }
    }

    fn token(&self, term: &'a Term, token: &SyntaxToken) -> Result<Option<Node>> {
        if term.has_flag(TermFlags::PUNCTUATION) || term.has_flag(TermFlags::NO_AST) {
            return Ok(None);
        }
        let Some(create) = term.creator() else {
            return Ok(None);
        };
        let location = self.location(token.text_range().start());
        create(TreePosition::new(term, location, Some(token.text().into()), Vec::new())).map(Some)
    }

    fn term(&self, kind: SyntaxKind) -> Result<&'a Term> {
        self.language.term_of(kind).ok_or_else(|| {
            Error::invalid_state(format!(
                "tree kind {kind:?} is not a term of `{}`",
                self.language.name()
            ))
        })
    }

    /// Start of the first token that is not trivia; empty rules sit at their end.
    fn location_of(&self, node: &SyntaxNode) -> Location {
        let offset = node
            .descendants_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|token| !token.kind().is_trivia())
            .map_or_else(|| node.text_range().end(), |token| token.text_range().start());
        self.location(offset)
    }

    fn location(&self, offset: TextSize) -> Location {
        Location::resolve(self.index, offset, &self.source)
    }
}
