//! Inputs handed to node creators and node types.

use std::any::Any;

use smol_str::SmolStr;
use tracing::trace;

use super::value::{Node, ValueNode};
use crate::base::Location;
use crate::errors::{Error, Result};
use crate::grammar::{Term, TermFlags};

/// A child of a tree position, after punctuation and trivia were removed.
#[derive(Debug)]
pub struct ParsedChild<'a> {
    term: &'a Term,
    node: Option<Node>,
}

impl<'a> ParsedChild<'a> {
    pub fn new(term: &'a Term, node: Option<Node>) -> Self {
        Self { term, node }
    }

    pub fn term(&self) -> &'a Term {
        self.term
    }

    pub fn has_flag(&self, flag: TermFlags) -> bool {
        self.term.has_flag(flag)
    }

    /// `None` when the child produced no value node.
    pub fn node(&self) -> Option<&dyn ValueNode> {
        self.node.as_deref()
    }

    pub fn into_node(self) -> Option<Node> {
        self.node
    }
}

/// One position of the concrete tree, with the value nodes of its children.
#[derive(Debug)]
pub struct TreePosition<'a> {
    term: &'a Term,
    location: Location,
    token: Option<SmolStr>,
    children: Vec<ParsedChild<'a>>,
}

impl<'a> TreePosition<'a> {
    pub fn new(
        term: &'a Term,
        location: Location,
        token: Option<SmolStr>,
        children: Vec<ParsedChild<'a>>,
    ) -> Self {
        Self {
            term,
            location,
            token,
            children,
        }
    }

    pub fn term(&self) -> &'a Term {
        self.term
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Matched text of a terminal position.
    pub fn token_text(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn children(&self) -> &[ParsedChild<'a>] {
        &self.children
    }

    pub fn into_parts(self) -> (Location, Vec<ParsedChild<'a>>) {
        (self.location, self.children)
    }

    /// The location and the child nodes, dropping children without a node.
    pub fn into_nodes(self) -> (Location, Vec<Node>) {
        let term = self.term;
        let nodes = self
            .children
            .into_iter()
            .filter_map(|child| {
                if child.node.is_none() {
                    trace!(
                        parent = term.name(),
                        child = child.term.name(),
                        "skipping child without a value node"
                    );
                }
                child.node
            })
            .collect();
        (self.location, nodes)
    }
}

/// Children of one occurrence of a user node type.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    location: &'a Location,
    children: &'a [Node],
}

impl<'a> BuildContext<'a> {
    pub fn new(location: &'a Location, children: &'a [Node]) -> Self {
        Self { location, children }
    }

    pub fn location(&self) -> &'a Location {
        self.location
    }

    pub fn children(&self) -> &'a [Node] {
        self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Result<&'a dyn ValueNode> {
        self.children.get(index).map(|node| &**node).ok_or_else(|| {
            Error::invalid_state(format!(
                "child {index} requested at {} but only {} present",
                self.location,
                self.children.len()
            ))
        })
    }

    /// Typed value of the child at `index`.
    pub fn value<T: Any>(&self, index: usize) -> Result<&'a T> {
        self.child(index)?.typed_value::<T>()
    }

    /// Like [`value`](Self::value), falling back to `otherwise` when the child is missing.
    pub fn value_or<T: Any + Clone>(&self, index: usize, otherwise: T) -> Result<T> {
        match self.children.get(index) {
            Some(node) => node.typed_value::<T>().cloned(),
            None => Ok(otherwise),
        }
    }

    /// Child at `index` as node kind `N`.
    pub fn node<N: ValueNode>(&self, index: usize) -> Result<&'a N> {
        self.child(index)?.node_as::<N>()
    }

    /// First child value of type `T` accepted by `predicate`.
    pub fn find_value<T: Any>(&self, predicate: impl Fn(&T) -> bool) -> Option<&'a T> {
        self.children
            .iter()
            .filter_map(|node| node.raw_value()?.downcast_ref::<T>())
            .find(|value| predicate(value))
    }

    /// Error for this occurrence, reported at its location.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::node(self.location, message)
    }
}
