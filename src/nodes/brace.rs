use std::any::Any;
use std::sync::Arc;

use smol_str::SmolStr;

use super::context::TreePosition;
use super::sequence::{SequenceNode, unwrap_single};
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;
use crate::grammar::{NodeCreator, TermFlags};

/// A value between an open and a close symbol, passed through unchanged.
///
/// When the braces are optional and absent, both symbols are `None`.
#[derive(Debug)]
pub struct BraceNode {
    location: Location,
    open: Option<SmolStr>,
    close: Option<SmolStr>,
    nested: Node,
}

impl BraceNode {
    pub fn from_position(position: TreePosition<'_>) -> Self {
        let (location, mut children) = position.into_parts();
        let bracketed = children.len() == 3
            && children[0].has_flag(TermFlags::OPEN_BRACE)
            && children[2].has_flag(TermFlags::CLOSE_BRACE);

        let (open, close, nested) = if bracketed {
            let open = children[0].term().text().map(SmolStr::new);
            let close = children[2].term().text().map(SmolStr::new);
            let middle = children.swap_remove(1).into_node();
            let nested = middle.unwrap_or_else(|| {
                Box::new(SequenceNode::new(location.clone(), Vec::new())) as Node
            });
            (open, close, nested)
        } else {
            let nodes = children.into_iter().filter_map(|child| child.into_node()).collect();
            let sequence = Box::new(SequenceNode::new(location.clone(), nodes)) as Node;
            (None, None, sequence)
        };

        Self {
            location,
            open,
            close,
            nested: unwrap_single(nested),
        }
    }

    pub(crate) fn creator() -> NodeCreator {
        Arc::new(|position: TreePosition<'_>| Ok(Box::new(BraceNode::from_position(position)) as Node))
    }

    pub fn open(&self) -> Option<&str> {
        self.open.as_deref()
    }

    pub fn close(&self) -> Option<&str> {
        self.close.as_deref()
    }

    pub fn is_bracketed(&self) -> bool {
        self.open.is_some()
    }

    pub fn nested(&self) -> &dyn ValueNode {
        &*self.nested
    }

    pub fn into_nested(self) -> Node {
        self.nested
    }
}

impl ValueNode for BraceNode {
    fn location(&self) -> &Location {
        &self.location
    }

    fn raw_value(&self) -> Option<&dyn Any> {
        self.nested.raw_value()
    }

    fn declared_type(&self) -> DataType {
        self.nested.declared_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
