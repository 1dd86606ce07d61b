use std::any::Any;
use std::ops::Index;

use super::context::TreePosition;
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;

/// Value of a rule without a node kind of its own: its child nodes in order.
///
/// A sequence never wraps exactly one other sequence; such a child is
/// replaced by its own children.
#[derive(Debug)]
pub struct SequenceNode {
    location: Location,
    children: Vec<Node>,
}

impl SequenceNode {
    pub fn new(location: Location, mut children: Vec<Node>) -> Self {
        while children.len() == 1 && children[0].is::<SequenceNode>() {
            let Some(only) = children.pop() else { break };
            match only.downcast::<SequenceNode>() {
                Ok(nested) => children = nested.children,
                Err(only) => {
                    children.push(only);
                    break;
                }
            }
        }
        Self { location, children }
    }

    pub fn from_position(position: TreePosition<'_>) -> Self {
        let (location, children) = position.into_nodes();
        Self::new(location, children)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn ValueNode> {
        self.children.get(index).map(|node| &**node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ValueNode> {
        self.children.iter().map(|node| &**node)
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }
}

impl Index<usize> for SequenceNode {
    type Output = dyn ValueNode;

    fn index(&self, index: usize) -> &Self::Output {
        &*self.children[index]
    }
}

impl ValueNode for SequenceNode {
    fn location(&self) -> &Location {
        &self.location
    }

    fn raw_value(&self) -> Option<&dyn Any> {
        Some(&self.children)
    }

    fn declared_type(&self) -> DataType {
        DataType::of::<Vec<Node>>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Unwrap a sequence holding exactly one element to that element.
pub(crate) fn unwrap_single(node: Node) -> Node {
    match node.downcast::<SequenceNode>() {
        Ok(mut sequence) if sequence.children.len() == 1 => match sequence.children.pop() {
            Some(only) => only,
            None => sequence as Node,
        },
        Ok(sequence) => sequence as Node,
        Err(node) => node,
    }
}
