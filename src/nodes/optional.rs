use std::any::Any;
use std::sync::Arc;

use super::context::TreePosition;
use super::sequence::{SequenceNode, unwrap_single};
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;
use crate::errors::{Error, Result};
use crate::grammar::NodeCreator;

/// Zero or one occurrence of a shape.
#[derive(Debug)]
pub struct OptionalNode {
    location: Location,
    value: Option<Node>,
}

impl OptionalNode {
    pub fn new(location: Location, value: Option<Node>) -> Self {
        Self {
            location,
            value: value.map(unwrap_single),
        }
    }

    pub fn absent(location: Location) -> Self {
        Self::new(location, None)
    }

    pub fn from_position(position: TreePosition<'_>) -> Self {
        let (location, mut children) = position.into_parts();
        let value = match children.len() {
            0 => None,
            1 => children.pop().and_then(|child| child.into_node()),
            _ => {
                let nodes = children.into_iter().filter_map(|child| child.into_node()).collect();
                Some(Box::new(SequenceNode::new(location.clone(), nodes)) as Node)
            }
        };
        Self::new(location, value)
    }

    pub(crate) fn creator() -> NodeCreator {
        Arc::new(|position: TreePosition<'_>| {
            Ok(Box::new(OptionalNode::from_position(position)) as Node)
        })
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&dyn ValueNode> {
        self.value.as_deref()
    }

    /// The present value as a `T`; `InvalidState` when absent.
    pub fn typed_value<T: Any>(&self) -> Result<&T> {
        self.present()?.typed_value::<T>()
    }

    /// `f` applied to the present node, or `otherwise`.
    pub fn map_or<U>(&self, otherwise: U, f: impl FnOnce(&dyn ValueNode) -> U) -> U {
        self.value.as_deref().map_or(otherwise, f)
    }

    /// `f` applied to the present node, or the result of `otherwise`.
    pub fn map_or_else<U>(
        &self,
        otherwise: impl FnOnce() -> U,
        f: impl FnOnce(&dyn ValueNode) -> U,
    ) -> U {
        self.value.as_deref().map_or_else(otherwise, f)
    }

    pub fn into_inner(self) -> Option<Node> {
        self.value
    }

    fn present(&self) -> Result<&dyn ValueNode> {
        self.value.as_deref().ok_or_else(|| {
            Error::invalid_state(format!("optional at {} has no value", self.location))
        })
    }
}

impl ValueNode for OptionalNode {
    fn location(&self) -> &Location {
        &self.location
    }

    fn raw_value(&self) -> Option<&dyn Any> {
        self.value.as_deref()?.raw_value()
    }

    fn declared_type(&self) -> DataType {
        self.value
            .as_deref()
            .map_or_else(DataType::of::<()>, |node| node.declared_type())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
