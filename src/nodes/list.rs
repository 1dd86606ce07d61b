use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::slice;
use std::sync::Arc;

use super::context::TreePosition;
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;
use crate::grammar::NodeCreator;

/// Repetition of elements whose value type is `T`.
///
/// Children of any other value type are skipped during initialisation.
pub struct ListNode<T> {
    location: Location,
    children: Vec<Node>,
    _element: PhantomData<fn() -> T>,
}

impl<T: Any> ListNode<T> {
    pub fn new(location: Location, children: Vec<Node>) -> Self {
        let children = children
            .into_iter()
            .filter(|node| node.declared_type().is::<T>())
            .collect();
        Self {
            location,
            children,
            _element: PhantomData,
        }
    }

    pub(crate) fn creator() -> NodeCreator {
        Arc::new(|position: TreePosition<'_>| {
            let (location, children) = position.into_nodes();
            Ok(Box::new(ListNode::<T>::new(location, children)) as Node)
        })
    }

    /// Element count, without reading any element value.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// A fresh iterator over the element values; every call starts over.
    pub fn values(&self) -> ListValues<'_, T> {
        ListValues {
            nodes: self.children.iter(),
            _element: PhantomData,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &dyn ValueNode> {
        self.children.iter().map(|node| &**node)
    }
}

impl<T> fmt::Debug for ListNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListNode")
            .field("location", &self.location)
            .field("children", &self.children)
            .finish()
    }
}

impl<T: Any> ValueNode for ListNode<T> {
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

/// Lazy view of a list's element values.
pub struct ListValues<'a, T> {
    nodes: slice::Iter<'a, Node>,
    _element: PhantomData<fn() -> T>,
}

impl<T> Clone for ListValues<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            _element: PhantomData,
        }
    }
}

impl<'a, T: Any> Iterator for ListValues<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.nodes
            .by_ref()
            .find_map(|node| node.raw_value()?.downcast_ref::<T>())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.nodes.len()))
    }
}
