//! The value-node capability set.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::base::Location;
use crate::errors::{Error, Result};

/// An owned value node.
pub type Node = Box<dyn ValueNode>;

/// Runtime type of the value a node produces.
#[derive(Clone, Copy)]
pub struct DataType {
    id: TypeId,
    name: &'static str,
}

impl DataType {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataType {}

impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One occurrence of a grammar rule in a parsed tree, carrying a typed value.
///
/// Implemented by every node kind. Callers usually go through the inherent
/// methods on `dyn ValueNode` such as `typed_value` and `downcast_ref`.
pub trait ValueNode: Any + fmt::Debug {
    fn location(&self) -> &Location;

    /// The produced value; `None` only for nodes without one, such as an absent optional.
    fn raw_value(&self) -> Option<&dyn Any>;

    /// Type of the produced value.
    fn declared_type(&self) -> DataType;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn ValueNode {
    /// The untyped value; fails with `InvalidState` for nodes without one.
    pub fn value(&self) -> Result<&dyn Any> {
        self.raw_value().ok_or_else(|| {
            Error::invalid_state(format!(
                "node at {} holds no value",
                self.location()
            ))
        })
    }

    pub fn has_value(&self) -> bool {
        self.raw_value().is_some()
    }

    /// The value as a `T`; fails with `TypeMismatch` if it is something else.
    pub fn typed_value<T: Any>(&self) -> Result<&T> {
        self.value()?
            .downcast_ref::<T>()
            .ok_or_else(|| Error::type_mismatch(type_name::<T>(), self.declared_type().name()))
    }

    /// Whether this node is of node kind `N`.
    pub fn is<N: ValueNode>(&self) -> bool {
        self.as_any().is::<N>()
    }

    pub fn downcast_ref<N: ValueNode>(&self) -> Option<&N> {
        self.as_any().downcast_ref::<N>()
    }

    /// Node kind `N` or a `TypeMismatch`.
    pub fn node_as<N: ValueNode>(&self) -> Result<&N> {
        self.downcast_ref::<N>()
            .ok_or_else(|| Error::type_mismatch(type_name::<N>(), self.declared_type().name()))
    }

    /// Take ownership as node kind `N`, handing the node back on mismatch.
    pub fn downcast<N: ValueNode>(self: Box<Self>) -> std::result::Result<Box<N>, Node> {
        if !self.is::<N>() {
            return Err(self);
        }
        match self.into_any().downcast::<N>() {
            Ok(node) => Ok(node),
            Err(_) => unreachable!("node kind checked above"),
        }
    }
}
