use std::any::{Any, type_name};
use std::sync::Arc;

use smol_str::SmolStr;

use super::context::TreePosition;
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;
use crate::errors::Error;
use crate::grammar::{NodeCreator, TermValue, type_label};

/// One entry of a constant declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant<T> {
    pub text: SmolStr,
    pub value: T,
    /// Key-term name; defaults to `text`.
    pub name: SmolStr,
}

impl<T> Constant<T> {
    pub fn new(text: impl Into<SmolStr>, value: T) -> Self {
        let text = text.into();
        Self {
            name: text.clone(),
            text,
            value,
        }
    }

    pub fn named(text: impl Into<SmolStr>, value: T, name: impl Into<SmolStr>) -> Self {
        Self {
            text: text.into(),
            value,
            name: name.into(),
        }
    }
}

/// Declares an enumerated mapping from literal texts to values.
///
/// ```ignore
/// #[derive(Default)]
/// struct Boolean;
///
/// impl ConstantType for Boolean {
///     type Value = bool;
///
///     fn constants(&self) -> Vec<Constant<bool>> {
///         vec![Constant::new("true", true), Constant::new("false", false)]
///     }
///
///     fn are_keywords(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait ConstantType: Default + Send + Sync + 'static {
    type Value: TermValue;

    fn name(&self) -> SmolStr {
        type_label::<Self>()
    }

    fn constants(&self) -> Vec<Constant<Self::Value>>;

    /// Keywords are reserved and cannot be scanned as identifiers.
    fn are_keywords(&self) -> bool {
        false
    }

    /// Transient constants leave the matched key-term node in the parent.
    fn is_transient(&self) -> bool {
        false
    }
}

/// One matched constant; its value is the entry's value.
#[derive(Debug)]
pub struct ConstantNode<T> {
    location: Location,
    value: T,
}

impl<T: TermValue> ConstantNode<T> {
    pub(crate) fn creator() -> NodeCreator {
        Arc::new(|position: TreePosition<'_>| {
            let (location, children) = position.into_nodes();
            let Some(matched) = children.first() else {
                return Err(Error::invalid_state(format!(
                    "constant `{}` at {location} matched no key term",
                    type_name::<T>()
                )));
            };
            let value = matched.typed_value::<T>()?.clone();
            Ok(Box::new(ConstantNode { location, value }) as Node)
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: TermValue> ValueNode for ConstantNode<T> {
    fn location(&self) -> &Location {
        &self.location
    }

    fn raw_value(&self) -> Option<&dyn Any> {
        Some(&self.value)
    }

    fn declared_type(&self) -> DataType {
        DataType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
