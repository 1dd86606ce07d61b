//! User-declared node types.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use super::context::{BuildContext, TreePosition};
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;
use crate::errors::Result;
use crate::grammar::{NodeCreator, RuleBuilder, RuleShape, TermId, type_label};

/// A grammar rule that produces a typed value.
///
/// One instance per grammar is created through `Default` and shared by every
/// reference to the type; [`build`](Self::build) runs once per occurrence.
///
/// ```ignore
/// #[derive(Default)]
/// struct Sum;
///
/// impl NodeType for Sum {
///     type Value = i64;
///
///     fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
///         let num = g.literal::<IntegerLiteral>()?;
///         let op = g.operator::<AddSub>()?;
///         Ok(num.clone() + (op + num).star())
///     }
///
///     fn build(&self, ctx: &BuildContext<'_>) -> Result<i64> {
///         fold_operators(ctx.children(), |n| n.typed_value::<i64>().copied(), |a, f: &BinOp, b| Ok(f(a, b)))
///     }
/// }
/// ```
pub trait NodeType: Default + Send + Sync + 'static {
    type Value: fmt::Debug + 'static;

    /// Rule name used in dumps and diagnostics; must be unique per grammar.
    fn name(&self) -> SmolStr {
        type_label::<Self>()
    }

    /// Describe the production. Runs once per grammar, after this type's
    /// placeholder exists, so recursive references resolve to it.
    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape>;

    /// Second pass once the shape is stored on `term`.
    fn post_process(&self, g: &mut RuleBuilder<'_>, term: TermId) -> Result<()> {
        let _ = (g, term);
        Ok(())
    }

    /// Value of one occurrence, from its child nodes.
    fn build(&self, ctx: &BuildContext<'_>) -> Result<Self::Value>;
}

/// One occurrence of node type `N`.
pub struct ParserNode<N: NodeType> {
    location: Location,
    children: Vec<Node>,
    value: N::Value,
}

impl<N: NodeType> ParserNode<N> {
    pub(crate) fn creator(instance: Arc<N>) -> NodeCreator {
        Arc::new(move |position: TreePosition<'_>| {
            let (location, children) = position.into_nodes();
            let value = instance.build(&BuildContext::new(&location, &children))?;
            Ok(Box::new(ParserNode::<N> {
                location,
                children,
                value,
            }) as Node)
        })
    }

    pub fn value(&self) -> &N::Value {
        &self.value
    }

    pub fn into_value(self) -> N::Value {
        self.value
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl<N: NodeType> fmt::Debug for ParserNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserNode")
            .field("type", &type_label::<N>())
            .field("location", &self.location)
            .field("value", &self.value)
            .field("children", &self.children)
            .finish()
    }
}

impl<N: NodeType> ValueNode for ParserNode<N> {
    fn location(&self) -> &Location {
        &self.location
    }

    fn raw_value(&self) -> Option<&dyn Any> {
        Some(&self.value)
    }

    fn declared_type(&self) -> DataType {
        DataType::of::<N::Value>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
