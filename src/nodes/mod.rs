//! Value nodes
//!
//! Every position of a parsed tree becomes a value node: a located, typed
//! value built bottom-up from the value nodes of its children.
//!
//! ```text
//! ParserNode<N>   → user node types (NodeType::build)
//! SequenceNode    → rules without a node kind, flattened
//! ListNode<T>     → repetitions of T-valued elements
//! OptionalNode    → zero or one occurrence
//! BraceNode       → bracketed value, transparent
//! ConstantNode<T> → enumerated texts mapped to values
//! KeyTermNode<T>  → one interned symbol (keywords, operators)
//! IdentifierNode  → scanned identifier
//! LiteralNode<T>  → scanned and converted literal
//! ```

mod brace;
mod constant;
mod context;
mod custom;
mod list;
mod operator;
mod optional;
mod sequence;
mod terminals;
mod value;

pub use brace::BraceNode;
pub use constant::{Constant, ConstantNode, ConstantType};
pub use context::{BuildContext, ParsedChild, TreePosition};
pub use custom::{NodeType, ParserNode};
pub use list::{ListNode, ListValues};
pub use operator::{Operator, OperatorType, fold_operators};
pub use optional::OptionalNode;
pub use sequence::SequenceNode;
pub use terminals::{
    Identifier, IdentifierNode, IdentifierType, IntegerLiteral, KeyTermNode, LiteralNode,
    LiteralType, NumberLiteral, StringLiteral, unquote,
};
pub use value::{DataType, Node, ValueNode};

#[cfg(test)]
mod tests;
