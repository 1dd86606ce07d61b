//! Operator declarations and precedence climbing over operator chains.

use std::any::type_name;

use smol_str::SmolStr;

use super::terminals::KeyTermNode;
use super::value::{Node, ValueNode};
use crate::errors::{Error, Result};
use crate::grammar::{Associativity, Precedence, TermValue, type_label};

/// One operator symbol with its binding strength.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator<T> {
    pub text: SmolStr,
    pub value: T,
    /// Key-term name; defaults to `text`.
    pub name: SmolStr,
    pub precedence: Precedence,
}

impl<T> Operator<T> {
    pub fn new(text: impl Into<SmolStr>, value: T, level: i32, associativity: Associativity) -> Self {
        let text = text.into();
        Self {
            name: text.clone(),
            text,
            value,
            precedence: Precedence::new(level, associativity),
        }
    }

    pub fn left(text: impl Into<SmolStr>, value: T, level: i32) -> Self {
        Self::new(text, value, level, Associativity::Left)
    }

    pub fn right(text: impl Into<SmolStr>, value: T, level: i32) -> Self {
        Self::new(text, value, level, Associativity::Right)
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }
}

/// Declares a set of operators.
///
/// Operator rules are transient: the matched [`KeyTermNode`] lands directly
/// in the parent, next to its operands.
pub trait OperatorType: Default + Send + Sync + 'static {
    type Value: TermValue;

    fn name(&self) -> SmolStr {
        type_label::<Self>()
    }

    fn operators(&self) -> Vec<Operator<Self::Value>>;
}

/// Fold a flat `operand (operator operand)*` chain by precedence.
///
/// Operators must be `KeyTermNode<O>`s; those without a precedence bind at
/// level 0, left associative. The fold keeps explicit operand and operator
/// stacks, so chain length never grows the call stack.
pub fn fold_operators<T, O, F, A>(nodes: &[Node], mut operand: F, mut apply: A) -> Result<T>
where
    O: TermValue,
    F: FnMut(&dyn ValueNode) -> Result<T>,
    A: FnMut(T, &O, T) -> Result<T>,
{
    if nodes.len() % 2 == 0 {
        return Err(Error::invalid_state(format!(
            "operator chain needs an odd number of nodes, got {}",
            nodes.len()
        )));
    }
    let mut operands: Vec<T> = Vec::with_capacity(nodes.len() / 2 + 1);
    let mut pending: Vec<(&KeyTermNode<O>, Precedence)> = Vec::with_capacity(nodes.len() / 2);
    for (index, node) in nodes.iter().enumerate() {
        if index % 2 == 0 {
            operands.push(operand(&**node)?);
            continue;
        }
        let operator = node.downcast_ref::<KeyTermNode<O>>().ok_or_else(|| {
            Error::type_mismatch(type_name::<KeyTermNode<O>>(), node.declared_type().name())
        })?;
        let incoming = operator.precedence().unwrap_or(Precedence::left(0));
        while let Some(&(_, top)) = pending.last() {
            let binds_tighter = top.level > incoming.level
                || (top.level == incoming.level && incoming.associativity != Associativity::Right);
            if !binds_tighter {
                break;
            }
            reduce(&mut operands, &mut pending, &mut apply)?;
        }
        pending.push((operator, incoming));
    }
    while !pending.is_empty() {
        reduce(&mut operands, &mut pending, &mut apply)?;
    }
    match (operands.pop(), operands.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(Error::invalid_state("operator chain left unfolded operands")),
    }
}

/// Apply the topmost pending operator to the two topmost operands.
fn reduce<T, O, A>(
    operands: &mut Vec<T>,
    pending: &mut Vec<(&KeyTermNode<O>, Precedence)>,
    apply: &mut A,
) -> Result<()>
where
    O: TermValue,
    A: FnMut(T, &O, T) -> Result<T>,
{
    let (Some((operator, _)), Some(rhs), Some(lhs)) = (pending.pop(), operands.pop(), operands.pop()) else {
        return Err(Error::invalid_state("operator chain is missing an operand"));
    };
    operands.push(apply(lhs, operator.value(), rhs)?);
    Ok(())
}
