//! Rule-building helpers handed to [`NodeType::rule`].

use std::any::{Any, TypeId};
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::trace;

use super::key_terms::{KeyTerm, TermValue};
use super::registry::GrammarRegistry;
use super::shape::{GrammarHint, Repetition, RuleShape};
use super::terms::{Precedence, Term, TermFlags, TermId, TermKind};
use crate::errors::{Error, Result};
use crate::nodes::{
    BraceNode, ConstantNode, ConstantType, IdentifierNode, IdentifierType, KeyTermNode,
    ListNode, LiteralNode, LiteralType, Node, NodeType, OperatorType, OptionalNode, ParserNode,
    TreePosition,
};

/// Repetition bounds of a list rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ListOptions {
    /// `*` instead of `+`.
    pub allow_empty: bool,
    /// Accept one delimiter after the last element.
    pub allow_trailing: bool,
}

impl ListOptions {
    pub const PLUS: Self = Self {
        allow_empty: false,
        allow_trailing: false,
    };

    pub const STAR: Self = Self {
        allow_empty: true,
        allow_trailing: false,
    };

    pub const fn with_trailing(self) -> Self {
        Self {
            allow_trailing: true,
            ..self
        }
    }
}

/// The grammar under construction, as seen by rule-building callbacks.
pub struct RuleBuilder<'r> {
    registry: &'r mut GrammarRegistry,
}

impl<'r> RuleBuilder<'r> {
    pub(crate) fn new(registry: &'r mut GrammarRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &GrammarRegistry {
        self.registry
    }

    pub fn definition(&self, id: TermId) -> Result<&Term> {
        self.registry
            .get(id)
            .ok_or_else(|| Error::invalid_state(format!("term {} is not registered", id.index())))
    }

    pub fn empty(&self) -> RuleShape {
        RuleShape::Empty
    }

    // ========================================================================
    // NODE TYPES
    // ========================================================================

    /// Reference to node type `N`'s rule.
    pub fn node<N: NodeType>(&mut self) -> Result<RuleShape> {
        self.definition_of::<N>().map(RuleShape::Term)
    }

    /// The one term of node type `N`, registering it on first use.
    ///
    /// The placeholder is stored before `N::rule` runs, so recursive
    /// references from inside the rule resolve to it.
    pub fn definition_of<N: NodeType>(&mut self) -> Result<TermId> {
        if let Some(id) = self.registry.lookup::<N>() {
            return Ok(id);
        }
        let instance = self.registry.singleton::<N>();
        let creator = ParserNode::<N>::creator(Arc::clone(&instance));
        let id = self.register::<N>(Term::placeholder(instance.name()).with_creator(creator))?;
        trace!(node = %instance.name(), term = %id, "registered node type");

        let shape = instance.rule(self)?;
        self.registry.term_mut(id).set_rule(shape);
        instance.post_process(self, id)?;
        Ok(id)
    }

    /// The shared definition instance of `T` within this grammar.
    pub fn instance<T: Default + Send + Sync + 'static>(&mut self) -> Arc<T> {
        self.registry.singleton::<T>()
    }

    // ========================================================================
    // TERMINALS
    // ========================================================================

    pub fn identifier<I: IdentifierType>(&mut self) -> Result<RuleShape> {
        if let Some(id) = self.registry.lookup::<I>() {
            return Ok(id.into());
        }
        let instance = self.registry.singleton::<I>();
        let kind = TermKind::Identifier {
            case: instance.case_restriction(),
        };
        let term = Term::new(instance.name(), kind).with_creator(IdentifierNode::creator());
        self.register::<I>(term).map(RuleShape::Term)
    }

    pub fn literal<L: LiteralType>(&mut self) -> Result<RuleShape> {
        if let Some(id) = self.registry.lookup::<L>() {
            return Ok(id.into());
        }
        let instance = self.registry.singleton::<L>();
        let kind = TermKind::Literal {
            scanner: instance.scanner(),
        };
        let term = Term::new(instance.name(), kind)
            .with_flags(TermFlags::LITERAL)
            .with_creator(LiteralNode::<L::Value>::creator(instance));
        self.register::<L>(term).map(RuleShape::Term)
    }

    /// Choice over the constants of `C`; produces a `ConstantNode` unless transient.
    pub fn constant<C: ConstantType>(&mut self) -> Result<RuleShape> {
        if let Some(id) = self.registry.lookup::<C>() {
            return Ok(id.into());
        }
        let instance = self.registry.singleton::<C>();
        let mut flags = TermFlags::empty();
        flags.set(TermFlags::TRANSIENT, instance.is_transient());
        let term = Term::placeholder(instance.name())
            .with_flags(flags)
            .with_creator(ConstantNode::<C::Value>::creator());
        let id = self.register::<C>(term)?;

        let key_flags = if instance.are_keywords() {
            TermFlags::KEYWORD | TermFlags::RESERVED
        } else {
            TermFlags::empty()
        };
        let mut rule = None;
        for constant in instance.constants() {
            let key = self.intern(&constant.name, &constant.text, constant.value, key_flags, None)?;
            rule = Some(alternative(rule, key));
        }
        self.registry.term_mut(id).set_rule(rule.unwrap_or(RuleShape::Empty));
        Ok(id.into())
    }

    /// Choice over the operators of `O`; always transient.
    pub fn operator<O: OperatorType>(&mut self) -> Result<RuleShape> {
        if let Some(id) = self.registry.lookup::<O>() {
            return Ok(id.into());
        }
        let instance = self.registry.singleton::<O>();
        let term = Term::placeholder(instance.name()).with_flags(TermFlags::TRANSIENT);
        let id = self.register::<O>(term)?;

        let mut rule = None;
        for operator in instance.operators() {
            let key = self.intern(
                &operator.name,
                &operator.text,
                operator.value,
                TermFlags::OPERATOR,
                Some(operator.precedence),
            )?;
            rule = Some(alternative(rule, key));
        }
        self.registry.term_mut(id).set_rule(rule.unwrap_or(RuleShape::Empty));
        Ok(id.into())
    }

    // ========================================================================
    // KEY TERMS
    // ========================================================================

    /// Intern a key term under `name`.
    ///
    /// Registering a name again returns the same term when text, value, flags
    /// and precedence agree, and fails with `RegistrationConflict` otherwise.
    pub fn intern<T: TermValue>(
        &mut self,
        name: &str,
        text: &str,
        value: T,
        flags: TermFlags,
        precedence: Option<Precedence>,
    ) -> Result<TermId> {
        let key_terms = &self.registry.key_terms;
        if let Some(id) = key_terms.lookup(name, text, &value, flags, precedence)? {
            return Ok(id);
        }
        let term = Term::new(name, TermKind::KeyTerm { text: text.into() })
            .with_flags(flags)
            .with_precedence(precedence)
            .with_creator(KeyTermNode::creator(value.clone(), precedence));
        let id = self.registry.push(term)?;
        self.registry.key_terms.insert(KeyTerm {
            name: name.into(),
            text: text.into(),
            value: Arc::new(value),
            flags,
            precedence,
            term: id,
        });
        Ok(id)
    }

    /// Key term valued with its own text.
    pub fn term(&mut self, text: &str) -> Result<RuleShape> {
        self.term_with(text, text.to_string(), None, TermFlags::empty())
    }

    /// Key term with an explicit value; `name` defaults to `text`.
    pub fn term_with<T: TermValue>(
        &mut self,
        text: &str,
        value: T,
        name: Option<&str>,
        flags: TermFlags,
    ) -> Result<RuleShape> {
        self.intern(name.unwrap_or(text), text, value, flags, None)
            .map(RuleShape::Term)
    }

    /// Reserved word valued with its own text.
    pub fn keyword(&mut self, text: &str) -> Result<RuleShape> {
        self.keyword_with(text, text.to_string())
    }

    pub fn keyword_with<T: TermValue>(&mut self, text: &str, value: T) -> Result<RuleShape> {
        self.term_with(text, value, None, TermFlags::KEYWORD | TermFlags::RESERVED)
    }

    /// Symbol that is matched but never appears in value trees.
    pub fn punctuation(&mut self, text: &str) -> Result<RuleShape> {
        self.term_with(text, text.to_string(), None, TermFlags::PUNCTUATION)
    }

    /// Operator symbol valued with its own text.
    pub fn operator_symbol(
        &mut self,
        text: &str,
        precedence: Option<Precedence>,
    ) -> Result<RuleShape> {
        self.operator_with(text, text.to_string(), None, precedence)
    }

    pub fn operator_with<T: TermValue>(
        &mut self,
        text: &str,
        value: T,
        name: Option<&str>,
        precedence: Option<Precedence>,
    ) -> Result<RuleShape> {
        self.intern(name.unwrap_or(text), text, value, TermFlags::OPERATOR, precedence)
            .map(RuleShape::Term)
    }

    // ========================================================================
    // COMPOSITES
    // ========================================================================

    /// `open inside close`, producing a `BraceNode` that passes the inside through.
    ///
    /// With `optional`, the bare `inside` is accepted too.
    pub fn braces(
        &mut self,
        open: &str,
        inside: RuleShape,
        close: &str,
        optional: bool,
    ) -> Result<RuleShape> {
        let key = (SmolStr::new(open), inside.clone(), SmolStr::new(close), optional);
        if let Some(&id) = self.registry.braces.get(&key) {
            return Ok(id.into());
        }
        let open_id = self.intern(open, open, open.to_string(), TermFlags::OPEN_BRACE, None)?;
        let close_id = self.intern(close, close, close.to_string(), TermFlags::CLOSE_BRACE, None)?;
        let grouped = self.group(inside.clone())?;
        let bracketed = RuleShape::Term(open_id) + grouped + RuleShape::Term(close_id);
        let name = format!("{open}{}{close}", self.label(&inside));
        let rule = if optional { bracketed | inside } else { bracketed };
        let term = Term::placeholder(name).with_creator(BraceNode::creator());
        let id = self.define(term, rule)?;
        self.registry.braces.insert(key, id);
        Ok(id.into())
    }

    /// `shape | ε`, producing an `OptionalNode`. One rule per distinct shape.
    pub fn optional(&mut self, shape: RuleShape) -> Result<RuleShape> {
        if let Some(&id) = self.registry.optionals.get(&shape) {
            return Ok(id.into());
        }
        let name = format!("{}?", self.label(&shape));
        let term = Term::placeholder(name).with_creator(OptionalNode::creator());
        let id = self.define(term, shape.clone() | RuleShape::Empty)?;
        self.registry.optionals.insert(shape, id);
        Ok(id.into())
    }

    /// Repetition of `element` producing a `ListNode<T>`.
    ///
    /// Multi-term elements are grouped so each repetition is one child.
    /// Delimiters should be punctuation so they stay out of the list.
    pub fn list<T: Any>(
        &mut self,
        element: RuleShape,
        delimiter: Option<RuleShape>,
        options: ListOptions,
    ) -> Result<RuleShape> {
        let key = (TypeId::of::<T>(), element.clone(), delimiter.clone(), options);
        if let Some(&id) = self.registry.lists.get(&key) {
            return Ok(id.into());
        }
        let item = self.group(element)?;
        let count = if options.allow_empty { '*' } else { '+' };
        let name = format!("{}{count}", self.label(&item));
        let rule = RuleShape::Repeat(Box::new(Repetition {
            item,
            delimiter,
            allow_empty: options.allow_empty,
            allow_trailing: options.allow_trailing,
        }));
        let term = Term::placeholder(name)
            .with_flags(TermFlags::LIST)
            .with_creator(ListNode::<T>::creator());
        let id = self.define(term, rule)?;
        self.registry.lists.insert(key, id);
        Ok(id.into())
    }

    /// Match `shape` without producing any value node.
    pub fn no_ast(&mut self, shape: RuleShape) -> Result<RuleShape> {
        let name = format!("~{}", self.label(&shape));
        let term = Term::placeholder(name).with_flags(TermFlags::NO_AST);
        self.define(term, shape).map(RuleShape::Term)
    }

    /// Rule whose value nodes come from `creator`.
    pub fn custom_node<F>(&mut self, name: &str, shape: RuleShape, creator: F) -> Result<RuleShape>
    where
        F: Fn(TreePosition<'_>) -> Result<Node> + Send + Sync + 'static,
    {
        let term = Term::placeholder(name).with_creator(Arc::new(creator));
        self.define(term, shape).map(RuleShape::Term)
    }

    pub fn set_flag(&mut self, term: TermId, flag: TermFlags, on: bool) -> Result<()> {
        self.registry.try_term_mut(term)?.flags.set(flag, on);
        Ok(())
    }

    // ========================================================================
    // HINTS
    // ========================================================================

    pub fn prefer_shift(&self) -> RuleShape {
        RuleShape::Hint(GrammarHint::PreferShift)
    }

    pub fn prefer_reduce(&self) -> RuleShape {
        RuleShape::Hint(GrammarHint::PreferReduce)
    }

    pub fn precedence_hint(&self, precedence: Precedence) -> RuleShape {
        RuleShape::Hint(GrammarHint::ImpliedPrecedence(precedence))
    }

    pub fn shift_if(&self, symbol: &str, before: &[&str]) -> RuleShape {
        RuleShape::Hint(GrammarHint::ShiftIf {
            symbol: symbol.into(),
            before: before.iter().map(|s| SmolStr::new(s)).collect(),
        })
    }

    pub fn reduce_if(&self, symbol: &str, before: &[&str]) -> RuleShape {
        RuleShape::Hint(GrammarHint::ReduceIf {
            symbol: symbol.into(),
            before: before.iter().map(|s| SmolStr::new(s)).collect(),
        })
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn register<T: 'static>(&mut self, term: Term) -> Result<TermId> {
        self.registry.claim_name::<T>(&term.name)?;
        let id = self.registry.push(term)?;
        self.registry.types.insert(TypeId::of::<T>(), id);
        Ok(id)
    }

    fn define(&mut self, term: Term, rule: RuleShape) -> Result<TermId> {
        let id = self.registry.push(term)?;
        self.registry.term_mut(id).set_rule(rule);
        Ok(id)
    }

    /// One anonymous sequence rule for `shape`, unless it already is a single term.
    fn group(&mut self, shape: RuleShape) -> Result<RuleShape> {
        if shape.as_term().is_some() {
            return Ok(shape);
        }
        if let Some(&id) = self.registry.groups.get(&shape) {
            return Ok(id.into());
        }
        let name = self.label(&shape);
        let id = self.define(Term::placeholder(name), shape.clone())?;
        self.registry.groups.insert(shape, id);
        Ok(id.into())
    }

    fn label(&self, shape: &RuleShape) -> String {
        let shown = shape.display(&self.registry.terms);
        match shape {
            RuleShape::Term(_) | RuleShape::Repeat(_) => shown.to_string(),
            _ => format!("({shown})"),
        }
    }
}

fn alternative(rule: Option<RuleShape>, key: TermId) -> RuleShape {
    match rule {
        None => RuleShape::Term(key),
        Some(rule) => rule | RuleShape::Term(key),
    }
}
