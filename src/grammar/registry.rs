//! Per-grammar term arena and type registries.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::builder::{ListOptions, RuleBuilder};
use super::key_terms::KeyTermRegistry;
use super::shape::RuleShape;
use super::terms::{Term, TermId};
use crate::errors::{Error, RegistrationConflict, Result};

/// Short name of a Rust type: its last path segment without generics.
pub fn type_label<T: ?Sized>() -> SmolStr {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    SmolStr::new(base.rsplit("::").next().unwrap_or(base))
}

/// Cache key of a list non-terminal.
pub(crate) type ListKey = (TypeId, RuleShape, Option<RuleShape>, ListOptions);

/// Cache key of a braces non-terminal: open, inside, close, optional.
pub(crate) type BraceKey = (SmolStr, RuleShape, SmolStr, bool);

/// Everything registered while building one grammar.
///
/// Terms live in an arena addressed by [`TermId`]. Node types, identifier,
/// literal, constant and operator declarations map to exactly one term each.
#[derive(Default)]
pub struct GrammarRegistry {
    pub(crate) terms: Vec<Term>,
    pub(crate) key_terms: KeyTermRegistry,
    pub(crate) types: FxHashMap<TypeId, TermId>,
    type_names: FxHashMap<SmolStr, (TypeId, &'static str)>,
    singletons: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    pub(crate) optionals: FxHashMap<RuleShape, TermId>,
    pub(crate) groups: FxHashMap<RuleShape, TermId>,
    pub(crate) lists: FxHashMap<ListKey, TermId>,
    pub(crate) braces: FxHashMap<BraceKey, TermId>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule-building access to this registry.
    pub fn builder(&mut self) -> RuleBuilder<'_> {
        RuleBuilder::new(self)
    }

    /// Term of an id this registry handed out.
    pub(crate) fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index())
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn key_terms(&self) -> &KeyTermRegistry {
        &self.key_terms
    }

    /// Term registered for the Rust type `T`, if any.
    pub fn lookup<T: 'static>(&self) -> Option<TermId> {
        self.types.get(&TypeId::of::<T>()).copied()
    }

    pub(crate) fn term_mut(&mut self, id: TermId) -> &mut Term {
        &mut self.terms[id.index()]
    }

    /// Mutable term of an id that may come from another grammar.
    pub(crate) fn try_term_mut(&mut self, id: TermId) -> Result<&mut Term> {
        self.terms
            .get_mut(id.index())
            .ok_or_else(|| Error::invalid_state(format!("term {} is not registered", id.index())))
    }

    pub(crate) fn push(&mut self, term: Term) -> Result<TermId> {
        let id = TermId::new(self.terms.len()).ok_or_else(|| {
            Error::rule(
                term.name.clone(),
                format!("grammar exceeds {} terms", TermId::LIMIT),
            )
        })?;
        self.terms.push(term);
        Ok(id)
    }

    /// Reserve `name` for the Rust type `T`.
    pub(crate) fn claim_name<T: 'static>(&mut self, name: &SmolStr) -> Result<()> {
        let requested = (TypeId::of::<T>(), type_name::<T>());
        match self.type_names.get(name) {
            Some(existing) if existing.0 != requested.0 => Err(RegistrationConflict {
                name: name.clone(),
                existing: format!("type `{}`", existing.1),
                requested: format!("type `{}`", requested.1),
            }
            .into()),
            Some(_) => Ok(()),
            None => {
                self.type_names.insert(name.clone(), requested);
                Ok(())
            }
        }
    }

    /// The single shared instance of `T` within this grammar.
    pub(crate) fn singleton<T: Default + Send + Sync + 'static>(&mut self) -> Arc<T> {
        let entry = self
            .singletons
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(T::default()) as Arc<dyn Any + Send + Sync>);
        match Arc::clone(entry).downcast::<T>() {
            Ok(instance) => instance,
            Err(_) => unreachable!("singletons are keyed by their own type id"),
        }
    }
}

impl std::fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("terms", &self.terms)
            .field("key_terms", &self.key_terms.len())
            .finish()
    }
}
