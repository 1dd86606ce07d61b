//! Key-term interning
//!
//! Keywords, punctuation, operators and brace symbols are interned by name so
//! every rule position referring to one name shares one term.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::terms::{Precedence, TermFlags, TermId};
use crate::errors::RegistrationConflict;

/// Values carried by key terms and constants.
pub trait TermValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static> TermValue for T {}

/// Type-erased [`TermValue`] with structural equality.
pub trait KeyValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn KeyValue) -> bool;
    fn type_name(&self) -> &'static str;
}

impl<T: TermValue> KeyValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn KeyValue) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// One interned key term.
#[derive(Debug, Clone)]
pub struct KeyTerm {
    pub name: SmolStr,
    pub text: SmolStr,
    pub value: Arc<dyn KeyValue>,
    pub flags: TermFlags,
    pub precedence: Option<Precedence>,
    pub term: TermId,
}

impl KeyTerm {
    fn matches(
        &self,
        text: &str,
        value: &dyn KeyValue,
        flags: TermFlags,
        precedence: Option<Precedence>,
    ) -> bool {
        self.text == text
            && self.flags == flags
            && self.precedence == precedence
            && self.value.dyn_eq(value)
    }

    pub fn describe(&self) -> String {
        describe(&self.text, self.value.as_ref(), self.flags, self.precedence)
    }
}

fn describe(
    text: &str,
    value: &dyn KeyValue,
    flags: TermFlags,
    precedence: Option<Precedence>,
) -> String {
    let mut out = format!(
        "text {text:?}, value {value:?} ({}), flags {flags:?}",
        value.type_name()
    );
    if let Some(precedence) = precedence {
        out.push_str(&format!(", precedence {precedence}"));
    }
    out
}

/// Key terms of one grammar, in registration order.
#[derive(Debug, Clone, Default)]
pub struct KeyTermRegistry {
    terms: IndexMap<SmolStr, KeyTerm>,
}

impl KeyTermRegistry {
    pub fn get(&self, name: &str) -> Option<&KeyTerm> {
        self.terms.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyTerm> {
        self.terms.values()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The term already interned under `name`, if its attributes agree.
    pub(crate) fn lookup(
        &self,
        name: &str,
        text: &str,
        value: &dyn KeyValue,
        flags: TermFlags,
        precedence: Option<Precedence>,
    ) -> Result<Option<TermId>, RegistrationConflict> {
        let Some(existing) = self.terms.get(name) else {
            return Ok(None);
        };
        if existing.matches(text, value, flags, precedence) {
            Ok(Some(existing.term))
        } else {
            Err(RegistrationConflict {
                name: existing.name.clone(),
                existing: existing.describe(),
                requested: describe(text, value, flags, precedence),
            })
        }
    }

    pub(crate) fn insert(&mut self, key_term: KeyTerm) {
        self.terms.insert(key_term.name.clone(), key_term);
    }

    /// Texts of reserved words, which identifiers may not take.
    pub fn reserved_words(&self) -> impl Iterator<Item = &str> {
        self.terms
            .values()
            .filter(|key_term| key_term.flags.contains(TermFlags::RESERVED))
            .map(|key_term| key_term.text.as_str())
    }
}
