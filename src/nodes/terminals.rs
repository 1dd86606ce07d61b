//! Terminal value nodes: key terms, identifiers and literals.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use super::context::TreePosition;
use super::value::{DataType, Node, ValueNode};
use crate::base::Location;
use crate::errors::{Error, ParseError};
use crate::grammar::{CaseRestriction, NodeCreator, Precedence, Scanner, TermFlags, TermValue};

// ============================================================================
// KEY TERMS
// ============================================================================

/// One occurrence of an interned key term, carrying its registered value.
#[derive(Debug)]
pub struct KeyTermNode<T> {
    location: Location,
    value: T,
    name: SmolStr,
    text: SmolStr,
    flags: TermFlags,
    precedence: Option<Precedence>,
}

impl<T: TermValue> KeyTermNode<T> {
    pub(crate) fn creator(value: T, precedence: Option<Precedence>) -> NodeCreator {
        Arc::new(move |position: TreePosition<'_>| {
            let term = position.term();
            let node = KeyTermNode {
                name: SmolStr::new(term.name()),
                text: SmolStr::new(term.text().unwrap_or_default()),
                flags: term.flags(),
                precedence,
                value: value.clone(),
                location: position.location().clone(),
            };
            Ok(Box::new(node) as Node)
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flags(&self) -> TermFlags {
        self.flags
    }

    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }
}

impl<T: TermValue> ValueNode for KeyTermNode<T> {
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

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Declares an identifier terminal.
pub trait IdentifierType: Default + Send + Sync + 'static {
    fn name(&self) -> SmolStr {
        SmolStr::new_static("identifier")
    }

    fn case_restriction(&self) -> CaseRestriction {
        CaseRestriction::None
    }
}

/// Identifier terminal without case restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identifier;

impl IdentifierType for Identifier {}

/// One scanned identifier; its value is the identifier text as a `String`.
#[derive(Debug)]
pub struct IdentifierNode {
    location: Location,
    symbol: String,
}

impl IdentifierNode {
    pub fn new(location: Location, symbol: impl Into<String>) -> Self {
        Self {
            location,
            symbol: symbol.into(),
        }
    }

    pub(crate) fn creator() -> NodeCreator {
        Arc::new(|position: TreePosition<'_>| {
            let symbol = position.token_text().unwrap_or_default().to_string();
            Ok(Box::new(IdentifierNode::new(position.location().clone(), symbol)) as Node)
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl ValueNode for IdentifierNode {
    fn location(&self) -> &Location {
        &self.location
    }

    fn raw_value(&self) -> Option<&dyn Any> {
        Some(&self.symbol)
    }

    fn declared_type(&self) -> DataType {
        DataType::of::<String>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ============================================================================
// LITERALS
// ============================================================================

/// Declares a literal terminal: how it is scanned and how the raw token converts.
pub trait LiteralType: Default + Send + Sync + 'static {
    type Value: fmt::Debug + 'static;

    fn name(&self) -> SmolStr;

    fn scanner(&self) -> Scanner;

    /// `None` rejects the token and fails the parse at its location.
    fn try_parse(&self, raw: &str) -> Option<Self::Value>;
}

/// Decimal integers as `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerLiteral;

impl LiteralType for IntegerLiteral {
    type Value = i64;

    fn name(&self) -> SmolStr {
        SmolStr::new_static("integer")
    }

    fn scanner(&self) -> Scanner {
        Scanner::Integer
    }

    fn try_parse(&self, raw: &str) -> Option<i64> {
        raw.parse().ok()
    }
}

/// Decimal numbers with optional fraction and exponent as `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberLiteral;

impl LiteralType for NumberLiteral {
    type Value = f64;

    fn name(&self) -> SmolStr {
        SmolStr::new_static("number")
    }

    fn scanner(&self) -> Scanner {
        Scanner::Number
    }

    fn try_parse(&self, raw: &str) -> Option<f64> {
        raw.parse().ok()
    }
}

/// Double-quoted strings, unescaped, as `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLiteral;

impl LiteralType for StringLiteral {
    type Value = String;

    fn name(&self) -> SmolStr {
        SmolStr::new_static("string")
    }

    fn scanner(&self) -> Scanner {
        Scanner::QuotedString { quote: '"' }
    }

    fn try_parse(&self, raw: &str) -> Option<String> {
        unquote(raw, '"')
    }
}

/// Strip the surrounding `quote`s and resolve `\n`, `\t`, `\r`, `\0` and `\<char>` escapes.
pub fn unquote(raw: &str, quote: char) -> Option<String> {
    let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            other => out.push(other),
        }
    }
    Some(out)
}

/// One converted literal token.
#[derive(Debug)]
pub struct LiteralNode<T> {
    location: Location,
    value: T,
    raw: SmolStr,
}

impl<T: fmt::Debug + 'static> LiteralNode<T> {
    pub fn new(location: Location, value: T, raw: impl Into<SmolStr>) -> Self {
        Self {
            location,
            value,
            raw: raw.into(),
        }
    }

    pub(crate) fn creator<L: LiteralType<Value = T>>(literal: Arc<L>) -> NodeCreator {
        Arc::new(move |position: TreePosition<'_>| {
            let raw = position.token_text().unwrap_or_default();
            match literal.try_parse(raw) {
                Some(value) => {
                    let node = LiteralNode::new(position.location().clone(), value, raw);
                    Ok(Box::new(node) as Node)
                }
                None => Err(Error::from(ParseError::single(
                    position.location().clone(),
                    format!("invalid {} literal `{raw}`", literal.name()),
                ))),
            }
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Token text before conversion.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl<T: fmt::Debug + 'static> ValueNode for LiteralNode<T> {
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
