//! Error types for grammar construction, parsing and value access.

use smol_str::SmolStr;
use thiserror::Error;

use super::diagnostic::Diagnostic;
use crate::base::Location;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by grammar construction, parsing and typed node access.
#[derive(Debug, Error)]
pub enum Error {
    /// A key term or node type was registered twice with different attributes.
    #[error(transparent)]
    RegistrationConflict(Box<RegistrationConflict>),

    /// Grammar compilation reported diagnostics at or above the threshold.
    #[error(transparent)]
    GrammarBuild(Box<GrammarBuildError>),

    /// Parsing reported diagnostics at or above the threshold.
    #[error(transparent)]
    Parse(Box<ParseError>),

    /// An operation was invoked outside its lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A typed accessor was used against a value of another runtime type.
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A rule-building callback failed.
    #[error("invalid rule `{rule}`: {message}")]
    Rule { rule: SmolStr, message: String },

    /// A node type rejected the children of one occurrence.
    #[error("{location}: {message}")]
    Node { location: Location, message: String },
}

impl Error {
    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Create a rule-building error.
    pub fn rule(rule: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create a node construction error.
    pub fn node(location: &Location, message: impl Into<String>) -> Self {
        Self::Node {
            location: location.clone(),
            message: message.into(),
        }
    }
}

impl From<RegistrationConflict> for Error {
    fn from(conflict: RegistrationConflict) -> Self {
        Self::RegistrationConflict(Box::new(conflict))
    }
}

impl From<GrammarBuildError> for Error {
    fn from(error: GrammarBuildError) -> Self {
        Self::GrammarBuild(Box::new(error))
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Self::Parse(Box::new(error))
    }
}

/// Two registrations under one name disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting registrations for `{name}`: {existing} vs {requested}")]
pub struct RegistrationConflict {
    pub name: SmolStr,
    pub existing: String,
    pub requested: String,
}

/// Grammar compilation failed.
#[derive(Debug, Clone, Error)]
#[error("failed to build grammar `{grammar}`:\n{log}\n{dump}")]
pub struct GrammarBuildError {
    pub grammar: SmolStr,
    pub diagnostics: Vec<Diagnostic>,
    /// One `[Severity] message` line per diagnostic.
    pub log: String,
    /// Printable rule table of the rejected grammar.
    pub dump: String,
}

impl GrammarBuildError {
    pub fn new(grammar: impl Into<SmolStr>, diagnostics: Vec<Diagnostic>, dump: String) -> Self {
        Self {
            grammar: grammar.into(),
            log: Diagnostic::render_log(&diagnostics),
            diagnostics,
            dump,
        }
    }
}

/// Parsing one source failed.
#[derive(Debug, Clone, Error)]
#[error("failed to parse {location}:\n{log}")]
pub struct ParseError {
    /// Location of the most severe diagnostic.
    pub location: Location,
    pub diagnostics: Vec<Diagnostic>,
    /// One `[Severity@line:col] message` line per diagnostic.
    pub log: String,
}

impl ParseError {
    /// Aggregate `diagnostics`; `fallback` is used when none carries a location.
    pub fn new(diagnostics: Vec<Diagnostic>, fallback: Location) -> Self {
        let location = Diagnostic::most_severe(&diagnostics)
            .and_then(|d| d.location.clone())
            .unwrap_or(fallback);
        Self {
            location,
            log: Diagnostic::render_log(&diagnostics),
            diagnostics,
        }
    }

    /// A parse error made of one located error message.
    pub fn single(location: Location, message: impl Into<String>) -> Self {
        let diagnostic = Diagnostic::error(message).at(location.clone());
        Self::new(vec![diagnostic], location)
    }
}
