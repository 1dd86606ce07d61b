//! Errors and diagnostics
//!
//! - [`Severity`] / [`Diagnostic`] - Messages reported while building or parsing
//! - [`Error`] - Everything a grammar operation can fail with
//! - [`RegistrationConflict`], [`GrammarBuildError`], [`ParseError`] - Structured payloads

mod diagnostic;
mod error;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{Error, GrammarBuildError, ParseError, RegistrationConflict, Result};

#[cfg(test)]
mod tests;
