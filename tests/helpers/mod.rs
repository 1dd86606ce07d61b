//! Grammars shared by the integration tests.

#![allow(dead_code)]

pub mod calculator;
pub mod config;

use node_parser::ParseError;
use node_parser::prelude::*;

/// Build a grammar, panicking with the build log on failure.
pub fn built<D: GrammarDefinition + Default>() -> Grammar<D> {
    let mut grammar = Grammar::<D>::default();
    if let Err(err) = grammar.build() {
        panic!("grammar failed to build:\n{err}");
    }
    grammar
}

/// The parse error of a failed result.
pub fn parse_error<T: std::fmt::Debug>(result: Result<T>) -> ParseError {
    match result {
        Err(Error::Parse(err)) => *err,
        other => panic!("expected a parse error, got {other:?}"),
    }
}
