//! Engine adapter: chumsky combinators over a frozen term table, recorded as
//! a lossless rowan tree.
//!
//! ```text
//! GrammarRegistry ──compile──▶ Language ──parse──▶ Parse { green, errors }
//!                      │                               │
//!                 diagnostics                     SyntaxNode tree
//! ```

mod analysis;
mod combinators;
mod language;
mod printer;
mod syntax_kind;


use chumsky::Parser as _;
use rowan::GreenNode;
use smol_str::SmolStr;
use tracing::debug;

pub use combinators::MAX_NESTING;
pub use language::Language;
pub use printer::TreeDisplay;
pub use syntax_kind::{GrammarLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

use crate::base::TextRange;
use crate::errors::Diagnostic;
use crate::grammar::{CommentTerminal, GrammarRegistry, TermId};
use combinators::{ParserBuilder, SourceText};

/// The result of running a language over one input.
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: Option<GreenNode>,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Root of the concrete tree, when the input matched.
    pub fn syntax(&self) -> Option<SyntaxNode> {
        self.green.clone().map(SyntaxNode::new_root)
    }

    pub fn ok(&self) -> bool {
        self.green.is_some() && self.errors.is_empty()
    }
}

/// A syntax error reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Freeze a registry into a [`Language`] and check it.
///
/// The language is returned even when diagnostics were produced; callers
/// decide which severities are fatal.
pub fn compile(
    name: impl Into<SmolStr>,
    registry: GrammarRegistry,
    root: TermId,
    comments: Vec<CommentTerminal>,
) -> (Language, Vec<Diagnostic>) {
    let GrammarRegistry {
        terms, key_terms, ..
    } = registry;
    let language = Language::new(name.into(), terms, key_terms, root, comments);
    let diagnostics = analysis::check(&language);
    debug!(
        grammar = language.name(),
        terms = language.terms().len(),
        diagnostics = diagnostics.len(),
        "compiled grammar"
    );
    (language, diagnostics)
}

/// Run `language` over `text`.
pub fn parse(language: &Language, text: &str) -> Parse {
    let source = SourceText::new(text);
    let builder = ParserBuilder::new(language, &source);
    let table = builder.table();
    let document = builder.document(&table);
    match document.parse(text) {
        Ok(green) => Parse {
            green: Some(green),
            errors: Vec::new(),
        },
        Err(errors) => Parse {
            green: None,
            errors: errors
                .iter()
                .map(|error| {
                    SyntaxError::new(combinators::describe(error), source.text_range(error.span()))
                })
                .collect(),
        },
    }
}

/// Debug rendering of the concrete tree of `text`, or of its syntax errors.
pub fn tree_string(language: &Language, text: &str) -> String {
    let parse = parse(language, text);
    match parse.syntax() {
        Some(root) => TreeDisplay::new(language, root).to_string(),
        None => parse
            .errors
            .iter()
            .map(|error| format!("error {:?}: {}\n", error.range, error.message))
            .collect(),
    }
}
