//! The grammar driver: build once, parse many times.

use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, debug_span, warn};

use super::registry::{GrammarRegistry, type_label};
use super::terms::CommentTerminal;
use super::values::ValueBuilder;
use crate::base::{LineIndex, Location, TextSize};
use crate::engine::{self, Language};
use crate::errors::{Diagnostic, Error, GrammarBuildError, ParseError, Result, Severity};
use crate::nodes::{NodeType, ParserNode};

/// Hooks describing one grammar.
///
/// ```ignore
/// #[derive(Default)]
/// struct Calculator;
///
/// impl GrammarDefinition for Calculator {
///     type Root = Expression;
///
///     fn comments(&self) -> Vec<CommentTerminal> {
///         vec![CommentTerminal::line("comment", "#")]
///     }
/// }
/// ```
pub trait GrammarDefinition: Send + Sync + 'static {
    /// Node type of the start rule.
    type Root: NodeType;

    /// Comments skipped between tokens.
    fn comments(&self) -> Vec<CommentTerminal> {
        Vec::new()
    }

    fn name(&self) -> SmolStr {
        type_label::<Self>()
    }
}

#[derive(Debug)]
enum State {
    Unbuilt,
    Built(Language),
}

/// A grammar that is either unbuilt or built into a [`Language`].
///
/// `build` needs `&mut self`; parsing a built grammar only needs `&self`,
/// so one built grammar can be shared between threads.
#[derive(Debug)]
pub struct Grammar<D: GrammarDefinition> {
    definition: D,
    state: State,
}

impl<D: GrammarDefinition + Default> Default for Grammar<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: GrammarDefinition> Grammar<D> {
    pub fn new(definition: D) -> Self {
        Self {
            definition,
            state: State::Unbuilt,
        }
    }

    pub fn definition(&self) -> &D {
        &self.definition
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state, State::Built(_))
    }

    /// The frozen term table, once built.
    pub fn language(&self) -> Option<&Language> {
        match &self.state {
            State::Built(language) => Some(language),
            State::Unbuilt => None,
        }
    }

    pub fn build(&mut self) -> Result<bool> {
        self.build_with(Severity::Error)
    }

    /// Build the grammar, failing when any diagnostic meets `threshold`.
    ///
    /// Returns `Ok(false)` when already built. A [`GrammarBuildError`] is
    /// fatal for this definition: the grammar stays unbuilt, and a rebuild
    /// reports the same diagnostics. Fix the definition and construct a new
    /// grammar.
    pub fn build_with(&mut self, threshold: Severity) -> Result<bool> {
        if self.is_built() {
            return Ok(false);
        }
        let name = self.definition.name();
        let _span = debug_span!("build", grammar = %name).entered();

        let mut registry = GrammarRegistry::new();
        let root = registry.builder().definition_of::<D::Root>()?;
        let (language, diagnostics) =
            engine::compile(name.clone(), registry, root, self.definition.comments());

        if diagnostics.iter().any(|d| d.severity.meets(threshold)) {
            return Err(GrammarBuildError::new(name, diagnostics, language.dump()).into());
        }
        log_diagnostics(&diagnostics);
        debug!(terms = language.terms().len(), "grammar built");
        self.state = State::Built(language);
        Ok(true)
    }

    pub fn parse(&self, text: &str, source: &str) -> Result<ParserNode<D::Root>> {
        self.parse_with(text, source, Severity::Error)
    }

    /// Parse `text` into the typed root value.
    ///
    /// `source` names the input in every location of the result.
    pub fn parse_with(
        &self,
        text: &str,
        source: &str,
        threshold: Severity,
    ) -> Result<ParserNode<D::Root>> {
        let language = self.built()?;
        let _span = debug_span!("parse", source).entered();

        let index = LineIndex::new(text);
        let source: Arc<str> = Arc::from(source);
        let parse = engine::parse(language, text);
        let diagnostics: Vec<Diagnostic> = parse
            .errors
            .iter()
            .map(|error| {
                Diagnostic::error(error.message.clone())
                    .at(Location::resolve(&index, error.range.start(), &source))
            })
            .collect();

        let root = match parse.syntax() {
            Some(root) if !diagnostics.iter().any(|d| d.severity.meets(threshold)) => root,
            _ => {
                let fallback = Location::resolve(&index, TextSize::from(0), &source);
                return Err(ParseError::new(diagnostics, fallback).into());
            }
        };
        log_diagnostics(&diagnostics);

        let value = ValueBuilder::new(language, &index, source)
            .document(&root)?
            .ok_or_else(|| Error::invalid_state("root rule produced no value"))?;
        let node = value.downcast::<ParserNode<D::Root>>().map_err(|other| {
            Error::invalid_state(format!(
                "root value is {} instead of the root node type",
                other.declared_type()
            ))
        })?;
        debug!("parsed");
        Ok(*node)
    }

    /// Debug rendering of the concrete tree of `text`.
    pub fn tree_string(&self, text: &str, source: &str) -> Result<String> {
        let language = self.built()?;
        let _span = debug_span!("tree_string", source).entered();
        Ok(engine::tree_string(language, text))
    }

    fn built(&self) -> Result<&Language> {
        self.language().ok_or_else(|| {
            Error::invalid_state(format!(
                "grammar `{}` must be built before parsing",
                self.definition.name()
            ))
        })
    }
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.severity >= Severity::Warning {
            warn!("{diagnostic}");
        } else {
            debug!("{diagnostic}");
        }
    }
}
