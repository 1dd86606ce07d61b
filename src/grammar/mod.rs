//! Grammar definition and driving
//!
//! Node types describe their rules through a [`RuleBuilder`]; the registry
//! keeps one term per node type, key term and declaration:
//!
//! ```text
//! Grammar<D> ──build──▶ GrammarRegistry ──▶ engine::compile ──▶ Language
//!     │                       ▲
//!     │               NodeType::rule(&mut RuleBuilder)
//!     └──parse──▶ engine::parse ──▶ ValueBuilder ──▶ ParserNode<D::Root>
//! ```

mod builder;
mod driver;
mod key_terms;
mod registry;
mod shape;
mod terms;
mod values;

pub use builder::{ListOptions, RuleBuilder};
pub use driver::{Grammar, GrammarDefinition};
pub use key_terms::{KeyTerm, KeyTermRegistry, KeyValue, TermValue};
pub use registry::{GrammarRegistry, type_label};
pub use shape::{GrammarHint, Repetition, RuleShape, ShapeDisplay};
pub use terms::{
    Associativity, CaseRestriction, CommentTerminal, NodeCreator, Precedence, Scanner, Term,
    TermFlags, TermId, TermKind, is_word,
};

#[cfg(test)]
mod tests;
