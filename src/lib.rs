//! # node-parser
//!
//! Typed value trees over a combinator grammar engine.
//!
//! Node types describe their own grammar rules; a built grammar parses text
//! into a lossless concrete tree and then into a tree of located, typed value
//! nodes rooted at the grammar's root node type.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! grammar   → Grammar<D> driver, RuleBuilder, term and key-term registries
//!   ↓
//! engine    → chumsky combinators, rowan tree, grammar checks
//!   ↓
//! nodes     → ValueNode trait and the built-in node kinds
//!   ↓
//! errors    → Error, Diagnostic, Severity
//!   ↓
//! base      → Location, LineIndex, TextRange
//! ```

// ============================================================================
// MODULES (dependency order: base → errors → nodes → engine → grammar)
// ============================================================================

/// Foundation types: Location, LineIndex, TextRange
pub mod base;

/// Errors, diagnostics and severities
pub mod errors;

/// Value nodes: the ValueNode trait, sequences, lists, optionals, braces, terminals
pub mod nodes;

/// Engine adapter: combinator translation, concrete tree, grammar checks
pub mod engine;

/// Grammar definition: registries, rule building, the build/parse driver
pub mod grammar;

// Re-export the common surface
pub use base::{LineCol, LineIndex, Location, TextRange, TextSize};
pub use errors::{Diagnostic, Error, GrammarBuildError, ParseError, RegistrationConflict, Result, Severity};
pub use grammar::{Grammar, GrammarDefinition, ListOptions, RuleBuilder, RuleShape};
pub use nodes::{Node, NodeType, ParserNode, ValueNode};

/// Everything a grammar definition usually needs.
pub mod prelude {
    pub use crate::errors::{Error, Result, Severity};
    pub use crate::grammar::{
        Associativity, CaseRestriction, CommentTerminal, Grammar, GrammarDefinition, ListOptions,
        Precedence, RuleBuilder, RuleShape, TermFlags, TermId,
    };
    pub use crate::nodes::{
        BraceNode, BuildContext, Constant, ConstantNode, ConstantType, Identifier, IdentifierNode,
        IdentifierType, IntegerLiteral, KeyTermNode, ListNode, LiteralNode, LiteralType, Node,
        NodeType, NumberLiteral, Operator, OperatorType, OptionalNode, ParserNode, SequenceNode,
        StringLiteral, ValueNode, fold_operators,
    };
}
