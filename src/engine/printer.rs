use std::fmt;

use super::combinators::MAX_NESTING;
use super::language::Language;
use super::syntax_kind::{SyntaxElement, SyntaxNode};

/// Debug rendering of a concrete tree, one element per line.
///
/// ```text
/// "Sum" = {
///  "Num" = "3",
///  "+" = "+",
/// },
/// ```
///
/// Trivia is skipped. Nodes without tokens print as `"<empty>"`; nodes
/// nested deeper than [`MAX_NESTING`] print as `"<elided>"`.
pub struct TreeDisplay<'a> {
    language: &'a Language,
    root: SyntaxNode,
}

impl<'a> TreeDisplay<'a> {
    pub fn new(language: &'a Language, root: SyntaxNode) -> Self {
        Self { language, root }
    }

    fn element(&self, f: &mut fmt::Formatter<'_>, element: &SyntaxElement, depth: usize) -> fmt::Result {
        if element.kind().is_trivia() {
            return Ok(());
        }
        let name = self.language.kind_name(element.kind());
        match element {
            rowan::NodeOrToken::Token(token) => {
                writeln!(f, "{:depth$}{name:?} = {:?},", "", token.text())
            }
            rowan::NodeOrToken::Node(node) => {
                let mut children = node
                    .children_with_tokens()
                    .filter(|child| !child.kind().is_trivia())
                    .peekable();
                if children.peek().is_none() {
                    return writeln!(f, "{:depth$}{name:?} = \"<empty>\",", "");
                }
                if depth > MAX_NESTING {
                    return writeln!(f, "{:depth$}{name:?} = \"<elided>\",", "");
                }
                writeln!(f, "{:depth$}{name:?} = {{", "")?;
                for child in children {
                    self.element(f, &child, depth + 1)?;
                }
                writeln!(f, "{:depth$}}},", "")
            }
        }
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.element(f, &SyntaxElement::Node(self.root.clone()), 0)
    }
}
