//! Turns a frozen [`Language`] into chumsky parsers producing rowan green elements.
//!
//! Parsers are assembled per parse because chumsky parsers are not `Sync`.
//! Each non-terminal is wrapped in its own `recursive` scope, nested in term
//! order: a rule refers to enclosing rules through the weak handle chumsky
//! hands to the closure, and to inner rules through their finished parsers,
//! so the parser graph holds no strong cycles.
//!
//! Every rule entered on the current path counts toward [`MAX_NESTING`];
//! deeper input fails with a syntax error instead of exhausting the stack.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

use chumsky::error::{Simple, SimpleReason};
use chumsky::prelude::*;
use chumsky::BoxedParser;
use rowan::{GreenNode, GreenToken, NodeOrToken};
use smol_str::SmolStr;

use super::language::Language;
use super::syntax_kind::SyntaxKind;
use crate::base::{TextRange, TextSize};
use crate::grammar::{
    CaseRestriction, CommentTerminal, RuleShape, Scanner, TermFlags, TermId, TermKind, is_word,
};

pub(crate) type Element = NodeOrToken<GreenNode, GreenToken>;
pub(crate) type Elements = Vec<Element>;
type Failure = Simple<char>;
type Rule<'a> = BoxedParser<'a, char, Elements, Failure>;
type Scan<'a> = BoxedParser<'a, char, Range<usize>, Failure>;
type Skip<'a> = BoxedParser<'a, char, Option<Range<usize>>, Failure>;

/// Deepest chain of rules one parse may have open at once.
pub const MAX_NESTING: usize = 256;

/// Input text with char positions mapped back to byte offsets.
pub(crate) struct SourceText<'t> {
    text: &'t str,
    offsets: Vec<usize>,
}

impl<'t> SourceText<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        let offsets = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, offsets }
    }

    fn byte(&self, char_index: usize) -> usize {
        self.offsets
            .get(char_index)
            .copied()
            .unwrap_or(self.text.len())
    }

    fn slice(&self, span: Range<usize>) -> &'t str {
        &self.text[self.byte(span.start)..self.byte(span.end)]
    }

    pub(crate) fn text_range(&self, span: Range<usize>) -> TextRange {
        let start = TextSize::try_from(self.byte(span.start)).unwrap_or_default();
        let end = TextSize::try_from(self.byte(span.end)).unwrap_or(start);
        TextRange::new(start, end.max(start))
    }
}

/// Builds the document parser for one language over one input.
pub(crate) struct ParserBuilder<'a> {
    language: &'a Language,
    source: &'a SourceText<'a>,
    nonterminals: Vec<TermId>,
    /// Rules currently open on the parse path.
    depth: Rc<Cell<usize>>,
}

impl<'a> ParserBuilder<'a> {
    pub(crate) fn new(language: &'a Language, source: &'a SourceText<'a>) -> Self {
        let nonterminals = language
            .terms()
            .iter()
            .enumerate()
            .filter(|(_, term)| !term.is_terminal())
            .filter_map(|(index, _)| TermId::new(index))
            .collect();
        Self {
            language,
            source,
            nonterminals,
            depth: Rc::new(Cell::new(0)),
        }
    }

    /// Parsers for every term, indexed by term id. The table owns the
    /// outermost recursive scope and must outlive any parse run with it.
    pub(crate) fn table(&self) -> Vec<Option<Rule<'a>>> {
        let mut table: Vec<Option<Rule<'a>>> = self
            .language
            .terms()
            .iter()
            .enumerate()
            .map(|(index, term)| {
                let id = TermId::new(index)?;
                term.is_terminal().then(|| self.terminal(id, term.kind()))
            })
            .collect();
        self.nest(0, &mut table);
        table
    }

    /// The whole input: the root rule, trailing trivia, then end of input.
    pub(crate) fn document(&self, table: &[Option<Rule<'a>>]) -> BoxedParser<'a, char, GreenNode, Failure> {
        let source = self.source;
        self.reference(self.language.root(), table)
            .then(self.trivia())
            .then_ignore(end())
            .map(move |(mut children, trailing)| {
                if let Some(span) = trailing {
                    children.push(token(SyntaxKind::TRIVIA, source.slice(span)));
                }
                GreenNode::new(SyntaxKind::DOCUMENT.into(), children)
            })
            .boxed()
    }

    fn nest(&self, position: usize, table: &mut Vec<Option<Rule<'a>>>) {
        let Some(&id) = self.nonterminals.get(position) else {
            return;
        };
        let strong = recursive(|weak: Recursive<'a, char, Elements, Failure>| {
            table[id.index()] = Some(weak.boxed());
            self.nest(position + 1, table);
            self.nonterminal(id, table)
        });
        table[id.index()] = Some(strong.boxed());
    }

    fn nonterminal(&self, id: TermId, table: &[Option<Rule<'a>>]) -> Rule<'a> {
        let term = self.language.term(id);
        let Some(rule) = term.rule() else {
            return fail(format!("rule `{}` is not defined", term.name()));
        };
        let body = self.shape(rule, table);
        if term.has_flag(TermFlags::TRANSIENT) {
            return self.nested(body);
        }
        let kind = SyntaxKind::from(id);
        let node = body
            .map(move |children| vec![NodeOrToken::Node(GreenNode::new(kind.into(), children))])
            .boxed();
        self.nested(node)
    }

    /// Count `rule` toward the nesting depth while it runs.
    ///
    /// The depth is released on success and, through the fallback branch, on
    /// failure. The fallback's error sits at the rule's start, so it never
    /// outranks the rule's own error.
    fn nested(&self, rule: Rule<'a>) -> Rule<'a> {
        let enter = Rc::clone(&self.depth);
        let leave = Rc::clone(&self.depth);
        let unwind = Rc::clone(&self.depth);
        empty()
            .try_map(move |(), span| {
                enter.set(enter.get() + 1);
                if enter.get() > MAX_NESTING {
                    Err(Failure::custom(
                        span,
                        format!("input nests deeper than {MAX_NESTING} rules"),
                    ))
                } else {
                    Ok(())
                }
            })
            .ignore_then(rule)
            .map(move |children| {
                leave.set(leave.get().saturating_sub(1));
                children
            })
            .or(empty().try_map(move |(), span| {
                unwind.set(unwind.get().saturating_sub(1));
                Err::<Elements, _>(Failure::custom(span, "rule failed"))
            }))
            .boxed()
    }

    fn reference(&self, id: TermId, table: &[Option<Rule<'a>>]) -> Rule<'a> {
        match table.get(id.index()) {
            Some(Some(rule)) => rule.clone(),
            _ => fail(format!("unknown term {id}")),
        }
    }

    fn shape(&self, shape: &RuleShape, table: &[Option<Rule<'a>>]) -> Rule<'a> {
        match shape {
            RuleShape::Empty | RuleShape::Hint(_) => nothing(),
            RuleShape::Term(id) => self.reference(*id, table),
            RuleShape::Sequence(items) => items.iter().fold(nothing(), |sequence, item| {
                sequence
                    .then(self.shape(item, table))
                    .map(|(mut head, tail)| {
                        head.extend(tail);
                        head
                    })
                    .boxed()
            }),
            RuleShape::Choice(alternatives) => {
                let mut parsers = alternatives.iter().map(|alternative| self.shape(alternative, table));
                match parsers.next() {
                    Some(first) => parsers.fold(first, |choice, next| choice.or(next).boxed()),
                    None => nothing(),
                }
            }
            RuleShape::Repeat(repetition) => {
                let item = self.shape(&repetition.item, table);
                let delimiter = repetition
                    .delimiter
                    .as_ref()
                    .map_or_else(nothing, |delimiter| self.shape(delimiter, table));
                let mut repeated = item
                    .clone()
                    .then(delimiter.clone().then(item).map(concat).repeated())
                    .map(|(mut head, rest)| {
                        head.extend(rest.into_iter().flatten());
                        head
                    })
                    .boxed();
                if repetition.allow_trailing && repetition.delimiter.is_some() {
                    repeated = repeated
                        .then(delimiter.or_not())
                        .map(|(mut head, trailing)| {
                            head.extend(trailing.into_iter().flatten());
                            head
                        })
                        .boxed();
                }
                if repetition.allow_empty {
                    repeated = repeated.or_not().map(Option::unwrap_or_default).boxed();
                }
                repeated
            }
        }
    }

    fn terminal(&self, id: TermId, kind: &'a TermKind) -> Rule<'a> {
        let scan = match kind {
            TermKind::KeyTerm { text } if is_word(text) => self.keyword(text),
            TermKind::KeyTerm { text } => self.symbol(text),
            TermKind::Identifier { case } => self.identifier(*case),
            TermKind::Literal { scanner } => literal(*scanner),
            TermKind::NonTerminal { .. } => return fail(format!("term {id} is not a terminal")),
        };
        let source = self.source;
        let kind = SyntaxKind::from(id);
        self.trivia()
            .then(scan)
            .map(move |(trivia, span)| {
                let mut out = Vec::with_capacity(2);
                if let Some(trivia) = trivia {
                    out.push(token(SyntaxKind::TRIVIA, source.slice(trivia)));
                }
                out.push(token(kind, source.slice(span)));
                out
            })
            .boxed()
    }

    /// Whitespace and comments before a token, as one span.
    fn trivia(&self) -> Skip<'a> {
        let whitespace = filter(|c: &char| c.is_whitespace()).ignored().boxed();
        self.language
            .comments()
            .iter()
            .filter(|comment| !comment.start.is_empty())
            .map(comment)
            .fold(whitespace, |skip, comment| skip.or(comment).boxed())
            .repeated()
            .map_with_span(|skipped, span: Range<usize>| (!skipped.is_empty()).then_some(span))
            .boxed()
    }

    fn keyword(&self, text: &'a SmolStr) -> Scan<'a> {
        let source = self.source;
        word()
            .try_map(move |span, error_span| {
                let found = source.slice(span.clone());
                if found == text.as_str() {
                    Ok(span)
                } else {
                    Err(Failure::custom(
                        error_span,
                        format!("expected `{text}`, found `{found}`"),
                    ))
                }
            })
            .boxed()
    }

    /// A symbol only matches when no longer symbol starts at the same place.
    fn symbol(&self, text: &'a SmolStr) -> Scan<'a> {
        let exact = just(text.as_str()).to(true);
        let longer = self
            .language
            .symbols()
            .iter()
            .filter(|symbol| symbol.len() > text.len() && symbol.starts_with(text.as_str()))
            .rev()
            .map(|symbol| just(symbol.as_str()).to(false).boxed())
            .reduce(|choice, next| choice.or(next).boxed());
        let matched = match longer {
            Some(longer) => longer.or(exact).boxed(),
            None => exact.boxed(),
        };
        matched
            .map_with_span(|exact, span: Range<usize>| (exact, span))
            .try_map(move |(exact, span), error_span| {
                if exact {
                    Ok(span)
                } else {
                    Err(Failure::custom(error_span, format!("expected `{text}`")))
                }
            })
            .boxed()
    }

    fn identifier(&self, case: CaseRestriction) -> Scan<'a> {
        let language = self.language;
        let source = self.source;
        word()
            .try_map(move |span, error_span| {
                let found = source.slice(span.clone());
                if language.is_reserved(found) {
                    Err(Failure::custom(
                        error_span,
                        format!("`{found}` is reserved and cannot be used as an identifier"),
                    ))
                } else if !case.admits(found) {
                    Err(Failure::custom(
                        error_span,
                        format!("identifier `{found}` does not satisfy {case:?}"),
                    ))
                } else {
                    Ok(span)
                }
            })
            .boxed()
    }
}

fn token(kind: SyntaxKind, text: &str) -> Element {
    NodeOrToken::Token(GreenToken::new(kind.into(), text))
}

fn concat((mut head, tail): (Elements, Elements)) -> Elements {
    head.extend(tail);
    head
}

fn nothing<'a>() -> Rule<'a> {
    empty().map(|()| Vec::new()).boxed()
}

fn fail<'a>(message: String) -> Rule<'a> {
    empty()
        .try_map(move |(), span| Err::<Elements, _>(Failure::custom(span, message.clone())))
        .boxed()
}

fn comment<'a>(comment: &'a CommentTerminal) -> BoxedParser<'a, char, (), Failure> {
    let start = just(comment.start.as_str());
    if comment.is_line() {
        return start
            .then(filter(|c: &char| *c != '\n' && *c != '\r').repeated())
            .ignored()
            .boxed();
    }
    let ends = comment
        .end
        .iter()
        .filter(|end| !end.is_empty())
        .map(|end| just(end.as_str()).ignored().boxed())
        .reduce(|choice, next| choice.or(next).boxed());
    match ends {
        Some(ends) => start.then(take_until(ends)).ignored().boxed(),
        None => start.then(any().repeated()).ignored().boxed(),
    }
}

fn word<'a>() -> Scan<'a> {
    filter(|c: &char| *c == '_' || unicode_ident::is_xid_start(*c))
        .then(filter(|c: &char| unicode_ident::is_xid_continue(*c)).repeated())
        .map_with_span(|_, span: Range<usize>| span)
        .boxed()
}

fn digits<'a>() -> BoxedParser<'a, char, (), Failure> {
    filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .ignored()
        .boxed()
}

fn literal<'a>(scanner: Scanner) -> Scan<'a> {
    match scanner {
        Scanner::Integer => digits().map_with_span(|(), span: Range<usize>| span).boxed(),
        Scanner::Number => digits()
            .then(just('.').then(digits()).or_not())
            .then(one_of("eE").then(one_of("+-").or_not()).then(digits()).or_not())
            .map_with_span(|_, span: Range<usize>| span)
            .boxed(),
        Scanner::QuotedString { quote } => {
            let plain = filter(move |c: &char| *c != quote && *c != '\\').ignored();
            let escaped = just('\\').then(any()).ignored();
            just(quote)
                .then(plain.or(escaped).repeated())
                .then(just(quote))
                .map_with_span(|_, span: Range<usize>| span)
                .boxed()
        }
    }
}

/// Readable message for one chumsky failure.
pub(crate) fn describe(error: &Failure) -> String {
    match error.reason() {
        SimpleReason::Custom(message) => message.clone(),
        SimpleReason::Unclosed { delimiter, .. } => format!("unclosed delimiter {delimiter:?}"),
        SimpleReason::Unexpected => {
            let mut expected: Vec<String> = error
                .expected()
                .map(|token| match token {
                    Some(c) => format!("{c:?}"),
                    None => "end of input".to_owned(),
                })
                .collect();
            expected.sort();
            expected.dedup();
            let found = error
                .found()
                .map_or_else(|| "end of input".to_owned(), |c| format!("{c:?}"));
            if expected.is_empty() {
                format!("unexpected {found}")
            } else {
                format!("expected {}, found {found}", expected.join(" or "))
            }
        }
    }
}
