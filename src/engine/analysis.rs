//! Grammar checks run before a language is accepted.
//!
//! The combinator engine tries alternatives in order and cannot execute left
//! recursion, so those shapes are rejected here instead of hanging a parse.

use rustc_hash::FxHashSet;

use super::language::Language;
use crate::errors::Diagnostic;
use crate::grammar::{RuleShape, Term, TermFlags, TermId, TermKind, is_word};

pub(crate) fn check(language: &Language) -> Vec<Diagnostic> {
    let terms = language.terms();
    let mut diagnostics = Vec::new();

    check_terms(terms, &mut diagnostics);
    check_comments(language, &mut diagnostics);

    let nullable = nullable_terms(terms);
    for term in terms {
        if let Some(rule) = term.rule() {
            check_rule(terms, term, rule, &nullable, &mut diagnostics);
        }
    }
    check_left_recursion(terms, &nullable, &mut diagnostics);
    check_reachability(language, &mut diagnostics);
    diagnostics
}

fn check_terms(terms: &[Term], diagnostics: &mut Vec<Diagnostic>) {
    for term in terms {
        match term.kind() {
            TermKind::KeyTerm { text } if text.is_empty() => {
                diagnostics.push(Diagnostic::error(format!(
                    "key term `{}` has empty text",
                    term.name()
                )));
            }
            TermKind::KeyTerm { text } if term.has_flag(TermFlags::KEYWORD) && !is_word(text) => {
                diagnostics.push(Diagnostic::error(format!(
                    "keyword {text:?} is not a word and cannot be reserved"
                )));
            }
            TermKind::NonTerminal { rule: None } => {
                diagnostics.push(Diagnostic::critical(format!(
                    "rule `{}` is referenced but never defined",
                    term.name()
                )));
            }
            _ => {}
        }
    }
}

fn check_comments(language: &Language, diagnostics: &mut Vec<Diagnostic>) {
    for comment in language.comments() {
        if comment.start.is_empty() {
            diagnostics.push(Diagnostic::critical(format!(
                "comment `{}` has an empty start symbol",
                comment.name
            )));
        }
        if comment.end.iter().any(|end| end.is_empty()) {
            diagnostics.push(Diagnostic::error(format!(
                "comment `{}` has an empty end symbol",
                comment.name
            )));
        }
    }
}

fn check_rule(
    terms: &[Term],
    owner: &Term,
    rule: &RuleShape,
    nullable: &[bool],
    diagnostics: &mut Vec<Diagnostic>,
) {
    visit(rule, &mut |shape| match shape {
        RuleShape::Term(id) if terms.get(id.index()).is_none() => {
            diagnostics.push(Diagnostic::critical(format!(
                "rule `{}` refers to unknown term {id}",
                owner.name()
            )));
        }
        RuleShape::Repeat(repetition) => {
            let delimiter_nullable = repetition
                .delimiter
                .as_ref()
                .is_none_or(|delimiter| is_nullable(delimiter, nullable));
            if is_nullable(&repetition.item, nullable) && delimiter_nullable {
                diagnostics.push(Diagnostic::critical(format!(
                    "repeated element {} in `{}` can match empty input",
                    repetition.item.display(terms),
                    owner.name()
                )));
            }
        }
        RuleShape::Choice(alternatives) => {
            let always = alternatives
                .iter()
                .position(|alternative| is_nullable(alternative, nullable));
            if let Some(index) = always.filter(|index| index + 1 < alternatives.len()) {
                diagnostics.push(Diagnostic::warning(format!(
                    "alternatives after {} in `{}` are unreachable; it always succeeds",
                    alternatives[index].display(terms),
                    owner.name()
                )));
            }
        }
        _ => {}
    });
}

/// Terms that can match without consuming input, to a fixpoint.
fn nullable_terms(terms: &[Term]) -> Vec<bool> {
    let mut nullable = vec![false; terms.len()];
    loop {
        let mut changed = false;
        for (index, term) in terms.iter().enumerate() {
            if nullable[index] {
                continue;
            }
            let now = match term.kind() {
                TermKind::KeyTerm { text } => text.is_empty(),
                TermKind::NonTerminal { rule: Some(rule) } => is_nullable(rule, &nullable),
                _ => false,
            };
            if now {
                nullable[index] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

fn is_nullable(shape: &RuleShape, nullable: &[bool]) -> bool {
    match shape {
        RuleShape::Empty | RuleShape::Hint(_) => true,
        RuleShape::Term(id) => nullable.get(id.index()).copied().unwrap_or(false),
        RuleShape::Sequence(items) => items.iter().all(|item| is_nullable(item, nullable)),
        RuleShape::Choice(alternatives) => alternatives
            .iter()
            .any(|alternative| is_nullable(alternative, nullable)),
        RuleShape::Repeat(repetition) => {
            repetition.allow_empty || is_nullable(&repetition.item, nullable)
        }
    }
}

/// Non-terminals `shape` may enter before consuming any input.
fn leading(shape: &RuleShape, terms: &[Term], nullable: &[bool], out: &mut Vec<TermId>) {
    match shape {
        RuleShape::Empty | RuleShape::Hint(_) => {}
        RuleShape::Term(id) => {
            if terms.get(id.index()).is_some_and(|term| !term.is_terminal()) {
                out.push(*id);
            }
        }
        RuleShape::Sequence(items) => {
            for item in items {
                leading(item, terms, nullable, out);
                if !is_nullable(item, nullable) {
                    break;
                }
            }
        }
        RuleShape::Choice(alternatives) => {
            for alternative in alternatives {
                leading(alternative, terms, nullable, out);
            }
        }
        RuleShape::Repeat(repetition) => leading(&repetition.item, terms, nullable, out),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

fn check_left_recursion(terms: &[Term], nullable: &[bool], diagnostics: &mut Vec<Diagnostic>) {
    let edges: Vec<Vec<TermId>> = terms
        .iter()
        .map(|term| {
            let mut out = Vec::new();
            if let Some(rule) = term.rule() {
                leading(rule, terms, nullable, &mut out);
            }
            out
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; terms.len()];
    let mut stack = Vec::new();
    for start in 0..terms.len() {
        if marks[start] == Mark::Unvisited {
            visit_left(start, &edges, &mut marks, &mut stack, terms, diagnostics);
        }
    }
}

fn visit_left(
    index: usize,
    edges: &[Vec<TermId>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
    terms: &[Term],
    diagnostics: &mut Vec<Diagnostic>,
) {
    marks[index] = Mark::Active;
    stack.push(index);
    for next in &edges[index] {
        let next = next.index();
        match marks[next] {
            Mark::Unvisited => visit_left(next, edges, marks, stack, terms, diagnostics),
            Mark::Active => {
                let from = stack.iter().position(|&i| i == next).unwrap_or(0);
                let mut cycle: Vec<&str> = stack[from..].iter().map(|&i| terms[i].name()).collect();
                cycle.push(terms[next].name());
                diagnostics.push(Diagnostic::critical(format!(
                    "left recursion: {}",
                    cycle.join(" -> ")
                )));
            }
            Mark::Done => {}
        }
    }
    stack.pop();
    marks[index] = Mark::Done;
}

fn check_reachability(language: &Language, diagnostics: &mut Vec<Diagnostic>) {
    let terms = language.terms();
    let mut reached = FxHashSet::default();
    let mut pending = vec![language.root()];
    while let Some(id) = pending.pop() {
        if !reached.insert(id) {
            continue;
        }
        if let Some(rule) = terms.get(id.index()).and_then(Term::rule) {
            visit(rule, &mut |shape| {
                if let RuleShape::Term(next) = shape {
                    pending.push(*next);
                }
            });
        }
    }
    for (index, term) in terms.iter().enumerate() {
        let id = TermId::new(index);
        if !term.is_terminal() && id.is_some_and(|id| !reached.contains(&id)) {
            diagnostics.push(Diagnostic::warning(format!(
                "rule `{}` is unreachable from `{}`",
                term.name(),
                language.term(language.root()).name()
            )));
        }
    }
}

fn visit(shape: &RuleShape, f: &mut impl FnMut(&RuleShape)) {
    f(shape);
    match shape {
        RuleShape::Sequence(items) | RuleShape::Choice(items) => {
            for item in items {
                visit(item, f);
            }
        }
        RuleShape::Repeat(repetition) => {
            visit(&repetition.item, f);
            if let Some(delimiter) = &repetition.delimiter {
                visit(delimiter, f);
            }
        }
        RuleShape::Empty | RuleShape::Term(_) | RuleShape::Hint(_) => {}
    }
}
