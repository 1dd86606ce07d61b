use rstest::rstest;

use super::*;
use crate::base::{Location, TextSize};
use crate::errors::Error;
use crate::grammar::{Precedence, Term, TermFlags, TermKind};

fn here() -> Location {
    Location::new(0, 0, TextSize::from(0), "test")
}

fn int(value: i64) -> Node {
    Box::new(LiteralNode::new(here(), value, value.to_string()))
}

fn word(symbol: &str) -> Node {
    Box::new(IdentifierNode::new(here(), symbol))
}

fn key(text: &str, flags: TermFlags) -> Term {
    Term::new(text, TermKind::KeyTerm { text: text.into() }).with_flags(flags)
}

fn op(text: &str, value: char, precedence: Precedence) -> Node {
    let term = key(text, TermFlags::OPERATOR);
    let create = KeyTermNode::creator(value, Some(precedence));
    create(TreePosition::new(&term, here(), Some(text.into()), Vec::new())).unwrap()
}

fn ints(node: &dyn ValueNode) -> Vec<i64> {
    node.node_as::<SequenceNode>()
        .unwrap()
        .iter()
        .map(|child| *child.typed_value::<i64>().unwrap())
        .collect()
}

// ============================================================================
// VALUE ACCESS
// ============================================================================

#[test]
fn test_typed_value_checks_type() {
    let node = int(3);
    assert_eq!(*node.typed_value::<i64>().unwrap(), 3);
    assert_eq!(node.declared_type(), DataType::of::<i64>());
    let err = node.typed_value::<String>().unwrap_err();
    assert!(
        matches!(err, Error::TypeMismatch { expected, found } if expected.ends_with("String") && found == "i64"),
        "{err:?}"
    );
}

#[test]
fn test_downcast() {
    let node = word("alpha");
    assert!(node.is::<IdentifierNode>());
    assert!(node.downcast_ref::<SequenceNode>().is_none());
    assert_eq!(node.typed_value::<String>().unwrap(), "alpha");

    let node = node.downcast::<SequenceNode>().unwrap_err();
    let identifier = node.downcast::<IdentifierNode>().unwrap();
    assert_eq!(identifier.symbol(), "alpha");
}

// ============================================================================
// SEQUENCES
// ============================================================================

#[test]
fn test_sequence_adopts_single_sequence() {
    let inner = SequenceNode::new(here(), vec![int(1), int(2)]);
    let outer = SequenceNode::new(here(), vec![Box::new(inner) as Node]);
    assert_eq!(outer.len(), 2);
    assert_eq!(ints(&outer), [1, 2]);

    let twice = SequenceNode::new(
        here(),
        vec![Box::new(SequenceNode::new(
            here(),
            vec![Box::new(SequenceNode::new(here(), vec![int(5), int(6)])) as Node],
        )) as Node],
    );
    assert_eq!(ints(&twice), [5, 6]);
}

#[test]
fn test_sequence_keeps_sibling_sequences() {
    let nested = SequenceNode::new(here(), vec![int(1), int(2)]);
    let outer = SequenceNode::new(here(), vec![Box::new(nested) as Node, int(3)]);
    assert_eq!(outer.len(), 2);
    assert!(outer[0].is::<SequenceNode>());
    assert_eq!(*outer[1].typed_value::<i64>().unwrap(), 3);
    assert_eq!(outer.declared_type(), DataType::of::<Vec<Node>>());
}

// ============================================================================
// OPTIONALS
// ============================================================================

#[test]
fn test_absent_optional() {
    let optional = OptionalNode::absent(here());
    assert!(!optional.has_value());
    assert!(optional.get().is_none());
    assert!(matches!(optional.typed_value::<i64>(), Err(Error::InvalidState(_))));
    assert_eq!(optional.map_or(-1, |node| node.raw_value().is_some() as i64), -1);
    assert_eq!(optional.map_or_else(|| "none", |_| "some"), "none");

    let node: &dyn ValueNode = &optional;
    assert!(!node.has_value());
    assert!(matches!(node.value(), Err(Error::InvalidState(_))));
    assert_eq!(node.declared_type(), DataType::of::<()>());
}

#[test]
fn test_present_optional_unwraps_single_sequence() {
    let single = SequenceNode::new(here(), vec![int(7)]);
    let optional = OptionalNode::new(here(), Some(Box::new(single) as Node));
    assert!(optional.has_value());
    assert_eq!(*optional.typed_value::<i64>().unwrap(), 7);
    assert_eq!(optional.declared_type(), DataType::of::<i64>());
    assert!(optional.get().unwrap().is::<LiteralNode<i64>>());
}

// ============================================================================
// LISTS
// ============================================================================

#[test]
fn test_list_filters_and_restarts() {
    let list = ListNode::<i64>::new(here(), vec![int(1), word("skip"), int(2), int(3)]);
    assert_eq!(list.len(), 3);

    let values = list.values();
    let first: Vec<i64> = values.clone().copied().collect();
    let second: Vec<i64> = list.values().copied().collect();
    assert_eq!(first, [1, 2, 3]);
    assert_eq!(first, second);
    assert_eq!(values.count(), 3);
}

#[test]
fn test_empty_list() {
    let list = ListNode::<String>::new(here(), Vec::new());
    assert!(list.is_empty());
    assert_eq!(list.values().next(), None);
}

// ============================================================================
// BRACES
// ============================================================================

#[test]
fn test_braces_are_transparent() {
    let open = key("(", TermFlags::OPEN_BRACE);
    let close = key(")", TermFlags::CLOSE_BRACE);
    let inner = Term::placeholder("Expr");

    let bracketed = BraceNode::from_position(TreePosition::new(
        &inner,
        here(),
        None,
        vec![
            ParsedChild::new(&open, None),
            ParsedChild::new(&inner, Some(int(9))),
            ParsedChild::new(&close, None),
        ],
    ));
    assert!(bracketed.is_bracketed());
    assert_eq!(bracketed.open(), Some("("));
    assert_eq!(bracketed.close(), Some(")"));

    let bare = BraceNode::from_position(TreePosition::new(
        &inner,
        here(),
        None,
        vec![ParsedChild::new(&inner, Some(int(9)))],
    ));
    assert!(!bare.is_bracketed());
    assert_eq!(bare.open(), None);

    assert_eq!(bracketed.declared_type(), bare.declared_type());
    let node: &dyn ValueNode = &bracketed;
    assert_eq!(node.typed_value::<i64>().unwrap(), &9);
}

#[test]
fn test_empty_braces_hold_empty_sequence() {
    let open = key("[", TermFlags::OPEN_BRACE);
    let close = key("]", TermFlags::CLOSE_BRACE);
    let inner = Term::placeholder("Items");
    let brace = BraceNode::from_position(TreePosition::new(
        &inner,
        here(),
        None,
        vec![
            ParsedChild::new(&open, None),
            ParsedChild::new(&inner, None),
            ParsedChild::new(&close, None),
        ],
    ));
    let nested = brace.nested().node_as::<SequenceNode>().unwrap();
    assert!(nested.is_empty());
}

// ============================================================================
// TERMINALS
// ============================================================================

#[rstest]
#[case("\"plain\"", Some("plain"))]
#[case(r#""a\"b""#, Some("a\"b"))]
#[case(r#""tab\tnew\nline""#, Some("tab\tnew\nline"))]
#[case(r#""back\\slash""#, Some("back\\slash"))]
#[case("\"open", None)]
#[case("bare", None)]
fn test_unquote(#[case] raw: &str, #[case] expected: Option<&str>) {
    assert_eq!(unquote(raw, '"').as_deref(), expected);
}

#[rstest]
#[case("12", Some(12))]
#[case("007", Some(7))]
#[case("99999999999999999999", None)]
fn test_integer_literal(#[case] raw: &str, #[case] expected: Option<i64>) {
    assert_eq!(IntegerLiteral.try_parse(raw), expected);
}

#[test]
fn test_key_term_node_keeps_metadata() {
    let node = op("^", '^', Precedence::right(3));
    let key_term = node.node_as::<KeyTermNode<char>>().unwrap();
    assert_eq!(key_term.text(), "^");
    assert_eq!(*key_term.value(), '^');
    assert_eq!(key_term.precedence(), Some(Precedence::right(3)));
    assert!(key_term.flags().contains(TermFlags::OPERATOR));
}

// ============================================================================
// OPERATORS
// ============================================================================

fn eval(nodes: &[Node]) -> crate::errors::Result<i64> {
    fold_operators::<i64, char, _, _>(
        nodes,
        |node| node.typed_value::<i64>().copied(),
        |lhs, op, rhs| {
            Ok(match *op {
                '+' => lhs + rhs,
                '-' => lhs - rhs,
                '*' => lhs * rhs,
                '^' => lhs.pow(rhs as u32),
                _ => unreachable!(),
            })
        },
    )
}

#[test]
fn test_fold_precedence() {
    let nodes = vec![
        int(2),
        op("+", '+', Precedence::left(1)),
        int(3),
        op("*", '*', Precedence::left(2)),
        int(4),
    ];
    assert_eq!(eval(&nodes).unwrap(), 14);
}

#[test]
fn test_fold_left_associative() {
    let nodes = vec![
        int(8),
        op("-", '-', Precedence::left(1)),
        int(3),
        op("-", '-', Precedence::left(1)),
        int(2),
    ];
    assert_eq!(eval(&nodes).unwrap(), 3);
}

#[test]
fn test_fold_right_associative() {
    let nodes = vec![
        int(2),
        op("^", '^', Precedence::right(3)),
        int(3),
        op("^", '^', Precedence::right(3)),
        int(2),
    ];
    assert_eq!(eval(&nodes).unwrap(), 512);
}

#[test]
fn test_fold_single_operand() {
    assert_eq!(eval(&[int(42)]).unwrap(), 42);
}

#[test]
fn test_fold_rejects_broken_chains() {
    let even = vec![int(1), op("+", '+', Precedence::left(1))];
    assert!(matches!(eval(&even), Err(Error::InvalidState(_))));

    let not_an_operator = vec![int(1), int(2), int(3)];
    assert!(matches!(eval(&not_an_operator), Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_fold_mixed_levels() {
    let nodes = vec![
        int(2),
        op("*", '*', Precedence::left(2)),
        int(3),
        op("+", '+', Precedence::left(1)),
        int(4),
        op("^", '^', Precedence::right(3)),
        int(2),
        op("-", '-', Precedence::left(1)),
        int(1),
    ];
    assert_eq!(eval(&nodes).unwrap(), 21);
}

#[rstest]
#[case::right('^', Precedence::right(3), 1)]
#[case::left('+', Precedence::left(1), 50_001)]
fn test_fold_long_chain(#[case] symbol: char, #[case] precedence: Precedence, #[case] expected: i64) {
    let text = symbol.to_string();
    let mut nodes = vec![int(1)];
    for _ in 0..50_000 {
        nodes.push(op(&text, symbol, precedence));
        nodes.push(int(1));
    }
    assert_eq!(eval(&nodes).unwrap(), expected);
}
