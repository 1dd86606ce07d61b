use rstest::rstest;

use super::*;
use crate::errors::{Error, Result};
use crate::nodes::{BuildContext, IntegerLiteral, NodeType};

#[derive(Default)]
struct Num;

impl NodeType for Num {
    type Value = i64;

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        g.literal::<IntegerLiteral>()
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<i64> {
        ctx.value::<i64>(0).copied()
    }
}

/// `Nested ::= "(" Nested ")" | Num`
#[derive(Default)]
struct Nested;

impl NodeType for Nested {
    type Value = ();

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let open = g.punctuation("(")?;
        let close = g.punctuation(")")?;
        Ok(open + g.node::<Nested>()? + close | g.node::<Num>()?)
    }

    fn build(&self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }
}

mod first {
    use super::*;

    #[derive(Default)]
    pub struct Item;

    impl NodeType for Item {
        type Value = ();

        fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
            g.term("first")
        }

        fn build(&self, _ctx: &BuildContext<'_>) -> Result<()> {
            Ok(())
        }
    }
}

mod second {
    use super::*;

    #[derive(Default)]
    pub struct Item;

    impl NodeType for Item {
        type Value = ();

        fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
            g.term("second")
        }

        fn build(&self, _ctx: &BuildContext<'_>) -> Result<()> {
            Ok(())
        }
    }
}

#[derive(Default)]
struct Failing;

impl NodeType for Failing {
    type Value = ();

    fn rule(&self, _g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        Err(Error::rule("Failing", "no rule today"))
    }

    fn build(&self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_definition_identity() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let first = g.definition_of::<Num>().unwrap();
    let again = g.definition_of::<Num>().unwrap();
    assert_eq!(first, again);
    assert_eq!(registry.lookup::<Num>(), Some(first));
    assert_eq!(registry.term(first).name(), "Num");
}

#[test]
fn test_recursive_definition_terminates() {
    let mut registry = GrammarRegistry::new();
    let nested = registry.builder().definition_of::<Nested>().unwrap();
    let rule = registry.term(nested).rule().unwrap();
    assert_eq!(
        rule.display(registry.terms()).to_string(),
        "(\"(\" Nested \")\") | Num"
    );
}

#[test]
fn test_key_term_interning() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let first = g.keyword("if").unwrap();
    let second = g.keyword("if").unwrap();
    assert_eq!(first, second);

    let err = g
        .keyword_with("if", 7_i32)
        .expect_err("different value must conflict");
    match err {
        Error::RegistrationConflict(conflict) => {
            assert_eq!(conflict.name.as_str(), "if");
            assert!(conflict.existing.contains("String"), "{}", conflict.existing);
            assert!(conflict.requested.contains("i32"), "{}", conflict.requested);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(registry.key_terms().len(), 1);
    assert_eq!(registry.key_terms().reserved_words().collect::<Vec<_>>(), ["if"]);
}

#[rstest]
#[case(Some(Precedence::left(1)), Some(Precedence::left(1)), true)]
#[case(Some(Precedence::left(1)), Some(Precedence::left(2)), false)]
#[case(Some(Precedence::left(1)), Some(Precedence::right(1)), false)]
#[case(None, Some(Precedence::left(1)), false)]
fn test_operator_precedence_must_agree(
    #[case] first: Option<Precedence>,
    #[case] second: Option<Precedence>,
    #[case] agrees: bool,
) {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    g.operator_symbol("+", first).unwrap();
    assert_eq!(g.operator_symbol("+", second).is_ok(), agrees);
}

#[test]
fn test_flags_must_agree() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    g.term(";").unwrap();
    assert!(matches!(
        g.punctuation(";"),
        Err(Error::RegistrationConflict(_))
    ));
}

#[test]
fn test_node_name_conflict() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    g.definition_of::<first::Item>().unwrap();
    let err = g.definition_of::<second::Item>().unwrap_err();
    assert!(matches!(err, Error::RegistrationConflict(_)), "{err:?}");
}

#[test]
fn test_failing_rule_aborts() {
    let mut registry = GrammarRegistry::new();
    let err = registry.builder().definition_of::<Failing>().unwrap_err();
    assert!(matches!(err, Error::Rule { .. }));
    assert_eq!(err.to_string(), "invalid rule `Failing`: no rule today");
}

#[test]
fn test_composites_are_cached() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let num = g.node::<Num>().unwrap();
    let comma = g.punctuation(",").unwrap();

    let list = g.list::<i64>(num.clone(), Some(comma.clone()), ListOptions::PLUS).unwrap();
    let same = g.list::<i64>(num.clone(), Some(comma.clone()), ListOptions::PLUS).unwrap();
    let star = g.list::<i64>(num.clone(), Some(comma), ListOptions::STAR).unwrap();
    assert_eq!(list, same);
    assert_ne!(list, star);

    let optional = g.optional(num.clone()).unwrap();
    assert_eq!(optional, g.optional(num).unwrap());

    let list_id = list.as_term().unwrap();
    assert!(registry.term(list_id).has_flag(TermFlags::LIST));
    assert_eq!(registry.term(list_id).name(), "Num+");
}

#[test]
fn test_braces_register_symbols() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let num = g.node::<Num>().unwrap();
    let shape = g.braces("[", num, "]", true).unwrap();
    let term = registry.term(shape.as_term().unwrap());
    assert_eq!(term.name(), "[Num]");
    assert_eq!(
        term.rule().unwrap().display(registry.terms()).to_string(),
        "(\"[\" Num \"]\") | Num"
    );
    let open = registry.key_terms().get("[").unwrap();
    assert!(open.flags.contains(TermFlags::OPEN_BRACE));
}

#[test]
fn test_braces_are_registered_once() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let num = g.node::<Num>().unwrap();
    let shape = g.braces("(", num.clone(), ")", false).unwrap();
    let count = g.registry().terms().len();

    assert_eq!(g.braces("(", num.clone(), ")", false).unwrap(), shape);
    assert_eq!(g.registry().terms().len(), count);
    assert_ne!(g.braces("(", num.clone(), ")", true).unwrap(), shape);
    assert_ne!(g.braces("[", num, "]", false).unwrap(), shape);
}

#[test]
fn test_foreign_term_ids_are_rejected() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let num = g.node::<Num>().unwrap().as_term().unwrap();
    let foreign = TermId::new(500).unwrap();

    assert_eq!(g.definition(num).unwrap().name(), "Num");
    assert!(matches!(g.definition(foreign), Err(Error::InvalidState(_))));
    assert!(matches!(
        g.set_flag(foreign, TermFlags::NO_AST, true),
        Err(Error::InvalidState(_))
    ));
    g.set_flag(num, TermFlags::NO_AST, true).unwrap();
    assert!(registry.get(num).unwrap().has_flag(TermFlags::NO_AST));
    assert!(registry.get(foreign).is_none());
}

#[test]
fn test_hints_render_in_rules() {
    let mut registry = GrammarRegistry::new();
    let mut g = registry.builder();
    let num = g.node::<Num>().unwrap();
    let shape = num + g.prefer_shift() + g.shift_if("else", &["if"]);
    assert_eq!(
        shape.display(registry.terms()).to_string(),
        "Num %prefer-shift %shift-if(\"else\" < if)"
    );
}

#[rstest]
#[case(type_label::<Num>(), "Num")]
#[case(type_label::<Vec<i64>>(), "Vec")]
#[case(type_label::<first::Item>(), "Item")]
fn test_type_label(#[case] label: smol_str::SmolStr, #[case] expected: &str) {
    assert_eq!(label.as_str(), expected);
}

#[test]
fn test_shape_algebra() {
    let a = RuleShape::Term(TermId::new(1).unwrap());
    let b = RuleShape::Term(TermId::new(2).unwrap());
    let c = RuleShape::Term(TermId::new(3).unwrap());

    assert_eq!(
        a.clone() + b.clone() + c.clone(),
        RuleShape::Sequence(vec![a.clone(), b.clone(), c.clone()])
    );
    assert_eq!(
        a.clone() | b.clone() | c.clone(),
        RuleShape::Choice(vec![a.clone(), b.clone(), c])
    );
    assert_eq!(RuleShape::Empty + a.clone(), a);
    assert_eq!(a.clone().then(RuleShape::Empty), a);
}

#[derive(Default)]
struct Calc;

impl GrammarDefinition for Calc {
    type Root = Num;
}

#[test]
fn test_grammar_lifecycle() {
    let mut grammar = Grammar::new(Calc);
    assert!(!grammar.is_built());
    assert!(matches!(
        grammar.parse("1", "input"),
        Err(Error::InvalidState(_))
    ));
    assert!(grammar.build().unwrap());
    assert!(!grammar.build().unwrap());
    assert_eq!(*grammar.parse("42", "input").unwrap().value(), 42);
    assert_eq!(grammar.language().unwrap().name(), "Calc");
}
