//! Integer arithmetic with precedence, parentheses and `#` comments.

use node_parser::prelude::*;

#[derive(Debug, Default)]
pub struct Calculator;

impl GrammarDefinition for Calculator {
    type Root = Expression;

    fn comments(&self) -> Vec<CommentTerminal> {
        vec![CommentTerminal::line("comment", "#")]
    }
}

#[derive(Default)]
pub struct ArithmeticOperator;

impl OperatorType for ArithmeticOperator {
    type Value = char;

    fn operators(&self) -> Vec<Operator<char>> {
        vec![
            Operator::left("+", '+', 1),
            Operator::left("-", '-', 1),
            Operator::left("*", '*', 2),
            Operator::left("/", '/', 2),
            Operator::right("^", '^', 3),
        ]
    }
}

/// `Expression ::= Operand (ArithmeticOperator Operand)*`
#[derive(Default)]
pub struct Expression;

impl NodeType for Expression {
    type Value = i64;

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let operand = g.node::<Operand>()?;
        let operator = g.operator::<ArithmeticOperator>()?;
        Ok(operand.clone() + (operator + operand).star())
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<i64> {
        fold_operators(
            ctx.children(),
            |node| node.typed_value::<i64>().copied(),
            |lhs, operator: &char, rhs| match *operator {
                '+' => Ok(lhs + rhs),
                '-' => Ok(lhs - rhs),
                '*' => Ok(lhs * rhs),
                '/' if rhs == 0 => Err(Error::node(ctx.location(), "division by zero")),
                '/' => Ok(lhs / rhs),
                '^' => Ok(lhs.pow(u32::try_from(rhs).unwrap_or(0))),
                other => Err(Error::node(ctx.location(), format!("unknown operator {other}"))),
            },
        )
    }
}

/// `Operand ::= integer | "(" Expression ")"`
#[derive(Default)]
pub struct Operand;

impl NodeType for Operand {
    type Value = i64;

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let number = g.literal::<IntegerLiteral>()?;
        let nested = g.node::<Expression>()?;
        let group = g.braces("(", nested, ")", false)?;
        Ok(number | group)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<i64> {
        ctx.value::<i64>(0).copied()
    }
}
