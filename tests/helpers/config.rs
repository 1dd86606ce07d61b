//! A small configuration language: `let name[: type] = value;` bindings.

use node_parser::prelude::*;

#[derive(Debug, Default)]
pub struct Config;

impl GrammarDefinition for Config {
    type Root = Document;

    fn comments(&self) -> Vec<CommentTerminal> {
        vec![
            CommentTerminal::line("line-comment", "//"),
            CommentTerminal::block("block-comment", "/*", "*/"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Flag(bool),
    Number(i64),
    Text(String),
    Items(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub declared: Option<String>,
    pub value: Setting,
    /// Zero-based line of the binding.
    pub line: u32,
}

/// `Document ::= Binding*`
#[derive(Default)]
pub struct Document;

impl NodeType for Document {
    type Value = Vec<Entry>;

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let binding = g.node::<Binding>()?;
        g.list::<Entry>(binding, None, ListOptions::STAR)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<Vec<Entry>> {
        let entries = ctx.node::<ListNode<Entry>>(0)?;
        Ok(entries.values().cloned().collect())
    }
}

/// `Binding ::= "let" Identifier (":" Identifier)? "=" SettingValue ";"`
#[derive(Default)]
pub struct Binding;

impl NodeType for Binding {
    type Value = Entry;

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let intro = g.keyword("let")?;
        let intro = g.no_ast(intro)?;
        let name = g.identifier::<Identifier>()?;
        let annotation = g.punctuation(":")? + name.clone();
        let annotation = g.optional(annotation)?;
        let value = g.node::<SettingValue>()?;
        Ok(intro + name + annotation + g.punctuation("=")? + value + g.punctuation(";")?)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<Entry> {
        let declared = ctx.node::<OptionalNode>(1)?;
        Ok(Entry {
            name: ctx.value::<String>(0)?.clone(),
            declared: declared.get().map(|node| node.typed_value::<String>().cloned()).transpose()?,
            value: ctx.value::<Setting>(2)?.clone(),
            line: ctx.location().line(),
        })
    }
}

#[derive(Default)]
pub struct Boolean;

impl ConstantType for Boolean {
    type Value = bool;

    fn constants(&self) -> Vec<Constant<bool>> {
        vec![Constant::new("true", true), Constant::new("false", false)]
    }

    fn are_keywords(&self) -> bool {
        true
    }
}

/// `SettingValue ::= Boolean | Size | integer | string | "[" (integer ("," integer)* ","?)? "]"`
///
/// `Size` is `integer "kb"`, scaled to bytes by a custom node.
#[derive(Default)]
pub struct SettingValue;

impl NodeType for SettingValue {
    type Value = Setting;

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let boolean = g.constant::<Boolean>()?;
        let integer = g.literal::<IntegerLiteral>()?;
        let text = g.literal::<StringLiteral>()?;

        let unit = g.keyword("kb")?;
        let size = g.custom_node("Size", integer.clone() + unit, |position| {
            let (location, nodes) = position.into_nodes();
            let Some(count) = nodes.first() else {
                return Err(Error::node(&location, "size without a count"));
            };
            let kilobytes = *count.typed_value::<i64>()?;
            let bytes = kilobytes
                .checked_mul(1024)
                .ok_or_else(|| Error::node(&location, "size overflows"))?;
            Ok(Box::new(LiteralNode::new(location, bytes, format!("{kilobytes}kb"))) as Node)
        })?;

        let comma = g.punctuation(",")?;
        let items = g.list::<i64>(integer.clone(), Some(comma), ListOptions::STAR.with_trailing())?;
        let items = g.braces("[", items, "]", false)?;

        Ok(boolean | size | integer | text | items)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<Setting> {
        let value = ctx.child(0)?;
        if let Some(braces) = value.downcast_ref::<BraceNode>() {
            let items = braces.nested().node_as::<ListNode<i64>>()?;
            return Ok(Setting::Items(items.values().copied().collect()));
        }
        if let Ok(flag) = value.typed_value::<bool>() {
            return Ok(Setting::Flag(*flag));
        }
        if let Ok(number) = value.typed_value::<i64>() {
            return Ok(Setting::Number(*number));
        }
        Ok(Setting::Text(value.typed_value::<String>()?.clone()))
    }
}

/// `Atom ::= "(" integer ")" | integer`
#[derive(Debug, Default)]
pub struct Atoms;

impl GrammarDefinition for Atoms {
    type Root = Atom;
}

#[derive(Default)]
pub struct Atom;

impl NodeType for Atom {
    type Value = (i64, bool);

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let integer = g.literal::<IntegerLiteral>()?;
        g.braces("(", integer, ")", true)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<(i64, bool)> {
        let braces = ctx.node::<BraceNode>(0)?;
        Ok((*ctx.value::<i64>(0)?, braces.is_bracketed()))
    }
}

/// `Maybe ::= integer?`
#[derive(Debug, Default)]
pub struct MaybeNumber;

impl GrammarDefinition for MaybeNumber {
    type Root = Maybe;
}

#[derive(Default)]
pub struct Maybe;

impl NodeType for Maybe {
    /// Whether the optional holds a value, and whether reading it fails.
    type Value = (bool, bool);

    fn rule(&self, g: &mut RuleBuilder<'_>) -> Result<RuleShape> {
        let integer = g.literal::<IntegerLiteral>()?;
        g.optional(integer)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<(bool, bool)> {
        let node: &dyn ValueNode = ctx.node::<OptionalNode>(0)?;
        Ok((node.has_value(), matches!(node.value(), Err(Error::InvalidState(_)))))
    }
}
