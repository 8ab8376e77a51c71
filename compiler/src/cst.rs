//! Concrete syntax tree. One node type per grammar rule; nodes borrow their
//! tokens, so a tree never outlives the token buffer it was parsed from.

use crate::tokenizer::Token;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit<'t> {
    pub items: Vec<Item<'t>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item<'t> {
    Schema(SchemaNode<'t>),
    Plugin(PluginNode<'t>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode<'t> {
    pub name:   &'t Token,
    pub fields: Vec<FieldNode<'t>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluginNode<'t> {
    /// Segments of the dotted plugin name.
    pub path:    Vec<&'t Token>,
    pub as_name: Option<&'t Token>,
    pub methods: Vec<MethodNode<'t>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode<'t> {
    pub name:    &'t Token,
    pub options: Option<TypeOptionsNode<'t>>,
    pub params:  ParamsNode<'t>,
    pub returns: ParamsNode<'t>,
}

/// Parameters or return value of a method: a `{ ... }` block or a bare type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsNode<'t> {
    Block(Vec<FieldNode<'t>>),
    Named(&'t Token),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode<'t> {
    pub name:      &'t Token,
    pub optional:  Option<&'t Token>,
    pub type_name: &'t Token,
    pub options:   Option<TypeOptionsNode<'t>>,
    pub array:     Option<ArrayNode<'t>>,
    pub default:   Option<&'t Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeOptionsNode<'t> {
    pub entries: Vec<OptionEntry<'t>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry<'t> {
    pub key:   &'t Token,
    /// Identifier, number or string literal.
    pub value: &'t Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode<'t> {
    /// The number in `[N]`; `None` for `[]`.
    pub size: Option<&'t Token>,
}
