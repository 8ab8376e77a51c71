use sia_schema::{
    Definition, FieldDefinition, FieldSet, Literal, MethodDefinition, PluginDefinition, SchemaDefinition,
};
use tracing::{debug, warn};

use crate::{
    cst::{CompilationUnit, FieldNode, Item, MethodNode, OptionEntry, ParamsNode, PluginNode, SchemaNode},
    tokenizer::{Token, TokenKind},
    utils::{lower_camel, unquote, upper_camel},
};

/// Restructures a parsed compilation unit into the Schema IR, keeping
/// source order. Never fails: every syntactic problem was already reported
/// by the tokenizer or the parser.
pub fn build(unit: &CompilationUnit<'_>) -> Vec<Definition> {
    let definitions: Vec<Definition> = unit
        .items
        .iter()
        .map(|item| match item {
            Item::Schema(node) => Definition::Schema(visit_schema(node)),
            Item::Plugin(node) => Definition::Plugin(visit_plugin(node)),
        })
        .collect();
    debug!(definitions = definitions.len(), "built schema IR");
    definitions
}

fn visit_schema(node: &SchemaNode<'_>) -> SchemaDefinition {
    SchemaDefinition {
        name:   node.name.text.clone(),
        fields: node.fields.iter().map(visit_field).collect(),
    }
}

fn visit_plugin(node: &PluginNode<'_>) -> PluginDefinition {
    let name = node
        .path
        .iter()
        .map(|tok| tok.text.as_str())
        .collect::<Vec<_>>()
        .join(".");

    let as_name = match node.as_name {
        Some(tok) => tok.text.clone(),
        None => node.path.first().map(|tok| upper_camel(&tok.text)).unwrap_or_default(),
    };

    PluginDefinition {
        name,
        as_name,
        methods: node.methods.iter().map(visit_method).collect(),
    }
}

fn visit_method(node: &MethodNode<'_>) -> MethodDefinition {
    let mut method = MethodDefinition {
        name:    node.name.text.clone(),
        fields:  visit_params(&node.params),
        returns: visit_params(&node.returns),
        timeout: None,
    };
    for entry in node.options.iter().flat_map(|options| &options.entries) {
        match entry.key.text.as_str() {
            "timeout" => method.timeout = Some(literal(entry.value)),
            _ => ignore_option(entry, "method"),
        }
    }
    method
}

/// A bare type becomes one synthesized field named after it
/// (`Person` -> `person: Person`).
fn visit_params(node: &ParamsNode<'_>) -> FieldSet {
    match node {
        ParamsNode::Named(tok) => FieldSet::Single(FieldDefinition::new(lower_camel(&tok.text), tok.text.clone())),
        ParamsNode::Block(fields) => FieldSet::Many(fields.iter().map(visit_field).collect()),
    }
}

fn visit_field(node: &FieldNode<'_>) -> FieldDefinition {
    let mut field = FieldDefinition::new(node.name.text.clone(), node.type_name.text.clone());
    field.optional = node.optional.is_some();

    for entry in node.options.iter().flat_map(|options| &options.entries) {
        apply_field_option(&mut field, entry);
    }

    if let Some(ref array) = node.array {
        field.is_array = true;
        if let Some(size) = array.size {
            field.array_size = size.text.parse().ok();
        }
    }

    if let Some(tok) = node.default {
        field.default_value = Some(literal(tok));
    }

    field
}

fn apply_field_option(field: &mut FieldDefinition, entry: &OptionEntry<'_>) {
    let value = literal(entry.value);
    match entry.key.text.as_str() {
        "min"      => field.min = Some(value),
        "max"      => field.max = Some(value),
        "encoding" => field.encoding = Some(value),
        "length"   => field.length = Some(value),
        "fromEnd"  => field.from_end = Some(value),
        "arraySize" => match value.as_u64() {
            Some(size) if size > 0 => field.array_size = Some(size),
            _ => ignore_option(entry, "field"),
        },
        _ => ignore_option(entry, "field"),
    }
}

fn ignore_option(entry: &OptionEntry<'_>, owner: &str) {
    warn!(
        key = %entry.key.text,
        line = entry.key.line,
        column = entry.key.column,
        "ignoring unsupported {} option",
        owner
    );
}

/// String literals lose their quotes, numbers are parsed, identifiers are
/// kept as text.
fn literal(tok: &Token) -> Literal {
    match tok.kind {
        TokenKind::StringLiteral => Literal::Text(unquote(&tok.text).to_string()),
        TokenKind::NumberLiteral => {
            Literal::parse_number(&tok.text).unwrap_or_else(|| Literal::Text(tok.text.clone()))
        }
        _ => Literal::Text(tok.text.clone()),
    }
}
