//! The Schema IR: the only artifact that leaves the front end.
//!
//! The serde shape of these types is the interchange format (`sia ir`):
//! definitions carry a `"type"` tag, fields use camelCase keys, and absent
//! optional attributes are omitted rather than written as `null`/`false`.

use std::fmt;
use std::slice;

use serde::{Deserialize, Serialize};

use crate::types::SiaType;

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Definition {
    Schema(SchemaDefinition),
    Plugin(PluginDefinition),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Schema(schema) => &schema.name,
            Definition::Plugin(plugin) => &plugin.name,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaDefinition> {
        match self {
            Definition::Schema(schema) => Some(schema),
            Definition::Plugin(_) => None,
        }
    }

    pub fn as_plugin(&self) -> Option<&PluginDefinition> {
        match self {
            Definition::Plugin(plugin) => Some(plugin),
            Definition::Schema(_) => None,
        }
    }
}

/// Iterates over the schema definitions of a compilation unit, in order.
pub fn schemas(definitions: &[Definition]) -> impl Iterator<Item = &SchemaDefinition> {
    definitions.iter().filter_map(Definition::as_schema)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name:   String,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDefinition {
    /// Dotted plugin path, e.g. `swiss.timeleap.isWizard.v1`.
    pub name:    String,
    #[serde(rename = "as")]
    pub as_name: String,
    pub methods: Vec<MethodDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name:    String,
    pub fields:  FieldSet,
    pub returns: FieldSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Literal>,
}

/// Parameters or results of a method.
///
/// `Single` comes from the shorthand form (`method m Person returns bool`),
/// `Many` from an explicit `{ ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSet {
    Single(FieldDefinition),
    Many(Vec<FieldDefinition>),
}

impl FieldSet {
    pub fn as_slice(&self) -> &[FieldDefinition] {
        match self {
            FieldSet::Single(field) => slice::from_ref(field),
            FieldSet::Many(fields)  => fields,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, FieldSet::Single(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_end: Option<Literal>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        FieldDefinition {
            name:  name.into(),
            type_: type_.into(),
            ..Default::default()
        }
    }

    /// The primitive type of this field, or `None` if it names a schema.
    pub fn primitive(&self) -> Option<SiaType> {
        SiaType::from_name(&self.type_)
    }
}

/// A typed option or default value.
///
/// Numbers keep their integer-ness so that `8` serializes back as `8`;
/// identifiers and de-quoted string literals are both `Text`. `Bool` only
/// comes from IR read back from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Parses the text of a number literal (`-?\d+(\.\d+)?`).
    pub fn parse_number(text: &str) -> Option<Literal> {
        if !text.contains('.') {
            if let Ok(value) = text.parse::<i64>() {
                return Some(Literal::Integer(value));
            }
        }
        text.parse::<f64>().ok().map(Literal::Float)
    }

    /// Non-negative whole numbers only.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Literal::Integer(value) => u64::try_from(value).ok(),
            Literal::Float(value) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => {
                Some(value as u64)
            }
            _ => None,
        }
    }

    /// Any number, as written. Integers beyond 2^53 lose precision.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Literal::Integer(value) => Some(value as f64),
            Literal::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value)    => write!(f, "{}", value),
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Float(value)   => write!(f, "{}", value),
            Literal::Text(text)     => f.write_str(text),
        }
    }
}
