//! Type resolution rules shared by every backend.
//!
//! These functions only look at the IR. Backends must go through them instead
//! of re-deriving the rules, so that every target language agrees on string
//! widths, default values and declaration order.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use crate::{
    error::ResolveError,
    ir::{Definition, FieldDefinition, Literal, SchemaDefinition},
    types::SiaType,
};

/// Used when a generic `string` field carries no `max` option.
pub const DEFAULT_STRING_MAX: u64 = 255;

/// Picks the narrowest width-qualified string whose length prefix can hold
/// `max` bytes.
pub fn string_type_for_length(max: Option<u64>) -> SiaType {
    let max = max.unwrap_or(DEFAULT_STRING_MAX);
    if max <= u8::MAX as u64 {
        SiaType::String8
    } else if max <= u16::MAX as u64 {
        SiaType::String16
    } else if max <= u32::MAX as u64 {
        SiaType::String32
    } else {
        SiaType::String64
    }
}

/// The primitive a field is encoded as. A generic `string` is narrowed with
/// [`string_type_for_length`] using its `max` option; every other primitive
/// is returned as is. `None` for schema-typed fields.
///
/// A fractional `max` is rounded up and one beyond `u64` saturates, so the
/// chosen prefix can always hold `max` bytes. A textual `max` counts as absent.
pub fn resolve_string_type(field: &FieldDefinition) -> Option<SiaType> {
    match field.primitive()? {
        SiaType::String => Some(string_type_for_length(field.max.as_ref().and_then(max_length))),
        other => Some(other),
    }
}

fn max_length(max: &Literal) -> Option<u64> {
    let max = max.as_f64()?.ceil();
    if max.is_nan() || max <= 0.0 {
        Some(0)
    } else if max >= u64::MAX as f64 {
        Some(u64::MAX)
    } else {
        Some(max as u64)
    }
}

/// How many bytes a `byteN` field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedLength {
    /// `length = N`
    Exact(u64),
    /// `fromEnd = N`: everything up to N bytes before the end of the buffer.
    FromEnd(u64),
}

pub fn fixed_byte_length(field: &FieldDefinition) -> Result<FixedLength, ResolveError> {
    if let Some(length) = field.length.as_ref().and_then(Literal::as_u64) {
        return Ok(FixedLength::Exact(length));
    }
    if let Some(from_end) = field.from_end.as_ref().and_then(Literal::as_u64) {
        return Ok(FixedLength::FromEnd(from_end));
    }
    Err(ResolveError::MissingFixedLength {
        field: field.name.clone(),
    })
}

/// Array element helpers needed to encode every array field of `schemas`,
/// deduplicated, in order of first use. Byte arrays are written in one piece
/// and schema-typed elements use the schema's own serializer, so neither
/// contributes a helper.
pub fn required_serializers<'a, I>(schemas: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a SchemaDefinition>,
{
    let mut helpers = IndexSet::new();
    for schema in schemas {
        for field in schema.fields.iter().filter(|f| f.is_array) {
            match field.primitive() {
                Some(ty) if !ty.is_byte_array() => {
                    helpers.insert(ty.array_item_serializer());
                }
                _ => {}
            }
        }
    }
    helpers.into_iter().collect()
}

/// What a field's type refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedType<'a> {
    Primitive(SiaType),
    Schema(&'a SchemaDefinition),
}

/// The value a field takes when the encoded data does not provide one.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Written in the schema with `= value`.
    Explicit(Literal),
    EmptyString,
    /// Integers and `bigint`.
    Zero,
    False,
    EmptyBytes,
    EmptyArray,
    /// A nested schema with every field at its own default.
    Schema {
        name:   String,
        fields: Vec<(String, DefaultValue)>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Name lookup over the schemas of one compilation unit.
///
/// When two schemas share a name the first declaration wins.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex<'a> {
    schemas: IndexMap<&'a str, &'a SchemaDefinition>,
}

impl<'a> SchemaIndex<'a> {
    pub fn new(definitions: &'a [Definition]) -> Self {
        Self::from_schemas(crate::ir::schemas(definitions))
    }

    pub fn from_schemas<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = &'a SchemaDefinition>,
    {
        let mut index = IndexMap::new();
        for schema in schemas {
            index.entry(schema.name.as_str()).or_insert(schema);
        }
        SchemaIndex { schemas: index }
    }

    pub fn get(&self, name: &str) -> Option<&'a SchemaDefinition> {
        self.schemas.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schemas in declaration order.
    pub fn schemas(&self) -> impl Iterator<Item = &'a SchemaDefinition> + '_ {
        self.schemas.values().copied()
    }

    pub fn resolve(&self, field: &FieldDefinition) -> Result<ResolvedType<'a>, ResolveError> {
        if let Some(ty) = field.primitive() {
            return Ok(ResolvedType::Primitive(ty));
        }
        self.get(&field.type_)
            .map(ResolvedType::Schema)
            .ok_or_else(|| ResolveError::UnresolvedType {
                type_name: field.type_.clone(),
                field:     field.name.clone(),
            })
    }

    /// Default for a single field. Optional fields follow the same rules.
    pub fn default_value(&self, field: &FieldDefinition) -> Result<DefaultValue, ResolveError> {
        let mut stack = Vec::new();
        self.field_default(field, &mut stack)
    }

    /// The all-defaults instance of `schema`.
    pub fn schema_default(&self, schema: &'a SchemaDefinition) -> Result<DefaultValue, ResolveError> {
        let mut stack = Vec::new();
        self.expand_schema(schema, &mut stack)
    }

    fn field_default(
        &self,
        field: &FieldDefinition,
        stack: &mut Vec<&'a str>,
    ) -> Result<DefaultValue, ResolveError> {
        if let Some(ref value) = field.default_value {
            return Ok(DefaultValue::Explicit(value.clone()));
        }
        if field.is_array {
            return Ok(DefaultValue::EmptyArray);
        }
        match self.resolve(field)? {
            ResolvedType::Primitive(ty) if ty.is_string()     => Ok(DefaultValue::EmptyString),
            ResolvedType::Primitive(ty) if ty.is_byte_array() => Ok(DefaultValue::EmptyBytes),
            ResolvedType::Primitive(ty) if ty.is_bool()       => Ok(DefaultValue::False),
            ResolvedType::Primitive(_)                        => Ok(DefaultValue::Zero),
            ResolvedType::Schema(schema)                      => self.expand_schema(schema, stack),
        }
    }

    fn expand_schema(
        &self,
        schema: &'a SchemaDefinition,
        stack: &mut Vec<&'a str>,
    ) -> Result<DefaultValue, ResolveError> {
        if let Some(pos) = stack.iter().position(|name| *name == schema.name) {
            return Err(cycle(&stack[pos..], &schema.name));
        }
        stack.push(&schema.name);
        let mut fields = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            fields.push((field.name.clone(), self.field_default(field, stack)?));
        }
        stack.pop();
        Ok(DefaultValue::Schema {
            name: schema.name.clone(),
            fields,
        })
    }

    /// Orders schemas so that every schema comes after the schemas its fields
    /// refer to. Independent schemas keep their declaration order.
    pub fn dependency_order(&self) -> Result<Vec<&'a SchemaDefinition>, ResolveError> {
        let mut marks: HashMap<&'a str, Mark> = HashMap::new();
        let mut stack = Vec::new();
        let mut ordered = Vec::with_capacity(self.schemas.len());

        for schema in self.schemas() {
            self.visit(schema, &mut marks, &mut stack, &mut ordered)?;
        }
        Ok(ordered)
    }

    fn visit(
        &self,
        schema: &'a SchemaDefinition,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
        ordered: &mut Vec<&'a SchemaDefinition>,
    ) -> Result<(), ResolveError> {
        match marks.get(schema.name.as_str()) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let pos = stack.iter().position(|name| *name == schema.name).unwrap_or(0);
                return Err(cycle(&stack[pos..], &schema.name));
            }
            None => {}
        }

        marks.insert(&schema.name, Mark::Visiting);
        stack.push(&schema.name);
        for field in &schema.fields {
            if let ResolvedType::Schema(dependency) = self.resolve(field)? {
                self.visit(dependency, marks, stack, ordered)?;
            }
        }
        stack.pop();
        marks.insert(&schema.name, Mark::Done);
        ordered.push(schema);
        Ok(())
    }
}

fn cycle(path: &[&str], closing: &str) -> ResolveError {
    let mut path: Vec<String> = path.iter().map(|name| name.to_string()).collect();
    path.push(closing.to_string());
    ResolveError::CyclicReference { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema(name: &str, fields: Vec<FieldDefinition>) -> SchemaDefinition {
        SchemaDefinition {
            name: name.to_string(),
            fields,
        }
    }

    fn names(schemas: &[&SchemaDefinition]) -> Vec<String> {
        schemas.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_string_width_boundaries() {
        assert_eq!(string_type_for_length(None), SiaType::String8);
        assert_eq!(string_type_for_length(Some(255)), SiaType::String8);
        assert_eq!(string_type_for_length(Some(256)), SiaType::String16);
        assert_eq!(string_type_for_length(Some(65535)), SiaType::String16);
        assert_eq!(string_type_for_length(Some(65536)), SiaType::String32);
        assert_eq!(string_type_for_length(Some(4294967295)), SiaType::String32);
        assert_eq!(string_type_for_length(Some(4294967296)), SiaType::String64);
    }

    #[test]
    fn test_resolve_string_type_only_narrows_generic_strings() {
        let generic = FieldDefinition {
            min: Some(Literal::Integer(0)),
            max: Some(Literal::Integer(120)),
            ..FieldDefinition::new("bio", "string")
        };
        assert_eq!(resolve_string_type(&generic), Some(SiaType::String8));

        let long = FieldDefinition {
            max: Some(Literal::Integer(1000)),
            ..FieldDefinition::new("bio", "string")
        };
        assert_eq!(resolve_string_type(&long), Some(SiaType::String16));

        let sized = FieldDefinition {
            max: Some(Literal::Integer(1000)),
            ..FieldDefinition::new("bio", "string8")
        };
        assert_eq!(resolve_string_type(&sized), Some(SiaType::String8));
        assert_eq!(resolve_string_type(&FieldDefinition::new("a", "Address")), None);
    }

    #[test]
    fn test_string_width_for_unusual_max() {
        let string_with_max = |max: Literal| FieldDefinition {
            max: Some(max),
            ..FieldDefinition::new("bio", "string")
        };

        assert_eq!(resolve_string_type(&string_with_max(Literal::Float(300.5))), Some(SiaType::String16));
        assert_eq!(resolve_string_type(&string_with_max(Literal::Float(255.5))), Some(SiaType::String16));
        assert_eq!(resolve_string_type(&string_with_max(Literal::Float(4294967295.5))), Some(SiaType::String64));

        let huge = Literal::parse_number("99999999999999999999").unwrap();
        assert_eq!(resolve_string_type(&string_with_max(huge)), Some(SiaType::String64));

        assert_eq!(resolve_string_type(&string_with_max(Literal::Integer(-5))), Some(SiaType::String8));
        assert_eq!(resolve_string_type(&string_with_max(Literal::Text("long".into()))), Some(SiaType::String8));
    }

    #[test]
    fn test_fixed_byte_length() {
        let exact = FieldDefinition {
            length: Some(Literal::Integer(32)),
            ..FieldDefinition::new("hash", "byteN")
        };
        assert_eq!(fixed_byte_length(&exact), Ok(FixedLength::Exact(32)));

        let tail = FieldDefinition {
            from_end: Some(Literal::Integer(4)),
            ..FieldDefinition::new("body", "byteN")
        };
        assert_eq!(fixed_byte_length(&tail), Ok(FixedLength::FromEnd(4)));

        assert_eq!(
            fixed_byte_length(&FieldDefinition::new("raw", "byteN")),
            Err(ResolveError::MissingFixedLength { field: "raw".into() })
        );
    }

    #[test]
    fn test_required_serializers_dedup_in_first_use_order() {
        let array = |name: &str, ty: &str| FieldDefinition {
            is_array: true,
            ..FieldDefinition::new(name, ty)
        };
        let a = schema("A", vec![
            array("tags", "string8"),
            array("blob", "byte8"),
            FieldDefinition::new("id", "int32"),
            array("ids", "int32"),
        ]);
        let b = schema("B", vec![
            array("ids", "int32"),
            array("flags", "bool"),
            array("children", "A"),
        ]);
        assert_eq!(
            required_serializers([&a, &b]),
            vec![
                "serializeString8ArrayItem",
                "serializeInt32ArrayItem",
                "serializeBoolArrayItem",
            ]
        );
    }

    #[test]
    fn test_resolve_reports_unknown_types() {
        let defs = vec![Definition::Schema(schema("A", vec![]))];
        let index = SchemaIndex::new(&defs);
        assert!(matches!(
            index.resolve(&FieldDefinition::new("a", "A")),
            Ok(ResolvedType::Schema(_))
        ));
        assert_eq!(
            index.resolve(&FieldDefinition::new("x", "Missing")),
            Err(ResolveError::UnresolvedType {
                type_name: "Missing".into(),
                field:     "x".into(),
            })
        );
    }

    #[test]
    fn test_default_values() {
        let defs = vec![
            Definition::Schema(schema("Person", vec![
                FieldDefinition::new("name", "string8"),
                FieldDefinition::new("age", "uint8"),
                FieldDefinition {
                    optional: true,
                    ..FieldDefinition::new("nick", "string")
                },
                FieldDefinition::new("admin", "bool"),
                FieldDefinition::new("avatar", "byte16"),
                FieldDefinition::new("balance", "bigint"),
                FieldDefinition {
                    is_array: true,
                    ..FieldDefinition::new("tags", "string8")
                },
                FieldDefinition {
                    default_value: Some(Literal::Text("Zurich".into())),
                    ..FieldDefinition::new("city", "string8")
                },
                FieldDefinition::new("address", "Address"),
            ])),
            Definition::Schema(schema("Address", vec![FieldDefinition::new("zip", "int32")])),
        ];
        let index = SchemaIndex::new(&defs);
        let person = index.get("Person").unwrap();

        assert_eq!(
            index.schema_default(person),
            Ok(DefaultValue::Schema {
                name:   "Person".into(),
                fields: vec![
                    ("name".into(), DefaultValue::EmptyString),
                    ("age".into(), DefaultValue::Zero),
                    ("nick".into(), DefaultValue::EmptyString),
                    ("admin".into(), DefaultValue::False),
                    ("avatar".into(), DefaultValue::EmptyBytes),
                    ("balance".into(), DefaultValue::Zero),
                    ("tags".into(), DefaultValue::EmptyArray),
                    ("city".into(), DefaultValue::Explicit(Literal::Text("Zurich".into()))),
                    ("address".into(), DefaultValue::Schema {
                        name:   "Address".into(),
                        fields: vec![("zip".into(), DefaultValue::Zero)],
                    }),
                ],
            })
        );
    }

    #[test]
    fn test_default_value_rejects_cycles() {
        let defs = vec![
            Definition::Schema(schema("A", vec![FieldDefinition::new("b", "B")])),
            Definition::Schema(schema("B", vec![FieldDefinition::new("a", "A")])),
        ];
        let index = SchemaIndex::new(&defs);
        assert_eq!(
            index.default_value(&FieldDefinition::new("root", "A")),
            Err(ResolveError::CyclicReference {
                path: vec!["A".into(), "B".into(), "A".into()],
            })
        );
    }

    #[test]
    fn test_dependency_order_puts_dependencies_first() {
        let defs = vec![
            Definition::Schema(schema("Person", vec![
                FieldDefinition::new("name", "string8"),
                FieldDefinition::new("address", "Address"),
            ])),
            Definition::Schema(schema("Address", vec![
                FieldDefinition::new("street", "string8"),
                FieldDefinition::new("city", "City"),
            ])),
            Definition::Schema(schema("City", vec![FieldDefinition::new("zip", "int32")])),
            Definition::Schema(schema("Standalone", vec![])),
        ];
        let index = SchemaIndex::new(&defs);
        let ordered = index.dependency_order().unwrap();
        assert_eq!(names(&ordered), vec!["City", "Address", "Person", "Standalone"]);
    }

    #[test]
    fn test_dependency_order_visits_shared_dependency_once() {
        let defs = vec![
            Definition::Schema(schema("A", vec![FieldDefinition::new("c", "C")])),
            Definition::Schema(schema("B", vec![FieldDefinition::new("c", "C")])),
            Definition::Schema(schema("C", vec![])),
        ];
        let ordered = SchemaIndex::new(&defs).dependency_order().unwrap();
        assert_eq!(names(&ordered), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_dependency_order_rejects_cycles() {
        let defs = vec![
            Definition::Schema(schema("Node", vec![FieldDefinition {
                optional: true,
                ..FieldDefinition::new("next", "Node")
            }])),
        ];
        assert_eq!(
            SchemaIndex::new(&defs).dependency_order(),
            Err(ResolveError::CyclicReference {
                path: vec!["Node".into(), "Node".into()],
            })
        );
    }

    #[test]
    fn test_dependency_order_reports_dangling_types() {
        let defs = vec![Definition::Schema(schema("A", vec![FieldDefinition::new("x", "Nope")]))];
        assert!(matches!(
            SchemaIndex::new(&defs).dependency_order(),
            Err(ResolveError::UnresolvedType { .. })
        ));
    }
}
