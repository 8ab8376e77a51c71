use heck::{ToSnakeCase, ToUpperCamelCase};
use sia_schema::{
    fixed_byte_length, resolve_string_type, DefaultValue, Definition, FieldDefinition, FieldSet, FixedLength, Literal,
    MethodDefinition, PluginDefinition, ResolvedType, SchemaDefinition, SchemaIndex, SiaType,
};
use tracing::debug;

use crate::{backend::Backend, error::SiaError, utils::quote};

/// Converts a schema or plugin name to a Rust type name, `self` -> `Self_`.
fn type_name(s: &str) -> String {
    escape_rust_keyword(&s.to_upper_camel_case())
}

/// Converts a field or method name to a Rust identifier, `sessionID` -> `session_id`.
fn member_name(s: &str) -> String {
    escape_rust_keyword(&s.to_snake_case())
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl",
        "in", "let", "loop", "match", "mod", "move", "mut",
        "pub", "ref", "return", "self", "Self", "static",
        "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// Maps a primitive to the Rust type holding its decoded value.
fn primitive_type(ty: SiaType) -> &'static str {
    match ty {
        SiaType::Int8   => "i8",
        SiaType::Int16  => "i16",
        SiaType::Int32  => "i32",
        SiaType::Int64  => "i64",
        SiaType::UInt8  => "u8",
        SiaType::UInt16 => "u16",
        SiaType::UInt32 => "u32",
        SiaType::UInt64 => "u64",
        SiaType::BigInt => "u64",
        SiaType::Bool   => "bool",
        ty if ty.is_string() => "String",
        _ => "Vec<u8>",
    }
}

/// Whether `n` is representable by the Rust type of an integer primitive.
fn integer_fits(ty: SiaType, n: i64) -> bool {
    match ty {
        SiaType::Int8   => i8::try_from(n).is_ok(),
        SiaType::Int16  => i16::try_from(n).is_ok(),
        SiaType::Int32  => i32::try_from(n).is_ok(),
        SiaType::Int64  => true,
        SiaType::UInt8  => u8::try_from(n).is_ok(),
        SiaType::UInt16 => u16::try_from(n).is_ok(),
        SiaType::UInt32 => u32::try_from(n).is_ok(),
        SiaType::UInt64 | SiaType::BigInt => u64::try_from(n).is_ok(),
        _ => false,
    }
}

/// Settings of the Rust backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RustOptions {
    /// Wrap the output in `pub mod <module> { ... }`.
    pub module: Option<String>,
}

/// Emits one struct with an `impl Default` per schema and one trait per
/// plugin.
pub struct RustBackend<'a> {
    definitions: &'a [Definition],
    index:       SchemaIndex<'a>,
    options:     RustOptions,
}

impl<'a> RustBackend<'a> {
    pub fn new(definitions: &'a [Definition], options: RustOptions) -> Self {
        RustBackend {
            definitions,
            index: SchemaIndex::new(definitions),
            options,
        }
    }

    fn field_type(&self, field: &FieldDefinition) -> Result<String, SiaError> {
        let base = match self.index.resolve(field)? {
            ResolvedType::Primitive(ty) => primitive_type(ty).to_string(),
            ResolvedType::Schema(schema) => type_name(&schema.name),
        };
        let ty = if field.is_array { format!("Vec<{}>", base) } else { base };
        Ok(if field.optional { format!("Option<{}>", ty) } else { ty })
    }

    /// Wire details that the Rust type alone does not show.
    fn field_docs(&self, field: &FieldDefinition) -> Result<Vec<String>, SiaError> {
        let mut docs = Vec::new();
        match field.primitive() {
            Some(SiaType::String) => {
                if let Some(ty) = resolve_string_type(field) {
                    docs.push(format!("Encoded as `{}`.", ty));
                }
            }
            Some(SiaType::ByteN) => match fixed_byte_length(field)? {
                FixedLength::Exact(n) => docs.push(format!("Exactly {} bytes.", n)),
                FixedLength::FromEnd(n) => docs.push(format!("Runs until {} bytes before the end of the buffer.", n)),
            },
            _ => {}
        }
        if let Some(size) = field.array_size {
            docs.push(format!("Holds {} items.", size));
        }
        Ok(docs)
    }

    fn default_expr(&self, field: &FieldDefinition) -> Result<String, SiaError> {
        if field.is_array && field.default_value.is_some() {
            return Err(SiaError::BackendError(format!(
                "The array field {} cannot have a default value",
                quote(&field.name)
            )));
        }
        let expr = match self.index.default_value(field)? {
            DefaultValue::Explicit(ref literal) => self.literal_expr(field, literal)?,
            _ if field.optional => return Ok("None".to_string()),
            DefaultValue::EmptyString => "String::new()".to_string(),
            DefaultValue::Zero => "0".to_string(),
            DefaultValue::False => "false".to_string(),
            DefaultValue::EmptyBytes | DefaultValue::EmptyArray => "Vec::new()".to_string(),
            DefaultValue::Schema { ref name, .. } => format!("{}::default()", type_name(name)),
        };
        Ok(if field.optional { format!("Some({})", expr) } else { expr })
    }

    fn literal_expr(&self, field: &FieldDefinition, literal: &Literal) -> Result<String, SiaError> {
        let mismatch = || {
            SiaError::BackendError(format!(
                "The default value {} does not fit the field {} of type {}",
                quote(&literal.to_string()),
                quote(&field.name),
                quote(&field.type_)
            ))
        };
        let ty = field.primitive().ok_or_else(mismatch)?;
        match literal {
            Literal::Text(text) if ty.is_string() => Ok(format!("{:?}.to_string()", text)),
            other if ty.is_string() => Ok(format!("{:?}.to_string()", other.to_string())),
            Literal::Integer(n) if integer_fits(ty, *n) => Ok(n.to_string()),
            Literal::Bool(value) if ty.is_bool() => Ok(value.to_string()),
            Literal::Text(text) if ty.is_bool() && (text == "true" || text == "false") => Ok(text.clone()),
            Literal::Text(text) if ty.is_byte_array() => Ok(format!("{:?}.as_bytes().to_vec()", text)),
            _ => Err(mismatch()),
        }
    }

    fn returns_type(&self, returns: &FieldSet) -> Result<String, SiaError> {
        let types = returns
            .as_slice()
            .iter()
            .map(|field| self.field_type(field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match types.as_slice() {
            [] => "()".to_string(),
            [single] => single.clone(),
            many => format!("({})", many.join(", ")),
        })
    }

    fn method_to_code(&self, method: &MethodDefinition) -> Result<String, SiaError> {
        let mut lines = Vec::new();
        if let Some(ref timeout) = method.timeout {
            lines.push(format!("    /// Timeout: {}.", timeout));
        }
        let mut params = String::new();
        for field in method.fields.as_slice() {
            params.push_str(&format!(", {}: {}", member_name(&field.name), self.field_type(field)?));
        }
        lines.push(format!(
            "    fn {}(&self{}) -> {};",
            member_name(&method.name),
            params,
            self.returns_type(&method.returns)?
        ));
        Ok(lines.join("\n"))
    }

    pub fn plugin_to_code(&self, plugin: &PluginDefinition) -> Result<String, SiaError> {
        let methods = plugin
            .methods
            .iter()
            .map(|method| self.method_to_code(method))
            .collect::<Result<Vec<_>, _>>()?;

        let mut code = format!("/// Methods of plugin `{}`.\npub trait {} {{\n", plugin.name, type_name(&plugin.as_name));
        if !methods.is_empty() {
            code.push_str(&methods.join("\n\n"));
            code.push('\n');
        }
        code.push_str("}\n");
        Ok(code)
    }
}

impl Backend for RustBackend<'_> {
    fn schema_to_code(&self, schema: &SchemaDefinition) -> Result<String, SiaError> {
        let name = type_name(&schema.name);
        let mut fields = Vec::new();
        let mut defaults = Vec::new();

        for field in &schema.fields {
            let rust_field_name = member_name(&field.name);
            for doc in self.field_docs(field)? {
                fields.push(format!("    /// {}", doc));
            }
            fields.push(format!("    pub {}: {},", rust_field_name, self.field_type(field)?));
            defaults.push(format!("            {}: {},", rust_field_name, self.default_expr(field)?));
        }

        let mut lines = vec!["#[derive(Debug, Clone, PartialEq)]".to_string(), format!("pub struct {} {{", name)];
        lines.extend(fields);
        lines.push("}".to_string());
        lines.push(String::new());
        lines.push(format!("impl Default for {} {{", name));
        lines.push("    fn default() -> Self {".to_string());
        if defaults.is_empty() {
            lines.push(format!("        {} {{}}", name));
        } else {
            lines.push(format!("        {} {{", name));
            lines.extend(defaults);
            lines.push("        }".to_string());
        }
        lines.push("    }".to_string());
        lines.push("}".to_string());

        Ok(lines.join("\n") + "\n")
    }

    fn to_code(&self) -> Result<String, SiaError> {
        let mut sections = Vec::new();

        for schema in self.index.dependency_order()? {
            sections.push(self.schema_to_code(schema)?);
        }
        for plugin in self.definitions.iter().filter_map(Definition::as_plugin) {
            sections.push(self.plugin_to_code(plugin)?);
        }
        debug!(sections = sections.len(), "generated Rust code");

        let mut rust_code = String::from("// Code generated by sia. DO NOT EDIT.\n\n");
        if let Some(ref module) = self.options.module {
            rust_code.push_str(&format!("pub mod {} {{\n", member_name(module)));
        }
        rust_code.push_str(&sections.join("\n"));
        if self.options.module.is_some() {
            rust_code.push_str("}\n");
        }
        Ok(rust_code)
    }
}
