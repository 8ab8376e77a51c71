use std::collections::HashSet;

use crate::{
    cst::{CompilationUnit, Item},
    error::SiaError,
    utils::{quote, verifier_error},
};

/// Rejects a definition whose name was already used by an earlier schema or
/// plugin, reporting the position of the later one. Field types are
/// deliberately not checked here; dangling references surface when a backend
/// resolves them.
pub fn verify_unit(unit: &CompilationUnit<'_>) -> Result<(), SiaError> {
    let mut defined: HashSet<String> = HashSet::new();
    for item in &unit.items {
        let (name, token) = match item {
            Item::Schema(node) => (node.name.text.clone(), node.name),
            Item::Plugin(node) => match node.path.first() {
                Some(first) => (
                    node.path.iter().map(|tok| tok.text.as_str()).collect::<Vec<_>>().join("."),
                    *first,
                ),
                None => continue,
            },
        };
        if defined.contains(&name) {
            return Err(verifier_error(
                &format!("The name {} is defined twice", quote(&name)),
                token.line,
                token.column,
            ));
        }
        defined.insert(name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_schema, tokenizer::tokenize_schema};
    use pretty_assertions::assert_eq;

    fn verify_source(input: &str) -> Result<(), SiaError> {
        let tokens = tokenize_schema(input).unwrap();
        verify_unit(&parse_schema(&tokens).unwrap())
    }

    #[test]
    fn test_unique_names_pass() {
        assert!(verify_source("schema A { } schema B { } plugin a.b { }").is_ok());
    }

    #[test]
    fn test_duplicate_schema_reports_second_declaration() {
        let err = verify_source("schema A { }\nschema B { }\n  schema A { x int8 }").unwrap_err();
        assert_eq!(err.location(), Some((3, 10)));
        assert_eq!(err.message(), "The name \"A\" is defined twice");
    }

    #[test]
    fn test_schema_and_plugin_share_one_namespace() {
        let err = verify_source("schema a { }\nplugin a { }").unwrap_err();
        assert_eq!(err.location(), Some((2, 8)));

        let err = verify_source("plugin x.y { } plugin x.y { }").unwrap_err();
        assert_eq!(err.message(), "The name \"x.y\" is defined twice");
    }
}
