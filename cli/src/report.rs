use sia_compiler::SiaError;
use sia_schema::{required_serializers, schemas, Definition, SchemaIndex};

/// The source lines leading up to `line` (at most three), followed by a caret
/// under `column`.
pub fn excerpt(source: &str, line: usize, column: usize) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let end = line.min(lines.len());
    let start = end.saturating_sub(3);

    let mut out = lines[start..end].join("\n");
    out.push('\n');
    out.push_str(&" ".repeat(column.saturating_sub(1)));
    out.push('^');
    out
}

/// Formats a compiler error for the terminal. Lexing, parsing and verifier
/// errors get a source excerpt; everything else is a single line.
pub fn render(source: &str, filename: &str, err: &SiaError) -> String {
    let stage = match err {
        SiaError::LexError { .. } => "Lexing",
        SiaError::ParseError { .. } => "Parsing",
        SiaError::VerifierError { .. } => "Verification",
        other => return format!("Error in {}: {}", filename, other),
    };
    match err.location() {
        Some((line, column)) => format!(
            "{} error in {} at line {}:{}\n\n{}\n\n{}",
            stage,
            filename,
            line,
            column,
            excerpt(source, line, column),
            err.message()
        ),
        None => format!("{} error in {}: {}", stage, filename, err.message()),
    }
}

/// Summary printed by `sia info`.
pub fn describe(definitions: &[Definition]) -> Result<String, SiaError> {
    let mut lines = Vec::new();
    for def in definitions {
        match def {
            Definition::Schema(schema) => {
                lines.push(format!("schema {} ({} fields)", schema.name, schema.fields.len()));
            }
            Definition::Plugin(plugin) => {
                lines.push(format!(
                    "plugin {} as {} ({} methods)",
                    plugin.name,
                    plugin.as_name,
                    plugin.methods.len()
                ));
            }
        }
    }

    let index = SchemaIndex::new(definitions);
    let order: Vec<&str> = index
        .dependency_order()?
        .into_iter()
        .map(|schema| schema.name.as_str())
        .collect();
    lines.push(format!("dependency order: {}", order.join(", ")));
    lines.push(format!(
        "array helpers: {}",
        required_serializers(schemas(definitions)).join(", ")
    ));

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sia_compiler::compile;
    use sia_schema::ResolveError;

    #[test]
    fn test_excerpt_keeps_three_lines() {
        let source = "a\nb\nc\nd\ne";
        assert_eq!(excerpt(source, 4, 1), "b\nc\nd\n^");
        assert_eq!(excerpt(source, 1, 1), "a\n^");
    }

    #[test]
    fn test_render_parse_error() {
        let source = "schema Person {\n  name\n}";
        let err = compile(source).unwrap_err();
        assert_eq!(
            render(source, "person.sia", &err),
            "Parsing error in person.sia at line 3:1\n\nschema Person {\n  name\n}\n^\n\nExpected field type but found \"}\""
        );
    }

    #[test]
    fn test_render_lex_error() {
        let source = "schema A { x int8 $ }";
        let err = compile(source).unwrap_err();
        assert_eq!(
            render(source, "a.sia", &err),
            "Lexing error in a.sia at line 1:19\n\nschema A { x int8 $ }\n                  ^\n\nUnexpected character sequence \"$\""
        );
    }

    #[test]
    fn test_render_duplicate_definition() {
        let source = "schema A { }\nschema A { x int8 }";
        let err = compile(source).unwrap_err();
        assert_eq!(
            render(source, "a.sia", &err),
            "Verification error in a.sia at line 2:8\n\nschema A { }\nschema A { x int8 }\n       ^\n\nThe name \"A\" is defined twice"
        );
    }

    #[test]
    fn test_render_other_errors() {
        let err = SiaError::from(ResolveError::MissingFixedLength { field: "hash".into() });
        assert_eq!(
            render("", "a.sia", &err),
            "Error in a.sia: Field \"hash\" is of fixed length but has neither a \"length\" nor a \"fromEnd\" option"
        );
    }

    #[test]
    fn test_describe() {
        let definitions = compile(
            "schema Person { tags int8[] \n home Address \n ids uint16[4] \n more int8[] }
             schema Address { street string8 }
             plugin swiss.timeleap as Sorcery { method ping { } returns { } }",
        )
        .unwrap();
        assert_eq!(
            describe(&definitions).unwrap(),
            "schema Person (4 fields)\n\
             schema Address (1 fields)\n\
             plugin swiss.timeleap as Sorcery (1 methods)\n\
             dependency order: Address, Person\n\
             array helpers: serializeInt8ArrayItem, serializeUInt16ArrayItem"
        );
    }
}
