use sia_schema::Definition;
use tracing::debug;

use crate::{
    error::SiaError,
    parser::parse_schema,
    tokenizer::tokenize_schema,
    verifier::verify_unit,
    visitor::build,
};

/// Compile schema source text into the Schema IR, in declaration order.
/// Returns `Err(SiaError)` on the first lexing, parsing or verification
/// failure.
pub fn compile(text: &str) -> Result<Vec<Definition>, SiaError> {
    let tokens = tokenize_schema(text)?;
    let unit = parse_schema(&tokens)?;
    verify_unit(&unit)?;
    let definitions = build(&unit);
    debug!(definitions = definitions.len(), "compiled schema");
    Ok(definitions)
}

/// Compile schema source text and render the IR as pretty-printed JSON.
pub fn compile_to_json(text: &str) -> Result<String, SiaError> {
    let definitions = compile(text)?;
    Ok(serde_json::to_string_pretty(&definitions)?)
}
