use sia_schema::SchemaDefinition;

use crate::error::SiaError;

/// A code emitter for one target language.
///
/// Backends are built over a borrowed IR and must interpret it through
/// `sia_schema::resolve` (string widths, defaults, dependency order) rather
/// than re-deriving those rules.
pub trait Backend {
    /// Source for a single schema.
    fn schema_to_code(&self, schema: &SchemaDefinition) -> Result<String, SiaError>;

    /// Source for the whole compilation unit.
    fn to_code(&self) -> Result<String, SiaError>;
}
