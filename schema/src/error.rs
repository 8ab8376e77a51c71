use thiserror::Error;

/// Errors raised lazily while a backend interprets the IR.
///
/// The front end never produces these: a schema with a dangling type
/// reference compiles fine and only fails here, at first use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("The type {type_name:?} of field {field:?} is neither a primitive nor a declared schema")]
    UnresolvedType {
        type_name: String,
        field:     String,
    },

    #[error("Field {field:?} is of fixed length but has neither a \"length\" nor a \"fromEnd\" option")]
    MissingFixedLength { field: String },

    #[error("Recursive nesting of {} is not allowed", path.join(" -> "))]
    CyclicReference { path: Vec<String> },
}
