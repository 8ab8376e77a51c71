use sia_schema::ResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexing error at line {line}, column {column}: {msg}")]
    LexError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Verifier error at line {line}, column {column}: {msg}")]
    VerifierError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("IR serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl SiaError {
    /// Source position of lexing, parsing and verifier errors, for caret
    /// reports.
    pub fn location(&self) -> Option<(usize, usize)> {
        match *self {
            SiaError::LexError { line, column, .. }
            | SiaError::ParseError { line, column, .. }
            | SiaError::VerifierError { line, column, .. } => Some((line, column)),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SiaError::LexError { msg, .. }
            | SiaError::ParseError { msg, .. }
            | SiaError::VerifierError { msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}
