use heck::{ToLowerCamelCase, ToUpperCamelCase};

use crate::error::SiaError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn lex_error(msg: &str, line: usize, column: usize) -> SiaError {
    SiaError::LexError {
        msg: msg.to_string(),
        line,
        column,
    }
}

pub fn parse_error(msg: &str, line: usize, column: usize) -> SiaError {
    SiaError::ParseError {
        msg: msg.to_string(),
        line,
        column,
    }
}

pub fn verifier_error(msg: &str, line: usize, column: usize) -> SiaError {
    SiaError::VerifierError {
        msg: msg.to_string(),
        line,
        column,
    }
}

/// `Person` -> `person`, `UserInfo` -> `userInfo`.
pub fn lower_camel(s: &str) -> String {
    s.to_lower_camel_case()
}

/// `isWizard` -> `IsWizard`, `user_info` -> `UserInfo`.
pub fn upper_camel(s: &str) -> String {
    s.to_upper_camel_case()
}

/// Strips the surrounding quotes of a string literal. Escapes are kept as
/// written.
pub fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal)
}
