use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::SiaError;
use crate::utils::{lex_error, quote};

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(
        r#"(\s+|//[^\n]*|"(?:[^"\\]|\\.)*"|-?\d+(?:\.\d+)?|[A-Za-z_][A-Za-z0-9_]*|[=?{}()\[\],.])"#
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Keywords
    Schema,
    Method,
    Plugin,
    As,
    Returns,

    // Punctuation
    Equals,
    LCurly,
    RCurly,
    LParen,
    RParen,
    LSquare,
    RSquare,
    OptionalMark,
    Comma,
    Dot,

    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Schema | TokenKind::Method | TokenKind::Plugin | TokenKind::As | TokenKind::Returns
        )
    }

    fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "schema"  => Some(TokenKind::Schema),
            "method"  => Some(TokenKind::Method),
            "plugin"  => Some(TokenKind::Plugin),
            "as"      => Some(TokenKind::As),
            "returns" => Some(TokenKind::Returns),
            _ => None,
        }
    }

    fn punctuation(c: char) -> Option<TokenKind> {
        match c {
            '=' => Some(TokenKind::Equals),
            '{' => Some(TokenKind::LCurly),
            '}' => Some(TokenKind::RCurly),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LSquare),
            ']' => Some(TokenKind::RSquare),
            '?' => Some(TokenKind::OptionalMark),
            ',' => Some(TokenKind::Comma),
            '.' => Some(TokenKind::Dot),
            _ => None,
        }
    }

    /// Human-readable name used in "Expected ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier    => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number",
            TokenKind::Schema        => "\"schema\"",
            TokenKind::Method        => "\"method\"",
            TokenKind::Plugin        => "\"plugin\"",
            TokenKind::As            => "\"as\"",
            TokenKind::Returns       => "\"returns\"",
            TokenKind::Equals        => "\"=\"",
            TokenKind::LCurly        => "\"{\"",
            TokenKind::RCurly        => "\"}\"",
            TokenKind::LParen        => "\"(\"",
            TokenKind::RParen        => "\")\"",
            TokenKind::LSquare       => "\"[\"",
            TokenKind::RSquare       => "\"]\"",
            TokenKind::OptionalMark  => "\"?\"",
            TokenKind::Comma         => "\",\"",
            TokenKind::Dot           => "\".\"",
            TokenKind::Eof           => "end of input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   String,
    pub line:   usize,
    pub column: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub msg:    String,
    pub line:   usize,
    pub column: usize,
}

impl From<LexError> for SiaError {
    fn from(err: LexError) -> Self {
        lex_error(&err.msg, err.line, err.column)
    }
}

/// Where the scanner is relative to field-definition bodies.
///
/// `schema`, `method` and `returns` arm the scanner; the next `{` opens a
/// body in which reserved words are plain identifiers, so that `method
/// int32` is a valid field inside a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Outside,
    Pending,
    InFieldDef,
}

impl ScanState {
    /// Feeds one token kind through the state machine and returns the next
    /// state along with the kind the token should carry.
    pub fn advance(self, kind: TokenKind) -> (ScanState, TokenKind) {
        match self {
            ScanState::InFieldDef => match kind {
                TokenKind::RCurly => (ScanState::Outside, kind),
                k if k.is_keyword() => (ScanState::InFieldDef, TokenKind::Identifier),
                _ => (self, kind),
            },
            ScanState::Outside | ScanState::Pending => match kind {
                TokenKind::Schema | TokenKind::Method | TokenKind::Returns => (ScanState::Pending, kind),
                TokenKind::Plugin | TokenKind::RCurly => (ScanState::Outside, kind),
                TokenKind::LCurly if self == ScanState::Pending => (ScanState::InFieldDef, kind),
                _ => (self, kind),
            },
        }
    }
}

/// Relabels reserved words found inside field-definition bodies as
/// identifiers. Text and position of every token are left untouched.
pub fn reclassify(tokens: Vec<Token>) -> Vec<Token> {
    let mut state = ScanState::default();
    tokens
        .into_iter()
        .map(|mut token| {
            let (next, kind) = state.advance(token.kind);
            state = next;
            token.kind = kind;
            token
        })
        .collect()
}

fn classify(part: &str) -> Option<TokenKind> {
    let first = part.chars().next()?;
    if first.is_whitespace() || part.starts_with("//") {
        None
    } else if first == '"' {
        Some(TokenKind::StringLiteral)
    } else if first == '-' || first.is_ascii_digit() {
        Some(TokenKind::NumberLiteral)
    } else if first == '_' || first.is_ascii_alphabetic() {
        Some(TokenKind::keyword(part).unwrap_or(TokenKind::Identifier))
    } else {
        TokenKind::punctuation(first)
    }
}

fn advance_position(line: &mut usize, column: &mut usize, part: &str) {
    let newline_count = part.matches('\n').count();
    if newline_count > 0 {
        *line += newline_count;
        if let Some(last_line_part) = part.split('\n').last() {
            *column = last_line_part.chars().count() + 1;
        }
    } else {
        *column += part.chars().count();
    }
}

/// Scans the whole input. Every run of unrecognized characters yields one
/// `LexError`; scanning continues after it. The token list always ends with
/// an `Eof` token.
pub fn tokenize(text: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut tokens   = Vec::new();
    let mut errors   = Vec::new();
    let mut line     = 1;
    let mut column   = 1;
    let mut last_end = 0;

    let mut unexpected = |run: &str, line: &mut usize, column: &mut usize| {
        errors.push(LexError {
            msg:    format!("Unexpected character sequence {}", quote(run)),
            line:   *line,
            column: *column,
        });
        advance_position(line, column, run);
    };

    for mat in TOKEN_REGEX.find_iter(text) {
        let part = mat.as_str();

        if mat.start() > last_end {
            unexpected(&text[last_end..mat.start()], &mut line, &mut column);
        }

        if let Some(kind) = classify(part) {
            tokens.push(Token {
                kind,
                text: part.to_string(),
                line,
                column,
                length: part.chars().count(),
            });
        }

        advance_position(&mut line, &mut column, part);
        last_end = mat.end();
    }

    if last_end != text.len() {
        unexpected(&text[last_end..], &mut line, &mut column);
    }

    tokens.push(Token {
        kind:   TokenKind::Eof,
        text:   String::new(),
        line,
        column,
        length: 0,
    });

    debug!(tokens = tokens.len(), errors = errors.len(), "tokenized schema source");
    (reclassify(tokens), errors)
}

/// Like [`tokenize`], but the first lexical error is fatal.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, SiaError> {
    let (tokens, errors) = tokenize(text);
    match errors.into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(tokens),
    }
}
