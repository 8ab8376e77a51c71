use tracing::debug;

use crate::{
    cst::{
        ArrayNode, CompilationUnit, FieldNode, Item, MethodNode, OptionEntry, ParamsNode, PluginNode,
        SchemaNode, TypeOptionsNode,
    },
    error::SiaError,
    tokenizer::{Token, TokenKind},
    utils::{parse_error, quote},
};

/// Parses a token stream produced by [`tokenize_schema`](crate::tokenizer::tokenize_schema)
/// into a concrete syntax tree. Stops at the first grammar violation.
pub fn parse_schema(tokens: &[Token]) -> Result<CompilationUnit<'_>, SiaError> {
    match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof => {}
        _ => return Err(parse_error("Token stream is not terminated by end of input", 0, 0)),
    }

    let unit = Parser { tokens, index: 0 }.unit()?;
    debug!(items = unit.items.len(), "parsed compilation unit");
    Ok(unit)
}

struct Parser<'t> {
    tokens: &'t [Token],
    index:  usize,
}

impl<'t> Parser<'t> {
    /// Token `offset` positions ahead; reads past the end yield the final
    /// `Eof` token.
    fn peek(&self, offset: usize) -> &'t Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)]
    }

    fn current(&self) -> &'t Token {
        self.peek(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn bump(&mut self) -> &'t Token {
        let tok = self.current();
        if tok.kind != TokenKind::Eof {
            self.index += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<&'t Token, SiaError> {
        self.eat(kind).ok_or_else(|| self.unexpected(expected))
    }

    fn unexpected(&self, expected: &str) -> SiaError {
        let tok = self.current();
        let found = match tok.kind {
            TokenKind::Eof => TokenKind::Eof.describe().to_string(),
            _ => quote(&tok.text),
        };
        parse_error(
            &format!("Expected {} but found {}", expected, found),
            tok.line,
            tok.column,
        )
    }

    fn unit(mut self) -> Result<CompilationUnit<'t>, SiaError> {
        let mut items = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::Schema => items.push(Item::Schema(self.schema()?)),
                TokenKind::Plugin => items.push(Item::Plugin(self.plugin()?)),
                TokenKind::Eof    => break,
                _ => return Err(self.unexpected("\"schema\" or \"plugin\"")),
            }
        }
        Ok(CompilationUnit { items })
    }

    fn schema(&mut self) -> Result<SchemaNode<'t>, SiaError> {
        self.expect(TokenKind::Schema, "\"schema\"")?;
        let name = self.expect(TokenKind::Identifier, "schema name")?;
        let fields = self.field_block()?;
        Ok(SchemaNode { name, fields })
    }

    fn plugin(&mut self) -> Result<PluginNode<'t>, SiaError> {
        self.expect(TokenKind::Plugin, "\"plugin\"")?;

        let mut path = vec![self.expect(TokenKind::Identifier, "plugin name")?];
        while self.eat(TokenKind::Dot).is_some() {
            path.push(self.expect(TokenKind::Identifier, "identifier after \".\"")?);
        }

        let as_name = match self.eat(TokenKind::As) {
            Some(_) => Some(self.expect(TokenKind::Identifier, "name after \"as\"")?),
            None => None,
        };

        self.expect(TokenKind::LCurly, "\"{\"")?;
        let mut methods = Vec::new();
        while self.at(TokenKind::Method) {
            methods.push(self.method()?);
        }
        self.expect(TokenKind::RCurly, "\"method\" or \"}\"")?;

        Ok(PluginNode { path, as_name, methods })
    }

    fn method(&mut self) -> Result<MethodNode<'t>, SiaError> {
        self.expect(TokenKind::Method, "\"method\"")?;
        let name = self.expect(TokenKind::Identifier, "method name")?;
        let options = if self.at(TokenKind::LParen) {
            Some(self.type_options()?)
        } else {
            None
        };

        // Both `method m {..} returns R` and `method m returns R {..}` are accepted.
        let (params, returns) = if self.at(TokenKind::Returns) {
            let returns = self.returns()?;
            (self.params("\"{\" or parameter type")?, returns)
        } else {
            let params = self.params("\"{\", parameter type or \"returns\"")?;
            (params, self.returns()?)
        };

        Ok(MethodNode { name, options, params, returns })
    }

    fn returns(&mut self) -> Result<ParamsNode<'t>, SiaError> {
        self.expect(TokenKind::Returns, "\"returns\"")?;
        self.params("\"{\" or return type")
    }

    fn params(&mut self, expected: &str) -> Result<ParamsNode<'t>, SiaError> {
        if self.at(TokenKind::LCurly) {
            return Ok(ParamsNode::Block(self.field_block()?));
        }
        Ok(ParamsNode::Named(self.expect(TokenKind::Identifier, expected)?))
    }

    fn field_block(&mut self) -> Result<Vec<FieldNode<'t>>, SiaError> {
        self.expect(TokenKind::LCurly, "\"{\"")?;
        let mut fields = Vec::new();
        while self.at(TokenKind::Identifier) {
            fields.push(self.field()?);
        }
        self.expect(TokenKind::RCurly, "field name or \"}\"")?;
        Ok(fields)
    }

    /// `name ?? type (options)? [N]? (= default)?`
    fn field(&mut self) -> Result<FieldNode<'t>, SiaError> {
        let name = self.expect(TokenKind::Identifier, "field name")?;
        let optional = self.eat(TokenKind::OptionalMark);
        let type_name = self.expect(TokenKind::Identifier, "field type")?;

        let options = if self.at(TokenKind::LParen) {
            Some(self.type_options()?)
        } else {
            None
        };

        let array = if self.at(TokenKind::LSquare) {
            Some(self.array()?)
        } else {
            None
        };

        let default = match self.eat(TokenKind::Equals) {
            Some(_) => Some(self.literal("default value")?),
            None => None,
        };

        Ok(FieldNode {
            name,
            optional,
            type_name,
            options,
            array,
            default,
        })
    }

    fn type_options(&mut self) -> Result<TypeOptionsNode<'t>, SiaError> {
        self.expect(TokenKind::LParen, "\"(\"")?;
        let mut entries = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let key = self.expect(TokenKind::Identifier, "option name")?;
                self.expect(TokenKind::Equals, "\"=\"")?;
                let value = self.literal("option value")?;
                entries.push(OptionEntry { key, value });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "\",\" or \")\"")?;
        Ok(TypeOptionsNode { entries })
    }

    fn array(&mut self) -> Result<ArrayNode<'t>, SiaError> {
        self.expect(TokenKind::LSquare, "\"[\"")?;
        let size = self.eat(TokenKind::NumberLiteral);
        if let Some(tok) = size {
            if !matches!(tok.text.parse::<u64>(), Ok(n) if n > 0) {
                return Err(parse_error(
                    &format!("Array size must be a positive integer but found {}", quote(&tok.text)),
                    tok.line,
                    tok.column,
                ));
            }
        }
        self.expect(TokenKind::RSquare, "\"]\"")?;
        Ok(ArrayNode { size })
    }

    fn literal(&mut self, expected: &str) -> Result<&'t Token, SiaError> {
        match self.current().kind {
            TokenKind::Identifier | TokenKind::NumberLiteral | TokenKind::StringLiteral => Ok(self.bump()),
            _ => Err(self.unexpected(expected)),
        }
    }
}
