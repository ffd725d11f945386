//! Parser for the small mapping-expression language.
//!
//! ```text
//! expr  := qname | qname '(' expr (',' expr)* ')' | '\'' chars '\''
//! qname := ident ('.' ident)?
//! ```
//!
//! Malformed input aborts schema construction.

use super::mapping::{ColumnRef, MappingExpression};
use crate::{Error, Result};

pub(crate) fn parse(input: &str) -> Result<MappingExpression> {
    let mut parser = Parser::new(input);
    let expr = parser.expr()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.fail("trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Parser<'a> {
        Parser {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn expr(&mut self) -> Result<MappingExpression> {
        self.skip_ws();

        if self.eat('\'') {
            return self.constant();
        }

        let first = self.ident()?;

        self.skip_ws();
        if self.eat('(') {
            let mut args = vec![];
            self.skip_ws();
            if !self.eat(')') {
                loop {
                    args.push(self.expr()?);
                    self.skip_ws();
                    if self.eat(')') {
                        break;
                    }
                    if !self.eat(',') {
                        return Err(self.fail("expected `,` or `)`"));
                    }
                }
            }
            return Ok(MappingExpression::Function { name: first, args });
        }

        if self.eat('.') {
            let column = self.ident()?;
            return Ok(MappingExpression::Column(ColumnRef {
                table: Some(first),
                column,
            }));
        }

        Ok(MappingExpression::Column(ColumnRef {
            table: None,
            column: first,
        }))
    }

    fn constant(&mut self) -> Result<MappingExpression> {
        let mut value = String::new();
        loop {
            match self.next() {
                Some('\'') => return Ok(MappingExpression::Constant(value)),
                Some(c) => value.push(c),
                None => return Err(self.fail("unterminated string constant")),
            }
        }
    }

    fn ident(&mut self) -> Result<String> {
        self.skip_ws();

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == start || self.chars[start].is_ascii_digit() {
            return Err(self.fail("expected an identifier"));
        }

        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn fail(&self, message: &str) -> Error {
        Error::invalid_schema(format!(
            "malformed mapping expression `{}` at offset {}: {}",
            self.input, self.pos, message
        ))
    }
}
