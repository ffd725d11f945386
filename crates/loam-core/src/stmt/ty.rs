use crate::{Error, Result};

use std::fmt;

/// Primitive value types understood by the mapping model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Bool,
    I32,
    I64,
    F64,
    Text,
    Bytes,
}

impl Type {
    /// Parses a primitive-type token from a property declaration.
    ///
    /// An unknown token is a configuration error and aborts schema
    /// construction.
    pub fn from_token(token: &str) -> Result<Type> {
        Ok(match token {
            "boolean" => Type::Bool,
            "int" | "integer" => Type::I32,
            "long" => Type::I64,
            "double" | "decimal" => Type::F64,
            "string" | "text" => Type::Text,
            "bytes" => Type::Bytes,
            _ => {
                return Err(Error::invalid_schema(format!(
                    "unknown primitive type `{token}`"
                )))
            }
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Type::*;

        match self {
            Bool => "boolean".fmt(f),
            I32 => "int".fmt(f),
            I64 => "long".fmt(f),
            F64 => "double".fmt(f),
            Text => "string".fmt(f),
            Bytes => "bytes".fmt(f),
        }
    }
}
