//! Type Expression AST
//!
//! Syntax only. Whether a name is a primitive or a declared entity is
//! decided by the [`TypeRegistry`](crate::schema::TypeRegistry).

use crate::parser::lexer::{Token, TokenKind};

/// A parsed type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A bare name: primitive or entity
    Name(String),
    /// `ref Entity`
    Ref(String),
    /// `list<T>` / `List[T]`
    List(Box<TypeExpr>),
    /// `optional<T>` / `Optional[T]`
    Optional(Box<TypeExpr>),
}

/// Deepest `list`/`optional` nesting accepted in one expression
pub const MAX_NESTING: usize = 64;

/// Reason a token stream is not a type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError(pub String);

/// Convert tokens into a type expression, consuming all of them.
pub fn tokens_to_type_expr(tokens: &[Token]) -> Result<TypeExpr, SyntaxError> {
    if tokens.is_empty() {
        return Err(SyntaxError("empty type expression".to_string()));
    }

    let mut cursor = Cursor {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = cursor.parse_type()?;

    if let Some(extra) = cursor.peek() {
        return Err(SyntaxError(format!(
            "unexpected '{}' after complete type",
            extra.text
        )));
    }

    Ok(expr)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn expect_ident(&mut self, after: &str) -> Result<&'a Token, SyntaxError> {
        match self.next() {
            Some(token) if token.kind == TokenKind::Ident => Ok(token),
            Some(token) => Err(SyntaxError(format!(
                "expected a name after '{}', found '{}'",
                after, token.text
            ))),
            None => Err(SyntaxError(format!("expected a name after '{after}'"))),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, SyntaxError> {
        let head = match self.next() {
            Some(token) if token.kind == TokenKind::Ident => token,
            Some(token) => {
                return Err(SyntaxError(format!("unexpected '{}'", token.text)));
            }
            None => return Err(SyntaxError("unexpected end of expression".to_string())),
        };

        match head.text.as_str() {
            "list" | "List" => Ok(TypeExpr::List(Box::new(self.parse_argument(&head.text)?))),
            "optional" | "Optional" => Ok(TypeExpr::Optional(Box::new(
                self.parse_argument(&head.text)?,
            ))),
            "ref" => {
                let target = self.expect_ident("ref")?;
                Ok(TypeExpr::Ref(target.text.clone()))
            }
            name => Ok(TypeExpr::Name(name.to_string())),
        }
    }

    /// Parse `<T>` or `[T]`; the closing bracket must match the opening one.
    fn parse_argument(&mut self, constructor: &str) -> Result<TypeExpr, SyntaxError> {
        let open = match self.next() {
            Some(token) if token.kind == TokenKind::Open => token,
            _ => {
                return Err(SyntaxError(format!(
                    "'{constructor}' needs a type argument"
                )));
            }
        };

        if self.depth == MAX_NESTING {
            return Err(SyntaxError(format!(
                "type nesting too deep (limit {MAX_NESTING})"
            )));
        }
        self.depth += 1;
        let inner = self.parse_type()?;
        self.depth -= 1;

        match self.next() {
            Some(close) if close.kind == TokenKind::Close && close.is_angle() == open.is_angle() => {
                Ok(inner)
            }
            Some(close) => Err(SyntaxError(format!(
                "mismatched '{}' closing '{}'",
                close.text, open.text
            ))),
            None => Err(SyntaxError(format!("unclosed '{}'", open.text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn parse(text: &str) -> Result<TypeExpr, SyntaxError> {
        tokens_to_type_expr(&tokenize(text))
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(parse("str"), Ok(TypeExpr::Name("str".to_string())));
    }

    #[test]
    fn test_parse_nested() {
        let expr = parse("Optional[list<ref Class>]").unwrap();
        assert_eq!(
            expr,
            TypeExpr::Optional(Box::new(TypeExpr::List(Box::new(TypeExpr::Ref(
                "Class".to_string()
            )))))
        );
    }

    #[test]
    fn test_mismatched_brackets() {
        assert!(parse("List[int>").is_err());
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse("int str").unwrap_err();
        assert!(err.0.contains("str"));
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}int{}", "list<".repeat(MAX_NESTING), ">".repeat(MAX_NESTING));
        assert!(parse(&at_limit).is_ok());

        let hostile = format!("{}int{}", "list<".repeat(200_000), ">".repeat(200_000));
        let err = parse(&hostile).unwrap_err();
        assert!(err.0.contains("type nesting too deep"));
    }

    #[test]
    fn test_missing_argument() {
        assert!(parse("list").is_err());
        assert!(parse("list<>").is_err());
        assert!(parse("ref").is_err());
    }
}
