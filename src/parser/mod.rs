//! Type Expression Parser
//!
//! Closed grammar for the type strings found in schema files. Input is only
//! ever tokenized and matched against the grammar, never evaluated.

pub mod ast;
pub mod lexer;

pub use ast::{SyntaxError, TypeExpr};
pub use lexer::{tokenize, Token, TokenKind};

/// Parse a type expression into its syntax tree
pub fn parse_type_expr(expression: &str) -> Result<TypeExpr, SyntaxError> {
    let tokens = lexer::tokenize(expression);

    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Invalid) {
        return Err(SyntaxError(format!("unexpected character '{}'", bad.text)));
    }

    ast::tokens_to_type_expr(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_style_list() {
        let result = parse_type_expr("List[int]").unwrap();
        assert_eq!(result, TypeExpr::List(Box::new(TypeExpr::Name("int".into()))));
    }

    #[test]
    fn test_parse_angle_style_list() {
        let result = parse_type_expr("list<int>").unwrap();
        assert_eq!(result, TypeExpr::List(Box::new(TypeExpr::Name("int".into()))));
    }

    #[test]
    fn test_rejects_code() {
        let err = parse_type_expr("exec(open('x').read())").unwrap_err();
        assert!(err.0.contains("unexpected character"));
    }
}
