//! Type Expression Lexer
//!
//! Splits a type expression such as `list<ref Class>` or `Optional[str]`
//! into tokens. No allocation beyond the token texts themselves.

/// Token types in a type expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Identifier like "int", "List", "Class"
    Ident,
    /// `<` or `[`
    Open,
    /// `>` or `]`
    Close,
    /// Any character outside the grammar
    Invalid,
}

/// A token with its text content
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    /// Bracket style of an `Open`/`Close` token: `true` for angle brackets.
    pub fn is_angle(&self) -> bool {
        self.text == "<" || self.text == ">"
    }
}

/// Tokenize a type expression
pub fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        match ch {
            ' ' | '\t' | '\r' | '\n' => continue,

            '<' | '[' => tokens.push(Token {
                kind: TokenKind::Open,
                text: ch.to_string(),
            }),

            '>' | ']' => tokens.push(Token {
                kind: TokenKind::Close,
                text: ch.to_string(),
            }),

            c if c.is_alphabetic() || c == '_' => {
                let mut end_idx = start_idx + c.len_utf8();

                while let Some(&(idx, next_ch)) = chars.peek() {
                    if next_ch.is_alphanumeric() || next_ch == '_' {
                        end_idx = idx + next_ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                tokens.push(Token {
                    kind: TokenKind::Ident,
                    text: expression[start_idx..end_idx].to_string(),
                });
            }

            other => tokens.push(Token {
                kind: TokenKind::Invalid,
                text: other.to_string(),
            }),
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_primitive() {
        let tokens = tokenize("int");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "int");
    }

    #[test]
    fn test_tokenize_angle_list() {
        let tokens = tokenize("list< ref Class >");

        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Open,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Close
            ]
        );
        assert_eq!(tokens[3].text, "Class");
        assert!(tokens[1].is_angle());
    }

    #[test]
    fn test_tokenize_bracket_list() {
        let tokens = tokenize("List[int]");

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].text, "[");
        assert!(!tokens[1].is_angle());
        assert_eq!(tokens[3].text, "]");
    }

    #[test]
    fn test_tokenize_flags_code_characters() {
        let tokens = tokenize("__import__('os')");

        assert!(tokens.iter().any(|t| t.kind == TokenKind::Invalid));
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("   ").is_empty());
    }
}
