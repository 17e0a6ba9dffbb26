//! Tokenizer for the normalized formula grammar.
//!
//! The token set is closed: number literals, single-letter labels, the four
//! arithmetic operators, parentheses, commas, and lowercase identifiers for
//! built-in function names. Anything else is a syntax error; there is no
//! escape hatch into a wider language.

use crate::error::EvalError;
use crate::series::Label;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Label(Label),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
    Comma,
}

impl Token {
    /// Short rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(v) => format!("number {v}"),
            Token::Label(l) => format!("label {l}"),
            Token::Ident(name) => format!("identifier \"{name}\""),
            Token::Plus => "\"+\"".to_string(),
            Token::Minus => "\"-\"".to_string(),
            Token::Star => "\"*\"".to_string(),
            Token::Slash => "\"/\"".to_string(),
            Token::OpenParen => "\"(\"".to_string(),
            Token::CloseParen => "\")\"".to_string(),
            Token::Comma => "\",\"".to_string(),
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '0'..='9' => {
                let start = i;
                while chars.get(i).copied().is_some_and(|c| c.is_ascii_digit()) {
                    i += 1;
                }
                if chars.get(i) == Some(&'.') {
                    i += 1;
                    while chars.get(i).copied().is_some_and(|c| c.is_ascii_digit()) {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::Syntax(format!("invalid number literal \"{literal}\"")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while chars.get(i).copied().is_some_and(is_word) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(classify_word(word)?);
            }
            _ => {
                return Err(EvalError::Syntax(format!("unexpected character {c:?}")));
            }
        }
    }

    Ok(tokens)
}

/// A one-letter uppercase word is a label reference; a lowercase word is a
/// function name. Anything else has no place in the grammar.
fn classify_word(word: String) -> Result<Token, EvalError> {
    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && let Some(label) = Label::new(c)
    {
        return Ok(Token::Label(label));
    }

    if word.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
        return Ok(Token::Ident(word));
    }

    Err(EvalError::Syntax(format!("invalid identifier \"{word}\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(c: char) -> Label {
        Label::new(c).unwrap()
    }

    #[test]
    fn should_tokenize_arithmetic() {
        let tokens = tokenize("(A+B)/2").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::OpenParen,
                Token::Label(label('A')),
                Token::Plus,
                Token::Label(label('B')),
                Token::CloseParen,
                Token::Slash,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn should_tokenize_function_call() {
        let tokens = tokenize("min(A, 0.5)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("min".to_string()),
                Token::OpenParen,
                Token::Label(label('A')),
                Token::Comma,
                Token::Number(0.5),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn should_tokenize_trailing_dot_literal() {
        assert_eq!(tokenize("3.").unwrap(), vec![Token::Number(3.0)]);
    }

    #[test]
    fn should_reject_bare_dot() {
        let err = tokenize(".5").unwrap_err();
        assert!(matches!(err, EvalError::Syntax(_)));
    }

    #[test]
    fn should_reject_double_dot_literal() {
        let err = tokenize("1.2.3").unwrap_err();
        assert!(matches!(err, EvalError::Syntax(_)));
    }

    #[test]
    fn should_reject_multi_letter_uppercase_word() {
        let err = tokenize("AB+1").unwrap_err();
        assert_eq!(
            err,
            EvalError::Syntax("invalid identifier \"AB\"".to_string())
        );
        assert!(tokenize("A1").is_err());
    }

    #[test]
    fn should_reject_unknown_characters() {
        assert!(matches!(tokenize("A%B"), Err(EvalError::Syntax(_))));
        assert!(matches!(tokenize("A;B"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(tokenize(" A +\tB ").unwrap(), tokenize("A+B").unwrap());
    }
}
