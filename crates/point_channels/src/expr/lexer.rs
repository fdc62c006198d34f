//! Tokenizer for expression bodies.
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(String),
    Return,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    StrictEq,
    StrictNe,
    AndAnd,
    OrOr,
}

/// Split `src` into tokens. `Math.` prefixes are folded into the identifier.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
        {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| Error::Expression(format!("invalid number '{text}'")))?;
            out.push(Token::Number(value));
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if word == "Math" && chars.get(i) == Some(&'.') {
                i += 1;
                continue;
            }
            out.push(if word == "return" {
                Token::Return
            } else {
                Token::Ident(word)
            });
            continue;
        }

        let next = chars.get(i + 1).copied();
        let third = chars.get(i + 2).copied();
        let (token, width) = match (c, next) {
            ('*', Some('*')) => (Token::StarStar, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('=', Some('=')) if third == Some('=') => (Token::StrictEq, 3),
            ('!', Some('=')) if third == Some('=') => (Token::StrictNe, 3),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('&', Some('&')) => (Token::AndAnd, 2),
            ('|', Some('|')) => (Token::OrOr, 2),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('{', _) => (Token::LBrace, 1),
            ('}', _) => (Token::RBrace, 1),
            (',', _) => (Token::Comma, 1),
            (';', _) => (Token::Semicolon, 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('!', _) => (Token::Bang, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            _ => {
                return Err(Error::Expression(format!(
                    "unexpected character '{c}' at {i} in '{src}'"
                )))
            }
        };
        out.push(token);
        i += width;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_and_literals() {
        let tokens = tokenize("x >= 2.5e1 && !(y === 3)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("x".into()),
                Token::Ge,
                Token::Number(25.0),
                Token::AndAnd,
                Token::Bang,
                Token::LParen,
                Token::Ident("y".into()),
                Token::StrictEq,
                Token::Number(3.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn folds_math_prefix_and_return_keyword() {
        let tokens = tokenize("return Math.sqrt(x) ** 2;").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Return,
                Token::Ident("sqrt".into()),
                Token::LParen,
                Token::Ident("x".into()),
                Token::RParen,
                Token::StarStar,
                Token::Number(2.0),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn leading_dot_numbers() {
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(matches!(tokenize("x # 2"), Err(Error::Expression(_))));
        assert!(matches!(tokenize("x = 2"), Err(Error::Expression(_))));
    }
}
