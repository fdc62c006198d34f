//! Per-value expressions of the form `"<field> => <expression>"`.
//!
//! The left side names the bound field and doubles as the parameter name; the right side
//! is a small arithmetic/boolean language (see [`parser`]). Bodies are normalised into a
//! returning form so the stored source of a [`Lambda`] is stable across re-parsing.
use std::fmt;

use crate::error::{Error, Result};

pub mod ast;
mod lexer;
pub mod parser;

pub use ast::{Expr, Value};

const ARROW: &str = "=>";

/// A compiled single-parameter expression bound to a field.
#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    field: String,
    source: String,
    body: Expr,
}

impl Lambda {
    /// Parse and compile `"<field> => <expression>"`.
    ///
    /// Splits on the first `=>`. A missing arrow is [`Error::MalformedLambda`]; a body that
    /// does not compile is [`Error::Expression`].
    pub fn parse(text: &str) -> Result<Self> {
        let (field, body) = split_lambda(text)?;
        Self::compile(field, body)
    }

    /// Compile `body` with `param` as both the parameter and the bound field.
    pub fn compile(param: &str, body: &str) -> Result<Self> {
        let param = param.trim();
        if param.is_empty() {
            return Err(Error::Expression(
                "lambda parameter must not be empty".into(),
            ));
        }
        let body = normalize_body(body.trim());
        let expr = parser::parse_body(&body, param)?;
        Ok(Self {
            field: param.to_string(),
            source: format!("{param} {ARROW} {body}"),
            body: expr,
        })
    }

    /// Field (and parameter) name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Normalised source text, `"<field> => return <expression>"` or a block body.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.body
    }

    /// Evaluate for one input and coerce the result to a real.
    #[inline]
    pub fn call(&self, x: f64) -> f64 {
        self.body.eval(x).to_number()
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split `"<field> => <body>"` on the first arrow, trimming both sides.
pub fn split_lambda(text: &str) -> Result<(&str, &str)> {
    text.split_once(ARROW)
        .map(|(field, body)| (field.trim(), body.trim()))
        .ok_or_else(|| Error::MalformedLambda {
            text: text.to_string(),
        })
}

/// Prefix `return` unless the body is already a block or already returns.
pub fn normalize_body(body: &str) -> String {
    let body = body.trim();
    if body.starts_with('{') || starts_with_return(body) {
        body.to_string()
    } else {
        format!("return {body}")
    }
}

fn starts_with_return(body: &str) -> bool {
    body.strip_prefix("return")
        .is_some_and(|rest| rest.is_empty() || !is_ident_char(rest.chars().next()))
}

fn is_ident_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
