//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, lambda and expression compile failures, palette registration
//! mismatches and operations a channel kind does not support.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("couldn't parse '{text}' into a function: expected '<field> => <expression>'")]
    MalformedLambda { text: String },

    #[error("expression error: {0}")]
    Expression(String),

    #[error("palette '{name}' has {actual} bytes, expected {expected}")]
    InvalidPalette {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
