//! Error types for schema construction and algebra.
//!
//! Three failure categories are kept distinct:
//!
//! - [`ParseError`]: the schema input was malformed (unknown key, invalid
//!   regex, refinement on an incompatible basis, ...).
//! - [`InternalError`]: an engine invariant was violated. These indicate a
//!   bug rather than bad input.
//! - [`Disjoint`]: an intersection is unsatisfiable. Disjoints are normally
//!   returned as values and only become errors through `and` or
//!   [`Disjoint::throw`].
//!
//! Validation failures are accumulated as `Problems` and only turned into a
//! [`SchemaError::Validation`] on request.

use crate::disjoint::Disjoint;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Internal error: {message}")]
pub struct InternalError {
    message: String,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error(transparent)]
    Unsatisfiable(#[from] Disjoint),
    #[error("{0}")]
    Validation(String),
}

impl SchemaError {
    pub fn parse(message: impl Into<String>) -> Self {
        SchemaError::Parse(ParseError::new(message))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        SchemaError::Internal(InternalError::new(message))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, SchemaError::Parse(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, SchemaError::Internal(_))
    }

    pub fn as_disjoint(&self) -> Option<&Disjoint> {
        match self {
            SchemaError::Unsatisfiable(d) => Some(d),
            _ => None,
        }
    }
}

pub type SchemaResult<T> = Result<T, SchemaError>;
