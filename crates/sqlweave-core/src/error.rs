//! Error types for statement generation.

use crate::lexer::Span;

/// Errors that can occur while parsing, assembling, or adapting a statement.
///
/// Every error is terminal for the statement being produced: no partial SQL
/// is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A condition expression could not be parsed, or used an unknown operator.
    #[error("Failed to parse condition '{expression}': {message} at {span}")]
    Parse {
        /// The full offending expression.
        expression: String,
        /// What went wrong.
        message: String,
        /// Location of the offending token inside `expression`.
        span: Span,
    },

    /// A table or column name does not match the safe identifier grammar.
    #[error("Invalid identifier: {0}")]
    Validation(String),

    /// The statement request is structurally inconsistent.
    #[error("Cannot build statement: {0}")]
    Build(String),

    /// The dialect name is not one of the supported dialects.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// A placeholder references a parameter that has no bound value.
    #[error("Missing value for parameter ':{0}'")]
    MissingParameter(String),

    /// A bound value's shape is incompatible with how it is used.
    #[error("Parameter ':{parameter}' expected {expected}, found {found}")]
    TypeMismatch {
        /// The parameter name.
        parameter: String,
        /// The expected shape.
        expected: String,
        /// The shape actually supplied.
        found: String,
    },
}

impl Error {
    /// Creates a parse error for `expression`.
    #[must_use]
    pub fn parse(expression: &str, message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            expression: expression.to_string(),
            message: message.into(),
            span,
        }
    }

    /// Creates a build error.
    #[must_use]
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }
}

/// Result type for statement generation.
pub type Result<T> = std::result::Result<T, Error>;
