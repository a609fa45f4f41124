//! Errors raised by the pure editing model.

use crate::record::MalformedPathError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },
}
