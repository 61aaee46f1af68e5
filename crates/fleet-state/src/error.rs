//! State error model
use fleet_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field {path} is not a {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("Invalid state document: {0}")]
    Document(String),
}
