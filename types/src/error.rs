//! Parse errors for the shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("unrecognized vote option: {0}")]
    UnknownOption(String),

    #[error("invalid ISO-8601 timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("identity token must not be empty")]
    EmptyIdentity,
}
