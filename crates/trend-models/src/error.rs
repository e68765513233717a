//! Model error types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid region code '{0}': expected two ASCII letters")]
    InvalidRegion(String),

    #[error("Invalid content type '{0}': expected one of now, music, games, movies")]
    InvalidContentType(String),
}
