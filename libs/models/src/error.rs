//! Error types for mapping table models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
