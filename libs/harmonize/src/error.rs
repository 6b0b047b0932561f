//! Error types for the harmonization engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Mapping document not found: {0}")]
    DocumentNotFound(String),

    #[error("Async runtime unavailable (create the cache inside a Tokio runtime or use `with_handle`)")]
    AsyncRuntimeUnavailable,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<harmonize_models::Error> for Error {
    fn from(err: harmonize_models::Error) -> Self {
        match err {
            harmonize_models::Error::SerializationError(e) => Error::Parse(e.to_string()),
            harmonize_models::Error::InvalidResource(msg) => Error::Validation(msg),
        }
    }
}
