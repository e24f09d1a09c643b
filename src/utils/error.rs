//! # Error Handling
//!
//! Crate-wide error type and `Result` alias. All fallible paths in the
//! library and the CLI funnel into [`Error`]; validation failures (bad
//! symbol, market, frequency or server input) are kept distinct from
//! protocol failures so the retry layer can tell them apart.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Free-form error built via [`Error::new`].
    #[error("{0}")]
    Custom(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("serialization error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("deserialization error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Rejected input: symbol, market, frequency, date or server address.
    /// Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure reported by (or absence of) the protocol binding.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

impl Error {
    /// Create a new error with a custom message.
    pub fn new(msg: &str) -> Self {
        Error::Custom(msg.to_string())
    }

    /// True when a failed operation is worth another attempt.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Error::Validation(_))
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::new("configuration lock poisoned")
    }
}
