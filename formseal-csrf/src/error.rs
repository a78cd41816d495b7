use thiserror::Error;

/// Errors produced by the CSRF codec.
///
/// Verification failures never carry a cause: every malformed, expired or
/// forged token maps to [`CsrfError::InvalidToken`].
#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("Invalid CSRF token")]
    InvalidToken,

    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Timestamp cannot be encoded in a CSRF token")]
    TimestampOutOfRange,

    #[error("Salt must be {expected} bytes, got {actual}")]
    InvalidSalt { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CsrfError>;
