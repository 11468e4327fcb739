use thiserror::Error;

/// Backend error type signalling that this client can no longer express the query.
pub const UNSUPPORTED_EXCEPTION: &str = "UnsupportedException";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Api Error: {0}")]
    Error(String),

    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    #[error("{error_type} ({code}): {message}")]
    ResponseError {
        code: u16,
        error_type: String,
        message: String,
    },
}

impl ApiError {
    /// True when the backend rejected the query shape for this client version.
    /// The sentinel comparison is case-sensitive.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ApiError::ResponseError { error_type, .. } if error_type == UNSUPPORTED_EXCEPTION)
    }

    /// Machine-readable error type, falling back to a generic label for transport failures.
    pub fn error_type(&self) -> &str {
        match self {
            ApiError::Error(_) => "TransportException",
            ApiError::DecodeError(_) => "DecodeException",
            ApiError::ResponseError { error_type, .. } => error_type,
        }
    }

    /// Human readable message suitable for an inline error card.
    pub fn message(&self) -> String {
        match self {
            ApiError::ResponseError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings Error: {0}")]
    Error(String),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Logging Error: {0}")]
    Error(String),
}
