use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Input rejected locally, or a 400 from the chat endpoint
    #[error("{message}")]
    InvalidInput { message: String },

    /// Upload exceeds the size limit, locally or per a 413 from the backend
    #[error("{message}")]
    FileTooLarge { message: String },

    /// Upload is neither an allowed media type nor an allowed extension, or a 415 from the backend
    #[error("{message}")]
    UnsupportedFormat { message: String },

    /// The AI backend behind the chat endpoint is unreachable (502)
    #[error("AI backend temporarily unavailable, retry later")]
    UpstreamUnavailable,

    /// The backend answered with a 5xx status
    #[error("{message}")]
    ServerError { status: StatusCode, message: String },

    /// Any failure of the health probe
    #[error("Health check failed: {message}")]
    HealthCheckFailed { message: String },

    /// The request did not complete within the configured window
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Catch-all for transport failures and unmapped statuses
    #[error("{operation} failed: {message}")]
    RequestFailed {
        operation: &'static str,
        status: Option<StatusCode>,
        message: String,
    },

    /// Client-side setup failure (building the HTTP client, joining URLs)
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

/// Field-less discriminant of [`Error`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    FileTooLarge,
    UnsupportedFormat,
    UpstreamUnavailable,
    ServerError,
    HealthCheckFailed,
    Timeout,
    RequestFailed,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Error::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Error::UpstreamUnavailable => ErrorKind::UpstreamUnavailable,
            Error::ServerError { .. } => ErrorKind::ServerError,
            Error::HealthCheckFailed { .. } => ErrorKind::HealthCheckFailed,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::RequestFailed { .. } => ErrorKind::RequestFailed,
            Error::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// HTTP status that produced this error, if the backend answered at all
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::UpstreamUnavailable => Some(StatusCode::BAD_GATEWAY),
            Error::ServerError { status, .. } => Some(*status),
            Error::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput { message: message.into() }
    }

    /// Log with a level matching severity. Called once, at the point the error leaves the client.
    pub(crate) fn log(&self) {
        match self {
            Error::ServerError { .. } | Error::UpstreamUnavailable | Error::Internal { .. } => {
                tracing::error!("KnowBase request error: {:#}", self);
            }
            Error::HealthCheckFailed { .. } | Error::Timeout { .. } | Error::RequestFailed { .. } => {
                tracing::warn!("KnowBase request error: {}", self);
            }
            Error::InvalidInput { .. } | Error::FileTooLarge { .. } | Error::UnsupportedFormat { .. } => {
                tracing::debug!("Rejected request: {}", self);
            }
        }
    }
}

/// Type alias for client operation results
pub type Result<T> = std::result::Result<T, Error>;
