//! Error taxonomy shared by providers, the mapper and the orchestrator.
//!
//! The `Display` text of every variant is the message shown to the user, so
//! the orchestrator can surface any failure with `to_string()`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RateError>;

/// Broad classes of failure, independent of the message carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoConnectivity,
    Timeout,
    ServerError,
    ProviderReportedError,
    ArithmeticError,
    AggregateFailure,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("No internet connection")]
    NoConnectivity,

    #[error("Request timed out")]
    Timeout,

    /// Non-2xx status without a structured error, or a payload that does not parse.
    #[error("Server error, please try again later")]
    ServerError { status: Option<u16>, detail: String },

    /// Success status, but the expected payload field is missing.
    #[error("Unexpected empty response from server")]
    EmptyResponse,

    #[error("{0}")]
    ProviderReported(String),

    #[error("Rate for {0} not found")]
    RateNotFound(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("Failed to fetch historical data")]
    AggregateFailure,

    #[error("{0}")]
    Unexpected(String),
}

impl RateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RateError::NoConnectivity => ErrorKind::NoConnectivity,
            RateError::Timeout => ErrorKind::Timeout,
            RateError::ServerError { .. } | RateError::EmptyResponse => ErrorKind::ServerError,
            RateError::ProviderReported(_) => ErrorKind::ProviderReportedError,
            RateError::RateNotFound(_) | RateError::InvalidAmount(_) => {
                ErrorKind::ArithmeticError
            }
            RateError::AggregateFailure => ErrorKind::AggregateFailure,
            RateError::Unexpected(_) => ErrorKind::Other,
        }
    }

    /// Classifies a transport-level failure from the HTTP client.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            RateError::Timeout
        } else if err.is_connect() {
            RateError::NoConnectivity
        } else {
            RateError::Unexpected(format!("Request failed: {err}"))
        }
    }
}
