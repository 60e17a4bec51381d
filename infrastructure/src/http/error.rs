//! Error types for the HTTP adapters

use quota_gate_application::{BeaconError, OracleError, SurveyApiError};
use thiserror::Error;

/// Errors that can occur when calling the survey backend
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_decode() {
            HttpError::Decode(e.to_string())
        } else {
            HttpError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(e: serde_json::Error) -> Self {
        HttpError::Decode(e.to_string())
    }
}

impl From<HttpError> for OracleError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout => OracleError::Timeout,
            HttpError::Status { status, .. } => OracleError::Status(status),
            HttpError::Decode(msg) => OracleError::InvalidResponse(msg),
            HttpError::Connection(msg) | HttpError::InvalidUrl(msg) => {
                OracleError::ConnectionError(msg)
            }
        }
    }
}

impl From<HttpError> for SurveyApiError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout => SurveyApiError::Timeout,
            HttpError::Status { status: 409, .. } => SurveyApiError::AlreadySubmitted,
            HttpError::Status { status: 404, body } => SurveyApiError::NotFound(body),
            HttpError::Status { status, .. } => SurveyApiError::Status(status),
            HttpError::Decode(msg) => SurveyApiError::InvalidResponse(msg),
            HttpError::Connection(msg) | HttpError::InvalidUrl(msg) => {
                SurveyApiError::ConnectionError(msg)
            }
        }
    }
}

impl From<HttpError> for BeaconError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout => BeaconError::Timeout,
            HttpError::Status { status, .. } => BeaconError::Status(status),
            HttpError::Decode(msg) | HttpError::Connection(msg) | HttpError::InvalidUrl(msg) => {
                BeaconError::ConnectionError(msg)
            }
        }
    }
}
