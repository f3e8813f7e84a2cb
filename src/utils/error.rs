// src/utils/error.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type ProfileResult<T> = Result<T, ProfileError>;

/// Custom error details for additional context (skip tallies, upstream status, ...)
pub type ErrorDetails = HashMap<String, serde_json::Value>;

/// Main error type for the profile pipeline and the regional router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileError {
    pub message: String,
    pub details: Option<Box<ErrorDetails>>, // Boxed to reduce struct size
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    UnknownError,
    ConfigurationError,
    ValidationError,
    UpstreamAuthError,
    UpstreamServerError,
    NetworkError,
    SerializationError,
    DeserializationError,
    CacheError,
    RateLimitError,
    InsufficientDataError,
    NotFoundError,
    InternalError,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProfileError {}

impl ProfileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(Box::new(details));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Machine-readable category for the `{error, details}` wire shape.
    pub fn code(&self) -> &str {
        self.error_code.as_deref().unwrap_or("UNKNOWN_ERROR")
    }

    /// HTTP status this error maps to; unclassified errors are internal.
    pub fn http_status(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    // Convenience constructors for the error taxonomy

    /// Fatal misconfiguration (e.g. missing upstream credential). Never retried.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message)
            .with_status(500)
            .with_code("CONFIG_ERROR")
    }

    pub fn missing_api_key() -> Self {
        Self::new(
            ErrorKind::ConfigurationError,
            "RIOT_API_KEY is not configured",
        )
        .with_status(500)
        .with_code("MISSING_API_KEY")
    }

    /// Caller omitted a required routing input. Not retried.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    /// Upstream rejected the credential. Retrying wastes quota without remedy.
    pub fn upstream_auth_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamAuthError, message)
            .with_status(403)
            .with_code("UPSTREAM_AUTH")
    }

    /// Upstream returned a server-side (5xx) failure.
    pub fn upstream_server_error(message: impl Into<String>, upstream_status: u16) -> Self {
        let mut details = ErrorDetails::new();
        details.insert(
            "upstream_status".to_string(),
            serde_json::Value::from(upstream_status),
        );
        Self::new(ErrorKind::UpstreamServerError, message)
            .with_details(details)
            .with_status(502)
            .with_code("UPSTREAM_5XX")
    }

    /// Network-level failure reaching the upstream cluster.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
            .with_status(502)
            .with_code("NETWORK_ERROR")
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeserializationError, message)
            .with_status(502)
            .with_code("PARSE_ERROR")
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError, message)
            .with_status(500)
            .with_code("SERIALIZATION_ERROR")
    }

    pub fn cache_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheError, message)
            .with_status(500)
            .with_code("CACHE_ERROR")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFoundError, message)
            .with_status(404)
            .with_code("NOT_FOUND")
    }

    /// Fewer accepted matches than the analysis minimum. Carries the full
    /// per-reason skip breakdown so callers can diagnose zero-match results.
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientDataError, message)
            .with_status(422)
            .with_code("INSUFFICIENT_DATA")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
            .with_status(500)
            .with_code("INTERNAL_ERROR")
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        ProfileError::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<url::ParseError> for ProfileError {
    fn from(err: url::ParseError) -> Self {
        ProfileError::validation_error(format!("URL parse error: {}", err))
    }
}

impl From<reqwest::Error> for ProfileError {
    fn from(err: reqwest::Error) -> Self {
        ProfileError::network_error(format!("HTTP request failed: {}", err))
    }
}
