// src/error.rs
//! Application error types with structured error handling.
//!
//! Each variant names what went wrong and where. The one question every
//! caller asks of an error is answered by [`AppError::is_transient`]:
//! may the same call succeed if it is simply tried again later?

use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
///
/// Matching on these instead of raw strings keeps the retry classifier
/// and the log output in agreement about what the API reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded; back off and retry
    RateLimited,
    /// The requested object does not exist or is not shared with the integration
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            503 => Self::ServiceUnavailable,
            other => Self::HttpStatus(other),
        }
    }

    /// Rate limiting and temporary unavailability. Everything else is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::ServiceUnavailable => true,
            Self::HttpStatus(status) => is_transient_status(*status),
            _ => false,
        }
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// 429 and the gateway family of 5xx statuses.
fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}

fn is_transient_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// The single failure kind of the text generation service.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation response was malformed: {0}")]
    MalformedResponse(String),

    #[error("Generation service returned no content")]
    EmptyCompletion,

    #[error("Prompt template '{name}' failed to render: {message}")]
    Prompt { name: String, message: String },
}

impl GenerationError {
    /// Rate limits, server-side failures and dropped connections.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Service { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Transport(err) => is_transient_transport(err),
            _ => false,
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<AppError>,
    },

    #[error("Processor used before initialize() completed")]
    NotInitialized,

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NotionService { code, .. } => code.is_retryable(),
            Self::NetworkFailure(err) => is_transient_transport(err),
            Self::Generation(err) => err.is_transient(),
            _ => false,
        }
    }

    /// Builds a store error from a status and a code string, as reported by Notion.
    pub fn notion(status: reqwest::StatusCode, code: &str, message: impl Into<String>) -> Self {
        AppError::NotionService {
            code: NotionErrorCode::from_api_response(code),
            message: message.into(),
            status,
        }
    }

    /// A store-side rate limit, the canonical transient failure.
    pub fn rate_limited() -> Self {
        Self::notion(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "You have been rate limited. Please try again in a few minutes.",
        )
    }

    /// Whether the error originated in the generation service, after retries.
    pub fn is_generation_failure(&self) -> bool {
        match self {
            Self::Generation(_) => true,
            Self::RetriesExhausted { last, .. } => last.is_generation_failure(),
            _ => false,
        }
    }
}

// Allow converting from anyhow::Error, preserving error chain
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError {
            message: err.to_string(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_and_unavailability_are_transient() {
        assert!(AppError::rate_limited().is_transient());
        assert!(AppError::notion(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "service_unavailable",
            "down"
        )
        .is_transient());
        assert!(NotionErrorCode::from_http_status(504).is_retryable());
    }

    #[test]
    fn permanent_store_errors_are_not_retried() {
        for (status, code) in [
            (reqwest::StatusCode::NOT_FOUND, "object_not_found"),
            (reqwest::StatusCode::UNAUTHORIZED, "unauthorized"),
            (reqwest::StatusCode::BAD_REQUEST, "validation_error"),
        ] {
            assert!(!AppError::notion(status, code, "nope").is_transient());
        }
        assert!(!AppError::MalformedResponse("garbage".into()).is_transient());
        assert!(!AppError::NotInitialized.is_transient());
    }

    #[test]
    fn generation_errors_classify_by_status() {
        let limited = GenerationError::Service {
            status: 429,
            message: "slow down".into(),
        };
        let bad_request = GenerationError::Service {
            status: 400,
            message: "bad".into(),
        };
        assert!(AppError::from(limited).is_transient());
        assert!(!AppError::from(bad_request).is_transient());
        assert!(!AppError::from(GenerationError::EmptyCompletion).is_transient());
    }

    #[test]
    fn exhausted_generation_retries_still_count_as_generation_failures() {
        let err = AppError::RetriesExhausted {
            operation: "summarize".into(),
            attempts: 3,
            last: Box::new(AppError::Generation(GenerationError::Service {
                status: 503,
                message: "busy".into(),
            })),
        };
        assert!(err.is_generation_failure());
        assert!(!err.is_transient());
        assert!(!AppError::rate_limited().is_generation_failure());
    }
}
