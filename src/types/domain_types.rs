// src/types/domain_types.rs
//! Validated newtypes for credentials and endpoints.

use super::ValidationError;
use std::fmt;
use url::Url;

/// Integration token for the Notion API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...", &self.0[..10])
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

/// Bearer token for the text generation service.
///
/// Providers disagree on key prefixes (and self-hosted gateways often
/// accept anything), so only emptiness is rejected.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationKey(String);

impl GenerationKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::EmptyField("generation API key"));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GenerationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenerationKey([REDACTED])")
    }
}

/// An http(s) base URL with any trailing slash removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: "Only HTTP and HTTPS URLs are supported".to_string(),
            });
        }

        Ok(Self(parsed))
    }

    /// The URL without a trailing slash, ready for `format!("{}/path", ..)`.
    pub fn as_base(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_base())
    }
}
