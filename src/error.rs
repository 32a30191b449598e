use thiserror::Error;

use crate::provider::ProviderError;

/// Unified error type for the Rotogate library
#[derive(Error, Debug)]
pub enum RotogateError {
    // Provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // Router errors
    #[error("No gateway endpoints available")]
    NoEndpointsAvailable,

    #[error("Invalid request URL: {0}")]
    InvalidRequestUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    // Transport errors
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // URL errors
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Rotogate operations
pub type Result<T> = std::result::Result<T, RotogateError>;

impl RotogateError {
    /// Check if the error originated from the cloud provider
    pub fn is_provider_error(&self) -> bool {
        matches!(self, RotogateError::Provider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_conversion() {
        let provider_err = ProviderError::with_code(
            "UnrecognizedClientException",
            "The security token included in the request is invalid",
        );
        let err: RotogateError = provider_err.into();
        assert!(err.is_provider_error());
        assert!(err.to_string().contains("UnrecognizedClientException"));
    }

    #[test]
    fn test_no_endpoints_display() {
        let err = RotogateError::NoEndpointsAvailable;
        assert_eq!(err.to_string(), "No gateway endpoints available");
        assert!(!err.is_provider_error());
    }
}
