//! Error taxonomy shared by the annotation client and the pipeline.

use thiserror::Error;

/// Errors raised while talking to the annotation service or reading its payloads.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// Network or HTTP failure on an annotation request.
    #[error("transport error for {url}: {message}")]
    Transport {
        /// Request URL (without credentials).
        url: String,
        /// Underlying failure description.
        message: String,
    },

    /// The service answered a class-detail request with an HTTP error.
    #[error("class detail not found at {url} (status {status})")]
    NotFound {
        /// The class `links.self` URL that failed.
        url: String,
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// A payload is missing a field the pipeline depends on.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Missing or invalid API key / endpoint.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Build a transport error from any displayable cause.
    pub fn transport(url: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: cause.to_string(),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_become_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ServiceError = err.into();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }
}
