//! Client configuration.
//!
//! The API key and endpoint are read once by the caller (usually from the
//! process environment at startup) and handed to the client explicitly.

use std::fmt;
use std::time::Duration;

use bioann_model::{Result, ServiceError};

/// Environment variable holding the annotator API key.
pub const API_KEY_ENV: &str = "BIO_KEY";

/// Environment variable overriding the annotator base URL.
pub const ENDPOINT_ENV: &str = "BIOPORTAL_URL";

/// Default annotator base URL.
pub const DEFAULT_ENDPOINT: &str = "https://data.bioontology.org";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`crate::BioPortalClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub endpoint: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
    api_key: String,
}

impl ClientConfig {
    /// Create a configuration from explicit values.
    ///
    /// Fails with [`ServiceError::Configuration`] when either value is blank.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();
        if endpoint.is_empty() {
            return Err(ServiceError::Configuration(
                "annotator endpoint is empty".to_string(),
            ));
        }
        if api_key.is_empty() {
            return Err(ServiceError::Configuration(format!(
                "{API_KEY_ENV} is not set or empty"
            )));
        }
        Ok(Self {
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            api_key,
        })
    }

    /// Read `BIO_KEY` and optionally `BIOPORTAL_URL` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_ENV).ok_or_else(|| {
            ServiceError::Configuration(format!("{API_KEY_ENV} is not set"))
        })?;
        let endpoint = lookup(ENDPOINT_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint, api_key)
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Value of the `Authorization` header sent with every request.
    pub fn authorization(&self) -> String {
        format!("apikey token={}", self.api_key)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
