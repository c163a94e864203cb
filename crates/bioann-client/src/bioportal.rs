//! Blocking HTTP client for the BioPortal annotator API.
//!
//! Two calls are used: `GET {endpoint}/annotator?text=..&ontologies=..` and a
//! plain `GET` on the `links.self` URL of a class. Both carry the
//! `Authorization: apikey token=<KEY>` header.

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use bioann_model::{ClassDetail, Result, ServiceError};

use crate::config::ClientConfig;
use crate::service::AnnotationService;

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("bioann/", env!("CARGO_PKG_VERSION"));

/// Client for the annotator and class-detail endpoints.
#[derive(Debug, Clone)]
pub struct BioPortalClient {
    client: Client,
    endpoint: String,
}

impl BioPortalClient {
    /// Create a client; the configuration is consumed and the key only lives
    /// in the default headers afterwards.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&config.authorization()).map_err(|_| {
            ServiceError::Configuration("API key contains invalid header characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT_VALUE)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ServiceError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the annotator URL for one text.
    pub fn annotator_url(&self, text: &str, ontology: &str) -> Result<Url> {
        let base = format!("{}/annotator", self.endpoint);
        Url::parse_with_params(&base, &[("text", text), ("ontologies", ontology)])
            .map_err(|e| ServiceError::Configuration(format!("invalid endpoint {base}: {e}")))
    }

    fn send(&self, url: Url, display_url: &str) -> Result<Response> {
        self.client
            .get(url)
            .send()
            .map_err(|e| ServiceError::transport(display_url, e))
    }
}

impl AnnotationService for BioPortalClient {
    fn annotate(&self, text: &str, ontology: &str) -> Result<Vec<Value>> {
        let url = self.annotator_url(text, ontology)?;
        // The query string carries row text; keep it out of errors and logs.
        let display_url = format!("{}/annotator?ontologies={ontology}", self.endpoint);
        debug!(ontology, text_len = text.len(), "annotator request");

        let response = self.send(url, &display_url)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Transport {
                url: display_url,
                message: format!("HTTP {status}: {}", body.trim()),
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| ServiceError::transport(&display_url, e))?;
        match body {
            Value::Array(items) => {
                debug!(ontology, matches = items.len(), "annotator response");
                Ok(items)
            }
            other => Err(ServiceError::Transport {
                url: display_url,
                message: format!("expected a JSON array, got {}", json_kind(&other)),
            }),
        }
    }

    fn fetch_class_detail(&self, self_url: &str) -> Result<ClassDetail> {
        let url = Url::parse(self_url).map_err(|e| {
            ServiceError::MalformedResponse(format!("invalid class URL {self_url}: {e}"))
        })?;
        debug!(url = self_url, "class detail request");

        let response = self.send(url, self_url)?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = self_url, status = status.as_u16(), "class detail lookup failed");
            return Err(ServiceError::NotFound {
                url: self_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| ServiceError::MalformedResponse(format!("{self_url}: {e}")))?;
        Ok(serde_json::from_value(body)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
