//! SPARQL endpoint client.
//!
//! Runs a SELECT query and returns the projected variables plus one string
//! map per result binding. Conversion to a table happens in `bioann-ingest`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use bioann_model::{Result, ServiceError};

/// Default local Fuseki dataset endpoint.
pub const DEFAULT_SPARQL_ENDPOINT: &str = "http://localhost:3030/publication_1_test/sparql";

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Read a `.rq` query file verbatim.
pub fn open_query(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

/// Result set of a SELECT query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparqlResults {
    /// Projected variables, in projection order.
    pub vars: Vec<String>,
    /// One map per binding; unbound variables are absent.
    pub rows: Vec<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    head: Head,
    results: Bindings,
}

#[derive(Debug, Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Bindings {
    bindings: Vec<BTreeMap<String, Term>>,
}

#[derive(Debug, Deserialize)]
struct Term {
    value: String,
}

impl SparqlResults {
    /// Parse a `application/sparql-results+json` document.
    ///
    /// When the head lists no variables, columns are taken from the bindings
    /// in first-seen order.
    pub fn from_json(body: &str) -> Result<Self> {
        let document: ResultsDocument = serde_json::from_str(body)?;
        let rows: Vec<BTreeMap<String, String>> = document
            .results
            .bindings
            .into_iter()
            .map(|binding| {
                binding
                    .into_iter()
                    .map(|(var, term)| (var, term.value))
                    .collect()
            })
            .collect();

        let mut vars = document.head.vars;
        for row in &rows {
            for var in row.keys() {
                if !vars.contains(var) {
                    vars.push(var.clone());
                }
            }
        }
        Ok(Self { vars, rows })
    }
}

/// Blocking client for one SPARQL endpoint.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    client: Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ServiceError::Configuration(format!("failed to create HTTP client: {e}"))
        })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a SELECT query.
    pub fn query(&self, query: &str) -> Result<SparqlResults> {
        let url = Url::parse_with_params(&self.endpoint, &[("query", query)]).map_err(|e| {
            ServiceError::Configuration(format!("invalid SPARQL endpoint {}: {e}", self.endpoint))
        })?;
        debug!(endpoint = %self.endpoint, "sparql query");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .map_err(|e| ServiceError::transport(&self.endpoint, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Transport {
                url: self.endpoint.clone(),
                message: format!("HTTP {status}: {}", body.trim()),
            });
        }
        let body = response
            .text()
            .map_err(|e| ServiceError::transport(&self.endpoint, e))?;
        SparqlResults::from_json(&body)
    }
}
