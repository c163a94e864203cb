//! Clients for the ontology annotator and SPARQL endpoints.

pub mod bioportal;
pub mod config;
pub mod service;
pub mod sparql;

pub use bioportal::BioPortalClient;
pub use config::{API_KEY_ENV, ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, ENDPOINT_ENV};
pub use service::{AnnotationService, RecordedService, Recording, ServiceCall};
pub use sparql::{DEFAULT_SPARQL_ENDPOINT, SparqlClient, SparqlResults, open_query};
