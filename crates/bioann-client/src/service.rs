//! The annotation service seam.
//!
//! The pipeline only talks to [`AnnotationService`]. [`BioPortalClient`] is
//! the HTTP implementation; [`RecordedService`] answers from previously
//! captured payloads, which keeps runs reproducible without network access.
//!
//! [`BioPortalClient`]: crate::BioPortalClient

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bioann_model::{ClassDetail, Result, ServiceError};

/// Operations the pipeline needs from an ontology annotator.
pub trait AnnotationService {
    /// Annotate one text against one ontology and return the raw response
    /// elements in response order.
    fn annotate(&self, text: &str, ontology: &str) -> Result<Vec<Value>>;

    /// Dereference one class-detail URL.
    fn fetch_class_detail(&self, self_url: &str) -> Result<ClassDetail>;
}

impl<T: AnnotationService + ?Sized> AnnotationService for &T {
    fn annotate(&self, text: &str, ontology: &str) -> Result<Vec<Value>> {
        (**self).annotate(text, ontology)
    }

    fn fetch_class_detail(&self, self_url: &str) -> Result<ClassDetail> {
        (**self).fetch_class_detail(self_url)
    }
}

/// Captured annotator payloads, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recording {
    /// Raw annotator responses keyed by annotated text.
    #[serde(default)]
    pub annotations: BTreeMap<String, Vec<Value>>,
    /// Class-detail payloads keyed by `links.self` URL.
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDetail>,
    /// Texts whose annotation request fails with a transport error.
    #[serde(default)]
    pub failing_texts: BTreeSet<String>,
}

/// In-memory [`AnnotationService`] replaying a [`Recording`].
///
/// Unknown texts annotate to an empty response; unknown class URLs fail with
/// [`ServiceError::NotFound`]. Every call is logged so callers can inspect
/// the exact request sequence.
#[derive(Debug, Default)]
pub struct RecordedService {
    recording: Recording,
    calls: RefCell<Vec<ServiceCall>>,
}

/// One request seen by a [`RecordedService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Annotate { text: String, ontology: String },
    ClassDetail { url: String },
}

impl RecordedService {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Load a recording from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            ServiceError::Configuration(format!("read recording {}: {err}", path.display()))
        })?;
        let recording: Recording = serde_json::from_str(&content)?;
        Ok(Self::new(recording))
    }

    /// Register the raw response for a text.
    #[must_use]
    pub fn with_annotations(mut self, text: impl Into<String>, matches: Vec<Value>) -> Self {
        self.recording.annotations.insert(text.into(), matches);
        self
    }

    /// Register a resolvable class.
    #[must_use]
    pub fn with_class(mut self, url: impl Into<String>, detail: ClassDetail) -> Self {
        self.recording.classes.insert(url.into(), detail);
        self
    }

    /// Make annotation requests for a text fail.
    #[must_use]
    pub fn with_failing_text(mut self, text: impl Into<String>) -> Self {
        self.recording.failing_texts.insert(text.into());
        self
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.borrow().clone()
    }

    /// Class-detail URLs requested so far, in order.
    pub fn class_lookups(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ServiceCall::ClassDetail { url } => Some(url.clone()),
                ServiceCall::Annotate { .. } => None,
            })
            .collect()
    }
}

impl AnnotationService for RecordedService {
    fn annotate(&self, text: &str, ontology: &str) -> Result<Vec<Value>> {
        self.calls.borrow_mut().push(ServiceCall::Annotate {
            text: text.to_string(),
            ontology: ontology.to_string(),
        });
        if self.recording.failing_texts.contains(text) {
            return Err(ServiceError::transport(
                format!("recording://annotator?ontologies={ontology}"),
                "recorded failure",
            ));
        }
        Ok(self
            .recording
            .annotations
            .get(text)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_class_detail(&self, self_url: &str) -> Result<ClassDetail> {
        self.calls.borrow_mut().push(ServiceCall::ClassDetail {
            url: self_url.to_string(),
        });
        self.recording
            .classes
            .get(self_url)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                url: self_url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_recorded_payloads() {
        let service = RecordedService::default()
            .with_annotations("glucose", vec![json!({"annotatedClass": {"@id": "C1"}})])
            .with_class(
                "u1",
                ClassDetail {
                    id: "C1".to_string(),
                    pref_label: Some("Glucose".to_string()),
                    links: Default::default(),
                },
            );

        assert_eq!(service.annotate("glucose", "CHEBI").unwrap().len(), 1);
        assert!(service.annotate("unknown", "CHEBI").unwrap().is_empty());
        assert_eq!(service.fetch_class_detail("u1").unwrap().id, "C1");
        assert!(matches!(
            service.fetch_class_detail("u2"),
            Err(ServiceError::NotFound { status: 404, .. })
        ));
        assert_eq!(service.class_lookups(), vec!["u1", "u2"]);
        assert_eq!(service.calls().len(), 4);
    }

    #[test]
    fn failing_text_is_a_transport_error() {
        let service = RecordedService::default().with_failing_text("boom");
        let err = service.annotate("boom", "CHEBI").unwrap_err();
        assert!(matches!(err, ServiceError::Transport { .. }));
    }

    #[test]
    fn works_through_references() {
        fn count<S: AnnotationService>(service: S) -> usize {
            service.annotate("a", "X").map(|m| m.len()).unwrap_or(0)
        }
        let service = RecordedService::default().with_annotations("a", vec![json!({})]);
        assert_eq!(count(&service), 1);
    }
}
