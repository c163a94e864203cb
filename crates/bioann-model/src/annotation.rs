//! Annotator response types.
//!
//! One annotator response is a JSON array; each element describes one matched
//! ontology class, the text spans that produced it and the ancestor classes
//! above it. The client keeps elements as raw [`serde_json::Value`] so that a
//! single malformed element can be degraded on its own during normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ServiceError};

/// Links block of an ontology class reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLinks {
    /// Absolute URL of the class-detail resource.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    /// URL of the ontology the class belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,
}

/// Reference to an ontology class as it appears inside annotator responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    /// Class URI.
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub links: ClassLinks,
}

impl ClassRef {
    /// The class-detail URL, if the service provided one.
    pub fn self_url(&self) -> Option<&str> {
        self.links.self_url.as_deref()
    }
}

/// One text span that matched the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMatch {
    /// 1-based start offset of the span.
    pub from: i64,
    /// 1-based inclusive end offset of the span.
    pub to: i64,
    /// Match kind reported by the service (`PREF`, `SYN`, ...).
    #[serde(rename = "matchType")]
    pub match_type: String,
    /// Matched text, when the service echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// An ancestor of the matched class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    #[serde(rename = "annotatedClass")]
    pub annotated_class: ClassRef,
    /// Number of is-a steps between the matched class and this ancestor.
    pub distance: i64,
}

/// One element of an annotator response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationMatch {
    #[serde(rename = "annotatedClass")]
    pub annotated_class: ClassRef,
    #[serde(default)]
    pub annotations: Vec<SpanMatch>,
    #[serde(default)]
    pub hierarchy: Vec<HierarchyEntry>,
}

impl AnnotationMatch {
    /// Parse one raw response element.
    ///
    /// Fails with [`ServiceError::MalformedResponse`] when the element is not an
    /// object, a span or hierarchy entry is incomplete, or the matched class
    /// carries no `links.self` URL to dereference.
    pub fn from_value(value: &Value) -> Result<Self> {
        let parsed: AnnotationMatch = serde_json::from_value(value.clone())?;
        if parsed.annotated_class.self_url().is_none() {
            return Err(ServiceError::MalformedResponse(format!(
                "annotatedClass {} has no links.self",
                parsed.annotated_class.id
            )));
        }
        Ok(parsed)
    }

    /// URI of the matched class.
    pub fn class_id(&self) -> &str {
        &self.annotated_class.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn glucose() -> Value {
        json!({
            "annotatedClass": {"@id": "C1", "links": {"self": "u1"}},
            "annotations": [{"from": 1, "to": 7, "matchType": "PREF", "text": "GLUCOSE"}],
            "hierarchy": [
                {"annotatedClass": {"@id": "C2", "links": {"self": "u2"}}, "distance": 1},
                {"annotatedClass": {"@id": "C3", "links": {"self": "u3"}}, "distance": 2}
            ]
        })
    }

    #[test]
    fn parses_full_match() {
        let parsed = AnnotationMatch::from_value(&glucose()).expect("parse match");
        assert_eq!(parsed.class_id(), "C1");
        assert_eq!(parsed.annotated_class.self_url(), Some("u1"));
        assert_eq!(parsed.annotations.len(), 1);
        assert_eq!(parsed.annotations[0].match_type, "PREF");
        assert_eq!(parsed.annotations[0].text.as_deref(), Some("GLUCOSE"));
        let ids: Vec<&str> = parsed
            .hierarchy
            .iter()
            .map(|entry| entry.annotated_class.id.as_str())
            .collect();
        assert_eq!(ids, vec!["C2", "C3"]);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let value = json!({"annotatedClass": {"@id": "C1", "links": {"self": "u1"}}});
        let parsed = AnnotationMatch::from_value(&value).expect("parse match");
        assert!(parsed.annotations.is_empty());
        assert!(parsed.hierarchy.is_empty());
    }

    #[test]
    fn missing_self_link_is_malformed() {
        let value = json!({"annotatedClass": {"@id": "C1"}});
        let err = AnnotationMatch::from_value(&value).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(msg) if msg.contains("C1")));
    }

    #[test]
    fn missing_class_is_malformed() {
        let value = json!({"annotations": []});
        assert!(AnnotationMatch::from_value(&value).is_err());
        assert!(AnnotationMatch::from_value(&json!("not an object")).is_err());
    }

    #[test]
    fn hierarchy_entry_without_link_still_parses() {
        let value = json!({
            "annotatedClass": {"@id": "C1", "links": {"self": "u1"}},
            "hierarchy": [{"annotatedClass": {"@id": "C9"}, "distance": 3}]
        });
        let parsed = AnnotationMatch::from_value(&value).expect("parse match");
        assert_eq!(parsed.hierarchy[0].annotated_class.self_url(), None);
        assert_eq!(parsed.hierarchy[0].distance, 3);
    }
}
