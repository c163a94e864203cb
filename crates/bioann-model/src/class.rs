//! Dereferenced ontology classes.

use serde::{Deserialize, Serialize};

use crate::annotation::ClassLinks;

/// Class-detail object returned by a `links.self` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDetail {
    /// Class URI.
    #[serde(rename = "@id")]
    pub id: String,
    /// Preferred label; some ontologies leave it null.
    #[serde(rename = "prefLabel", default)]
    pub pref_label: Option<String>,
    #[serde(default)]
    pub links: ClassLinks,
}

impl ClassDetail {
    /// URL of the ontology the class belongs to.
    pub fn ontology(&self) -> Option<&str> {
        self.links.ontology.as_deref()
    }
}

/// Outcome of one class-detail lookup.
///
/// Lookups routinely fail for deprecated or merged terms, so a failure is a
/// value rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassLookup {
    Resolved(ClassDetail),
    Unresolved {
        /// URL that was attempted, if the reference carried one.
        url: Option<String>,
        reason: String,
    },
}

impl ClassLookup {
    /// The resolved detail, if any.
    pub fn detail(&self) -> Option<&ClassDetail> {
        match self {
            Self::Resolved(detail) => Some(detail),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}
