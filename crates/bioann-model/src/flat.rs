//! Intermediate and terminal units of the flattening pipeline.
//!
//! Every unit carries the synthetic `row_index` of the input row it came from.
//! The index, not the text value, is the key used to merge results back onto
//! the input table.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::AnnotationMatch;
use crate::class::ClassLookup;

/// Raw annotator output for one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedText {
    /// Position of the row in the input table.
    pub row_index: usize,
    /// The annotated text (empty for null cells).
    pub text: String,
    /// Raw response elements, in response order.
    pub matches: Vec<Value>,
}

/// Content of one exploded line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineMatch {
    /// The row produced no matches.
    NoMatches,
    /// The raw element could not be normalized.
    Malformed { reason: String },
    Match(AnnotationMatch),
}

/// One (row, response element) pair after explode and normalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLine {
    pub row_index: usize,
    /// Position of the element within the row's response.
    pub line_index: usize,
    pub text: String,
    pub content: LineMatch,
}

/// A hierarchy entry after its class was looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAncestor {
    /// Class URI from the hierarchy entry.
    pub class_id: String,
    pub distance: i64,
    pub detail: ClassLookup,
}

/// Lookups for a match's own class and for every ancestor, in response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    pub primary: ClassLookup,
    pub ancestry: Vec<ResolvedAncestor>,
}

impl ResolvedMatch {
    /// Number of lookups (primary and ancestors) that did not resolve.
    pub fn unresolved_count(&self) -> usize {
        let primary = usize::from(!self.primary.is_resolved());
        primary
            + self
                .ancestry
                .iter()
                .filter(|ancestor| !ancestor.detail.is_resolved())
                .count()
    }
}

/// Status recorded in the flat output for each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Matched,
    NoMatches,
    Malformed,
}

impl LineStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NoMatches => "no_matches",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal unit: one line with its normalized match and resolved classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatAnnotationRow {
    pub row_index: usize,
    pub line_index: usize,
    pub text: String,
    pub content: LineMatch,
    /// Present only for [`LineMatch::Match`] lines.
    pub resolution: Option<ResolvedMatch>,
}

impl FlatAnnotationRow {
    pub fn status(&self) -> LineStatus {
        match self.content {
            LineMatch::NoMatches => LineStatus::NoMatches,
            LineMatch::Malformed { .. } => LineStatus::Malformed,
            LineMatch::Match(_) => LineStatus::Matched,
        }
    }

    /// The normalized match, if this line has one.
    pub fn annotation(&self) -> Option<&AnnotationMatch> {
        match &self.content {
            LineMatch::Match(annotation) => Some(annotation),
            _ => None,
        }
    }
}
