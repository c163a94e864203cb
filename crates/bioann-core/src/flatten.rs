//! Explode, normalize and augment stages.
//!
//! A row with `k` matches becomes `k` lines; a row with none becomes a single
//! [`LineMatch::NoMatches`] line so that every input row survives the merge.
//! Lines keep row order, then response order within the row.

use serde_json::Value;
use tracing::warn;

use bioann_client::AnnotationService;
use bioann_model::{AnnotatedText, AnnotationLine, AnnotationMatch, FlatAnnotationRow, LineMatch};

use crate::resolve::HierarchyResolver;

/// One (row, raw response element) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplodedLine<'a> {
    pub row_index: usize,
    pub line_index: usize,
    pub text: &'a str,
    /// `None` for the placeholder line of a row without matches.
    pub raw: Option<&'a Value>,
}

/// Split each annotated row into one line per response element.
pub fn explode(results: &[AnnotatedText]) -> Vec<ExplodedLine<'_>> {
    let mut lines = Vec::with_capacity(results.len());
    for result in results {
        if result.matches.is_empty() {
            lines.push(ExplodedLine {
                row_index: result.row_index,
                line_index: 0,
                text: &result.text,
                raw: None,
            });
            continue;
        }
        lines.extend(
            result
                .matches
                .iter()
                .enumerate()
                .map(|(line_index, raw)| ExplodedLine {
                    row_index: result.row_index,
                    line_index,
                    text: &result.text,
                    raw: Some(raw),
                }),
        );
    }
    lines
}

/// Parse each raw element into a typed match.
///
/// An element that fails to parse is degraded to [`LineMatch::Malformed`];
/// other lines of the same row are unaffected.
pub fn normalize(lines: &[ExplodedLine<'_>]) -> Vec<AnnotationLine> {
    lines
        .iter()
        .map(|line| {
            let content = match line.raw {
                None => LineMatch::NoMatches,
                Some(raw) => match AnnotationMatch::from_value(raw) {
                    Ok(annotation) => LineMatch::Match(annotation),
                    Err(error) => {
                        warn!(
                            row_index = line.row_index,
                            line_index = line.line_index,
                            %error,
                            "malformed annotation element"
                        );
                        LineMatch::Malformed {
                            reason: error.to_string(),
                        }
                    }
                },
            };
            AnnotationLine {
                row_index: line.row_index,
                line_index: line.line_index,
                text: line.text.to_string(),
                content,
            }
        })
        .collect()
}

/// Resolve the primary class and ancestry of every matched line.
pub fn augment<S: AnnotationService + ?Sized>(
    lines: Vec<AnnotationLine>,
    service: &S,
) -> Vec<FlatAnnotationRow> {
    let resolver = HierarchyResolver::new(service);
    lines
        .into_iter()
        .map(|line| {
            let resolution = match &line.content {
                LineMatch::Match(annotation) => Some(resolver.resolve_match(annotation)),
                LineMatch::NoMatches | LineMatch::Malformed { .. } => None,
            };
            FlatAnnotationRow {
                row_index: line.row_index,
                line_index: line.line_index,
                text: line.text,
                content: line.content,
                resolution,
            }
        })
        .collect()
}

/// Run explode, normalize and augment over a batch.
pub fn flatten_results<S: AnnotationService + ?Sized>(
    results: &[AnnotatedText],
    service: &S,
) -> Vec<FlatAnnotationRow> {
    let exploded = explode(results);
    let normalized = normalize(&exploded);
    augment(normalized, service)
}
