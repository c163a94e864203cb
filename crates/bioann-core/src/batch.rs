//! Batch annotation of a table's text column.
//!
//! Rows are annotated one at a time in input order; the output holds exactly
//! one [`AnnotatedText`] per processed row. What happens when a row's request
//! fails is decided by [`BatchPolicy`].

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bioann_client::AnnotationService;
use bioann_ingest::column_strings;
use bioann_model::AnnotatedText;

use crate::error::BatchError;

/// How a failed annotation request affects the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Stop at the first failure and return the rows completed so far.
    #[default]
    FailFast,
    /// Record the failure, keep the row with no matches and continue.
    SkipRow,
}

/// Batch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Ontology code sent with every request (e.g. `CHEBI`).
    pub ontology: String,
    pub policy: BatchPolicy,
}

impl BatchOptions {
    pub fn new(ontology: impl Into<String>) -> Self {
        Self {
            ontology: ontology.into(),
            policy: BatchPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Progress notification sent after each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

/// A row whose annotation request failed under [`BatchPolicy::SkipRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_index: usize,
    pub message: String,
}

/// Result of a completed batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One entry per input row, in input order.
    pub results: Vec<AnnotatedText>,
    /// Rows skipped after a failed request.
    pub failures: Vec<RowFailure>,
}

/// Annotate the `text_column` of every row of `table`.
pub fn annotate_table<S: AnnotationService + ?Sized>(
    service: &S,
    table: &DataFrame,
    text_column: &str,
    options: &BatchOptions,
    progress: &dyn Fn(BatchProgress),
) -> Result<BatchOutcome, BatchError> {
    let texts = column_strings(table, text_column)
        .ok_or_else(|| BatchError::MissingTextColumn(text_column.to_string()))?;
    annotate_texts(service, &texts, options, progress)
}

/// Annotate a sequence of optional texts.
///
/// Null or blank texts are not sent to the service and yield no matches.
pub fn annotate_texts<S: AnnotationService + ?Sized>(
    service: &S,
    texts: &[Option<String>],
    options: &BatchOptions,
    progress: &dyn Fn(BatchProgress),
) -> Result<BatchOutcome, BatchError> {
    let total = texts.len();
    let mut outcome = BatchOutcome {
        results: Vec::with_capacity(total),
        failures: Vec::new(),
    };

    for (row_index, text) in texts.iter().enumerate() {
        let text = text.as_deref().unwrap_or_default();
        let matches = if text.trim().is_empty() {
            debug!(row_index, "empty text, skipping request");
            Vec::new()
        } else {
            match service.annotate(text, &options.ontology) {
                Ok(matches) => matches,
                Err(source) => match options.policy {
                    BatchPolicy::FailFast => {
                        warn!(row_index, error = %source, "annotation failed, aborting batch");
                        return Err(BatchError::Aborted {
                            row_index,
                            text: text.to_string(),
                            completed: outcome.results,
                            source,
                        });
                    }
                    BatchPolicy::SkipRow => {
                        warn!(row_index, error = %source, "annotation failed, skipping row");
                        outcome.failures.push(RowFailure {
                            row_index,
                            message: source.to_string(),
                        });
                        Vec::new()
                    }
                },
            }
        };

        debug!(row_index, total, matches = matches.len(), "annotated row");
        outcome.results.push(AnnotatedText {
            row_index,
            text: text.to_string(),
            matches,
        });
        progress(BatchProgress {
            completed: row_index + 1,
            total,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioann_client::{RecordedService, ServiceCall};
    use serde_json::json;
    use std::cell::RefCell;

    fn texts(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn no_progress(_: BatchProgress) {}

    #[test]
    fn one_result_per_row_in_order() {
        let service = RecordedService::default()
            .with_annotations("glucose", vec![json!({"a": 1}), json!({"a": 2})])
            .with_annotations("insulin", vec![json!({"a": 3})]);
        let outcome = annotate_texts(
            &service,
            &texts(&[Some("insulin"), Some("unknown"), Some("glucose")]),
            &BatchOptions::new("CHEBI"),
            &no_progress,
        )
        .expect("batch");

        let summary: Vec<(usize, &str, usize)> = outcome
            .results
            .iter()
            .map(|r| (r.row_index, r.text.as_str(), r.matches.len()))
            .collect();
        assert_eq!(
            summary,
            vec![(0, "insulin", 1), (1, "unknown", 0), (2, "glucose", 2)]
        );
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn blank_text_is_not_sent() {
        let service = RecordedService::default();
        let outcome = annotate_texts(
            &service,
            &texts(&[None, Some("   "), Some("glucose")]),
            &BatchOptions::new("CHEBI"),
            &no_progress,
        )
        .expect("batch");

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(
            service.calls(),
            vec![ServiceCall::Annotate {
                text: "glucose".to_string(),
                ontology: "CHEBI".to_string()
            }]
        );
    }

    #[test]
    fn padded_text_is_sent_unchanged() {
        let service = RecordedService::default();
        let outcome = annotate_texts(
            &service,
            &texts(&[Some("  glucose level ")]),
            &BatchOptions::new("CHEBI"),
            &no_progress,
        )
        .expect("batch");

        assert_eq!(outcome.results[0].text, "  glucose level ");
        assert_eq!(
            service.calls(),
            vec![ServiceCall::Annotate {
                text: "  glucose level ".to_string(),
                ontology: "CHEBI".to_string()
            }]
        );
    }

    #[test]
    fn fail_fast_returns_completed_rows() {
        let service = RecordedService::default()
            .with_annotations("a", vec![json!({})])
            .with_failing_text("b");
        let err = annotate_texts(
            &service,
            &texts(&[Some("a"), Some("b"), Some("c")]),
            &BatchOptions::new("CHEBI"),
            &no_progress,
        )
        .unwrap_err();

        match &err {
            BatchError::Aborted {
                row_index, text, ..
            } => {
                assert_eq!(*row_index, 1);
                assert_eq!(text, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.completed().len(), 1);
        assert_eq!(err.completed()[0].text, "a");
        // "c" is never requested
        assert_eq!(service.calls().len(), 2);
    }

    #[test]
    fn skip_row_records_failure_and_continues() {
        let service = RecordedService::default()
            .with_annotations("c", vec![json!({})])
            .with_failing_text("b");
        let outcome = annotate_texts(
            &service,
            &texts(&[Some("a"), Some("b"), Some("c")]),
            &BatchOptions::new("CHEBI").with_policy(BatchPolicy::SkipRow),
            &no_progress,
        )
        .expect("batch");

        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.results[1].matches.is_empty());
        assert_eq!(outcome.results[2].matches.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].row_index, 1);
    }

    #[test]
    fn reports_progress_per_row() {
        let service = RecordedService::default();
        let seen = RefCell::new(Vec::new());
        annotate_texts(
            &service,
            &texts(&[Some("a"), Some("b")]),
            &BatchOptions::new("CHEBI"),
            &|p: BatchProgress| seen.borrow_mut().push((p.completed, p.total)),
        )
        .expect("batch");
        assert_eq!(seen.into_inner(), vec![(1, 2), (2, 2)]);
    }
}
