//! End-to-end annotation of a table: batch, flatten, merge.

use std::collections::HashSet;
use std::time::Instant;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, info_span};

use bioann_client::AnnotationService;
use bioann_model::{FlatAnnotationRow, LineStatus};

use crate::batch::{
    BatchOptions, BatchOutcome, BatchPolicy, BatchProgress, RowFailure, annotate_table,
};
use crate::error::Result;
use crate::flatten::flatten_results;
use crate::frame::{FIXED_COLUMNS, annotation_frame, ensure_no_clash, merge_onto};

/// Column annotated when none is given.
pub const DEFAULT_TEXT_COLUMN: &str = "text";

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub ontology: String,
    pub text_column: String,
    pub policy: BatchPolicy,
}

impl PipelineOptions {
    pub fn new(ontology: impl Into<String>) -> Self {
        Self {
            ontology: ontology.into(),
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            policy: BatchPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_text_column(mut self, text_column: impl Into<String>) -> Self {
        self.text_column = text_column.into();
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Counts gathered during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub input_rows: usize,
    pub output_rows: usize,
    pub matched_lines: usize,
    pub zero_match_rows: usize,
    pub malformed_lines: usize,
    pub unresolved_lookups: usize,
    pub skipped_rows: usize,
}

impl PipelineStats {
    /// Skipped rows are counted once, in `skipped_rows`.
    fn collect(input_rows: usize, rows: &[FlatAnnotationRow], failures: &[RowFailure]) -> Self {
        let mut stats = Self {
            input_rows,
            skipped_rows: failures.len(),
            ..Self::default()
        };
        let skipped: HashSet<usize> = failures.iter().map(|f| f.row_index).collect();
        for row in rows {
            match row.status() {
                LineStatus::Matched => stats.matched_lines += 1,
                LineStatus::NoMatches if skipped.contains(&row.row_index) => {}
                LineStatus::NoMatches => stats.zero_match_rows += 1,
                LineStatus::Malformed => stats.malformed_lines += 1,
            }
            if let Some(resolution) = &row.resolution {
                stats.unresolved_lookups += resolution.unresolved_count();
            }
        }
        stats
    }
}

/// Result of [`AnnotationPipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The input table left-joined with the flat annotation columns.
    pub frame: DataFrame,
    /// Flat lines before the join.
    pub rows: Vec<FlatAnnotationRow>,
    pub stats: PipelineStats,
    /// Rows skipped under [`BatchPolicy::SkipRow`].
    pub failures: Vec<RowFailure>,
}

type ProgressFn = Box<dyn Fn(BatchProgress)>;

/// Annotates a table's text column and merges the results back onto it.
pub struct AnnotationPipeline<S> {
    service: S,
    options: PipelineOptions,
    progress: Option<ProgressFn>,
}

impl<S: AnnotationService> AnnotationPipeline<S> {
    pub fn new(service: S, options: PipelineOptions) -> Self {
        Self {
            service,
            options,
            progress: None,
        }
    }

    /// Call `progress` after each annotated row.
    #[must_use]
    pub fn with_progress(mut self, progress: impl Fn(BatchProgress) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn run(&self, input: &DataFrame) -> Result<PipelineOutput> {
        let run_span = info_span!(
            "annotate",
            ontology = %self.options.ontology,
            text_column = %self.options.text_column,
        );
        let _run_guard = run_span.enter();
        let run_start = Instant::now();
        ensure_no_clash(input, FIXED_COLUMNS)?;

        let batch_options =
            BatchOptions::new(self.options.ontology.clone()).with_policy(self.options.policy);
        let outcome = info_span!("batch").in_scope(|| -> Result<BatchOutcome> {
            let start = Instant::now();
            let notify = |p: BatchProgress| {
                if let Some(progress) = &self.progress {
                    progress(p);
                }
            };
            let outcome = annotate_table(
                &self.service,
                input,
                &self.options.text_column,
                &batch_options,
                &notify,
            )?;
            debug!(
                rows = outcome.results.len(),
                failures = outcome.failures.len(),
                duration_ms = start.elapsed().as_millis(),
                "batch complete"
            );
            Ok(outcome)
        })?;

        let rows = info_span!("flatten").in_scope(|| {
            let start = Instant::now();
            let rows = flatten_results(&outcome.results, &self.service);
            debug!(
                lines = rows.len(),
                duration_ms = start.elapsed().as_millis(),
                "flatten complete"
            );
            rows
        });

        let frame = info_span!("merge").in_scope(|| -> Result<DataFrame> {
            let start = Instant::now();
            let annotations = annotation_frame(&rows)?;
            let merged = merge_onto(input, &annotations)?;
            debug!(
                columns = merged.width(),
                output_rows = merged.height(),
                duration_ms = start.elapsed().as_millis(),
                "merge complete"
            );
            Ok(merged)
        })?;

        let mut stats = PipelineStats::collect(input.height(), &rows, &outcome.failures);
        stats.output_rows = frame.height();
        info!(
            input_rows = stats.input_rows,
            output_rows = stats.output_rows,
            matched_lines = stats.matched_lines,
            zero_match_rows = stats.zero_match_rows,
            malformed_lines = stats.malformed_lines,
            unresolved_lookups = stats.unresolved_lookups,
            skipped_rows = stats.skipped_rows,
            duration_ms = run_start.elapsed().as_millis(),
            "annotation complete"
        );

        Ok(PipelineOutput {
            frame,
            rows,
            stats,
            failures: outcome.failures,
        })
    }
}
