//! Batch ontology annotation and flattening onto tabular input.

pub mod batch;
pub mod error;
pub mod flatten;
pub mod frame;
pub mod pipeline;
pub mod resolve;

pub use batch::{
    BatchOptions, BatchOutcome, BatchPolicy, BatchProgress, RowFailure, annotate_table,
    annotate_texts,
};
pub use error::{BatchError, PipelineError, Result};
pub use flatten::{ExplodedLine, augment, explode, flatten_results, normalize};
pub use frame::{
    CLASS_ID, CLASS_ONTOLOGY, CLASS_PREF_LABEL, CLASS_REF_ID, CLASS_REF_SELF, FIXED_COLUMNS,
    LINE_INDEX, ROW_INDEX, STATUS, ancestry_column, annotation_frame, ensure_no_clash,
    hierarchy_column, merge_onto, span_column,
};
pub use pipeline::{
    AnnotationPipeline, DEFAULT_TEXT_COLUMN, PipelineOptions, PipelineOutput, PipelineStats,
};
pub use resolve::HierarchyResolver;
