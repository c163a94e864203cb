use polars::prelude::PolarsError;
use thiserror::Error;

use bioann_model::{AnnotatedText, ServiceError};

/// Failures of the batch annotation stage.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("text column '{0}' not found in input table")]
    MissingTextColumn(String),

    /// A row's annotation request failed under the fail-fast policy.
    ///
    /// `completed` holds the rows annotated before the failure.
    #[error("annotation aborted at row {row_index}: {source}")]
    Aborted {
        row_index: usize,
        /// Text of the failed row.
        text: String,
        completed: Vec<AnnotatedText>,
        #[source]
        source: ServiceError,
    },
}

impl BatchError {
    /// Rows annotated before the batch stopped.
    pub fn completed(&self) -> &[AnnotatedText] {
        match self {
            Self::Aborted { completed, .. } => completed,
            Self::MissingTextColumn(_) => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
